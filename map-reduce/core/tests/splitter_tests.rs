// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use map_reduce_core::error::PipelineError;
use map_reduce_core::layout::WorkLayout;
use map_reduce_core::splitter::{shard_budget, split_input};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn setup(text: &str) -> (TempDir, PathBuf, WorkLayout) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, text).unwrap();
    let layout = WorkLayout::prepare(dir.path(), Path::new("wordcount.txt")).unwrap();
    (dir, input, layout)
}

fn read_all(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| fs::read_to_string(p).unwrap())
        .collect()
}

#[test]
fn test_budget() {
    assert_eq!(shard_budget(10, 3), 5);
    assert_eq!(shard_budget(9, 3), 4);
    assert_eq!(shard_budget(0, 4), 1);
}

#[test]
fn test_split_extends_to_word_end() {
    let (_dir, input, layout) = setup("aa bb cc dd ee");
    let shards = split_input(&input, 2, &layout).unwrap();

    assert_eq!(shards, vec![layout.shard(0), layout.shard(1)]);
    assert_eq!(read_all(&shards), vec!["aa bb cc", "dd ee"]);
}

#[test]
fn test_split_never_cuts_words() {
    let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi \
                omicron pi rho sigma tau upsilon phi chi psi omega";
    let words: Vec<&str> = text.split_ascii_whitespace().collect();

    for shards in 1..=9 {
        let (_dir, input, layout) = setup(text);
        let paths = split_input(&input, shards, &layout).unwrap();
        assert_eq!(paths.len(), shards);

        let contents = read_all(&paths);
        let rejoined: Vec<&str> = contents
            .iter()
            .flat_map(|shard| shard.split_ascii_whitespace())
            .collect();
        assert_eq!(rejoined, words, "{} shards", shards);
        let filled: Vec<&str> = contents
            .iter()
            .map(String::as_str)
            .filter(|shard| !shard.is_empty())
            .collect();
        assert_eq!(filled.join(" "), text, "{} shards", shards);
    }
}

#[test]
fn test_newlines_are_boundaries() {
    let (_dir, input, layout) = setup("one\ntwo\nthree\nfour\n");
    let paths = split_input(&input, 3, &layout).unwrap();
    let contents = read_all(&paths);
    let words: Vec<&str> = contents
        .iter()
        .flat_map(|shard| shard.split_ascii_whitespace())
        .collect();
    assert_eq!(words, vec!["one", "two", "three", "four"]);
}

#[test]
fn test_more_shards_than_words() {
    let (_dir, input, layout) = setup("ab");
    let paths = split_input(&input, 3, &layout).unwrap();
    assert_eq!(read_all(&paths), vec!["ab", "", ""]);
}

#[test]
fn test_empty_input() {
    let (_dir, input, layout) = setup("");
    let paths = split_input(&input, 2, &layout).unwrap();
    assert_eq!(read_all(&paths), vec!["", ""]);
}

#[test]
fn test_zero_shards_rejected() {
    let (_dir, input, layout) = setup("aa bb");
    assert!(matches!(
        split_input(&input, 0, &layout),
        Err(PipelineError::InvalidArgument(_))
    ));
}

#[test]
fn test_missing_input() {
    let (dir, _input, layout) = setup("aa");
    let result = split_input(&dir.path().join("nope.txt"), 1, &layout);
    assert!(matches!(result, Err(PipelineError::Io { .. })));
}
