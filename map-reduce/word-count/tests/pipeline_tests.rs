// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

mod common;

use map_reduce_core::config::PipelineConfig;
use map_reduce_core::error::PipelineError;
use map_reduce_core::worker_address::WorkerAddress;
use map_reduce_core::{Pipeline, RunSummary};
use map_reduce_word_count::loopback::LoopbackTransport;
use map_reduce_word_count::tokenizer::Tokenizer;
use std::collections::HashMap;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const PROBE_TIMEOUT: Duration = Duration::from_millis(100);

fn addresses(names: &[&str]) -> Vec<WorkerAddress> {
    names
        .iter()
        .map(|name| WorkerAddress::parse(name).unwrap())
        .collect()
}

fn config_in(dir: &TempDir) -> PipelineConfig {
    PipelineConfig {
        work_dir: dir.path().to_path_buf(),
        ..PipelineConfig::default()
    }
}

async fn count_words(
    text: &str,
    workers: &[&str],
    transport: LoopbackTransport,
) -> (TempDir, Result<RunSummary, PipelineError>) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, text).unwrap();

    let pipeline = Pipeline::new(transport.with_threads(2), config_in(&dir));
    let result = pipeline
        .run(&input, &addresses(workers), PROBE_TIMEOUT)
        .await;
    (dir, result)
}

fn result_lines(summary: &RunSummary) -> Vec<String> {
    fs::read_to_string(&summary.result_path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn parse_result(summary: &RunSummary) -> Vec<(String, u64)> {
    result_lines(summary)
        .iter()
        .map(|line| {
            let (key, count) = line.split_once(' ').unwrap();
            (key.to_string(), count.parse().unwrap())
        })
        .collect()
}

#[tokio::test]
async fn test_english_sentence_with_custom_stop_word() {
    let transport = LoopbackTransport::new().with_tokenizer(Tokenizer::new(&["the"]));
    let (_dir, result) = count_words(
        "the quick brown fox jumps over the lazy dog",
        &["node1", "node2"],
        transport,
    )
    .await;
    let summary = result.unwrap();

    assert_eq!(
        result_lines(&summary),
        vec!["brown 1", "dog 1", "fox 1", "jumps 1", "lazy 1", "over 1", "quick 1"]
    );
    assert_eq!(summary.live_workers.len(), 2);
}

#[tokio::test]
async fn test_counts_sorted_descending() {
    let (_dir, result) = count_words(
        "aa bb aa cc aa bb",
        &["node1", "node2", "node3"],
        LoopbackTransport::new(),
    )
    .await;
    let summary = result.unwrap();

    assert_eq!(result_lines(&summary), vec!["aa 3", "bb 2", "cc 1"]);
    assert_eq!(summary.distinct_keys, 3);
    assert_eq!(summary.total_count, 6);
}

#[tokio::test]
async fn test_accents_fold_on_a_single_worker() {
    let (_dir, result) = count_words("Café cafe CAFÉ", &["node1"], LoopbackTransport::new()).await;
    assert_eq!(result_lines(&result.unwrap()), vec!["cafe 3"]);
}

#[tokio::test]
async fn test_single_letters_are_not_counted() {
    let (_dir, result) = count_words(
        "a ab abc a ab abc",
        &["node1", "node2"],
        LoopbackTransport::new(),
    )
    .await;
    assert_eq!(result_lines(&result.unwrap()), vec!["ab 2", "abc 2"]);
}

#[tokio::test]
async fn test_megabyte_of_lorem_on_four_workers() {
    let text = common::lorem(2025, 1 << 20);
    let expected_tokens = Tokenizer::default().tokenize_str(&text);
    let mut expected: HashMap<String, u64> = HashMap::new();
    for token in &expected_tokens {
        *expected.entry(token.clone()).or_insert(0) += 1;
    }

    let (_dir, result) = count_words(
        &text,
        &["node1", "node2", "node3", "node4"],
        LoopbackTransport::new(),
    )
    .await;
    let summary = result.unwrap();
    let counts = parse_result(&summary);

    let total: u64 = counts.iter().map(|(_, count)| count).sum();
    assert_eq!(total, expected_tokens.len() as u64);
    assert_eq!(summary.total_count, total);
    assert!(counts.windows(2).all(|pair| pair[0].1 >= pair[1].1));

    let actual: HashMap<String, u64> = counts.into_iter().collect();
    assert_eq!(actual, expected);
}

#[tokio::test]
async fn test_unresponsive_candidate_is_skipped() {
    let transport = LoopbackTransport::new()
        .with_unreachable(WorkerAddress::parse("bad").unwrap())
        .with_threads(2);
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, "aa bb aa cc aa bb").unwrap();

    let pipeline = Pipeline::new(transport, config_in(&dir));
    let summary = pipeline
        .run(
            &input,
            &addresses(&["good1", "bad", "good2"]),
            Duration::from_millis(2000),
        )
        .await
        .unwrap();

    assert_eq!(summary.live_workers, addresses(&["good1", "good2"]));
    assert_eq!(result_lines(&summary), vec!["aa 3", "bb 2", "cc 1"]);
    assert!(summary.timings.probe >= Duration::from_millis(2000));
}

#[tokio::test]
async fn test_empty_input_gives_empty_result() {
    let (_dir, result) = count_words("", &["node1", "node2"], LoopbackTransport::new()).await;
    let summary = result.unwrap();
    assert!(result_lines(&summary).is_empty());
    assert_eq!(summary.distinct_keys, 0);
}

#[tokio::test]
async fn test_only_stop_words_gives_empty_result() {
    let (_dir, result) = count_words(
        "le la les, et un a b c. Je suis ici!",
        &["node1", "node2"],
        LoopbackTransport::new(),
    )
    .await;
    assert!(result_lines(&result.unwrap()).is_empty());
}

#[tokio::test]
async fn test_more_workers_than_words() {
    let (_dir, result) = count_words(
        "zz yy",
        &["node1", "node2", "node3", "node4", "node5"],
        LoopbackTransport::new(),
    )
    .await;
    assert_eq!(result_lines(&result.unwrap()), vec!["yy 1", "zz 1"]);
}

#[tokio::test]
async fn test_no_live_worker_is_fatal() {
    let transport = LoopbackTransport::new()
        .with_unreachable(WorkerAddress::parse("bad1").unwrap())
        .with_unreachable(WorkerAddress::parse("bad2").unwrap());
    let (dir, result) = count_words("aa bb", &["bad1", "bad2"], transport).await;

    assert!(matches!(
        result,
        Err(PipelineError::NoLiveWorkers { candidates: 2 })
    ));
    assert!(!dir.path().join("wordcount.txt").exists());
}

#[tokio::test]
async fn test_missing_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(LoopbackTransport::new(), config_in(&dir));
    let result = pipeline
        .run(
            &dir.path().join("missing.txt"),
            &addresses(&["node1"]),
            PROBE_TIMEOUT,
        )
        .await;
    assert!(matches!(result, Err(PipelineError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_key_files_removed_unless_kept() {
    let (dir, result) = count_words("aa bb cc", &["node1", "node2"], LoopbackTransport::new()).await;
    result.unwrap();
    assert_eq!(fs::read_dir(dir.path().join("Keys")).unwrap().count(), 0);
    assert!(dir.path().join("UMx").join("UM_node1.txt").exists());
    assert!(dir.path().join("RMx").join("RM_node2.txt").exists());

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, "aa bb cc").unwrap();
    let config = PipelineConfig {
        keep_key_files: true,
        ..config_in(&dir)
    };
    Pipeline::new(LoopbackTransport::new(), config)
        .run(&input, &addresses(&["node1", "node2"]), PROBE_TIMEOUT)
        .await
        .unwrap();
    let keys = fs::read_to_string(dir.path().join("Keys").join("Keys_node1.txt")).unwrap();
    assert_eq!(keys.lines().count(), 2);
}

#[tokio::test]
async fn test_clean_intermediates() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, "aa bb aa").unwrap();
    let config = PipelineConfig {
        clean_intermediates: true,
        ..config_in(&dir)
    };

    let summary = Pipeline::new(LoopbackTransport::new(), config)
        .run(&input, &addresses(&["node1"]), PROBE_TIMEOUT)
        .await
        .unwrap();

    assert_eq!(result_lines(&summary), vec!["aa 2", "bb 1"]);
    assert!(!dir.path().join("Sx").exists());
    assert!(!dir.path().join("UMx").exists());
    assert!(!dir.path().join("RMx").exists());
}

#[tokio::test]
async fn test_rerun_gives_same_counts() {
    let text = common::lorem(99, 30_000);
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, &text).unwrap();
    let pipeline = Pipeline::new(LoopbackTransport::new().with_threads(3), config_in(&dir));
    let workers = addresses(&["node1", "node2", "node3"]);

    let first = pipeline.run(&input, &workers, PROBE_TIMEOUT).await.unwrap();
    let mut first_counts = parse_result(&first);
    let second = pipeline.run(&input, &workers, PROBE_TIMEOUT).await.unwrap();
    let mut second_counts = parse_result(&second);

    first_counts.sort();
    second_counts.sort();
    assert_eq!(first_counts, second_counts);
}
