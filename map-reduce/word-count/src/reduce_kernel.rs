// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use map_reduce_core::error::{IoContext, PipelineError};
use map_reduce_core::protocol::Mode;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads one key per line; blank lines and repeated keys are skipped
pub fn read_keys(path: &Path) -> Result<Vec<String>, PipelineError> {
    let contents =
        fs::read_to_string(path).io_context(|| format!("reading keys {}", path.display()))?;
    let mut keys: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for line in contents.lines() {
        let key = line.trim();
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        keys.push(key.to_string());
    }
    Ok(keys)
}

/// Counts, per key, the lines of `path` whose first field is that key
fn count_shard(path: &Path, slots: &HashMap<&str, usize>) -> Result<Vec<u64>, PipelineError> {
    let file = File::open(path).io_context(|| format!("opening {}", path.display()))?;
    let mut counts = vec![0u64; slots.len()];
    for line in BufReader::new(file).lines() {
        let line = line.io_context(|| format!("reading {}", path.display()))?;
        if let Some(slot) = line
            .split_ascii_whitespace()
            .next()
            .and_then(|key| slots.get(key))
        {
            counts[*slot] += 1;
        }
    }
    Ok(counts)
}

/// UMXRMX: counts the keys listed in `keys_file` over every intermediate
/// shard in `inputs`, one counter per shard.
///
/// Results go to `output` and to `stdout` as `key count` lines in key file
/// order, followed by the sentinel. An unreadable shard fails the job
/// before anything is emitted.
pub fn run_reduce<W: Write>(
    keys_file: &Path,
    inputs: &[PathBuf],
    output: &Path,
    mut stdout: W,
) -> Result<Vec<(String, u64)>, PipelineError> {
    let keys = read_keys(keys_file)?;
    let slots: HashMap<&str, usize> = keys
        .iter()
        .enumerate()
        .map(|(slot, key)| (key.as_str(), slot))
        .collect();

    let per_shard = inputs
        .par_iter()
        .map(|path| count_shard(path, &slots))
        .collect::<Result<Vec<_>, _>>()?;

    let mut totals = vec![0u64; keys.len()];
    for counts in &per_shard {
        for (total, count) in totals.iter_mut().zip(counts) {
            *total += count;
        }
    }
    let results: Vec<(String, u64)> = keys.into_iter().zip(totals).collect();

    let file = File::create(output).io_context(|| format!("creating {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    for (key, count) in &results {
        writeln!(writer, "{} {}", key, count)
            .io_context(|| format!("writing {}", output.display()))?;
    }
    writer
        .flush()
        .io_context(|| format!("flushing {}", output.display()))?;

    for (key, count) in &results {
        writeln!(stdout, "{} {}", key, count).io_context(|| "writing stdout".to_string())?;
    }
    writeln!(stdout, "{}", Mode::Reduce.sentinel())
        .and_then(|_| stdout.flush())
        .io_context(|| "writing sentinel".to_string())?;

    debug!(keys = results.len(), shards = inputs.len(), "Reduce job complete");
    Ok(results)
}
