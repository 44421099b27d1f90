// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{IoContext, PipelineError};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::warn;

/// Word -> total count, fed from the reducers' output
#[derive(Debug, Default, Clone)]
pub struct Histogram {
    counts: HashMap<String, u64>,
}

impl Histogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, count: u64) {
        match self.counts.get_mut(key) {
            Some(total) => {
                // partitions are disjoint, so this only happens with a misbehaving worker
                warn!(key, "Key reported by more than one reducer");
                *total += count;
            }
            None => {
                self.counts.insert(key.to_string(), count);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.counts.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Entries by count descending, ties by key ascending
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(key, count)| (key.as_str(), *count))
            .collect();
        entries.sort_by_key(|&(key, count)| (Reverse(count), key));
        entries
    }

    /// Writes `<key> <count>` lines in [`Histogram::sorted`] order.
    ///
    /// The file is written beside `path` and renamed into place, so a failed
    /// run never leaves a truncated result behind.
    pub fn write_sorted(&self, path: &Path) -> Result<(), PipelineError> {
        let staging = path.with_extension("partial");
        let file =
            File::create(&staging).io_context(|| format!("creating {}", staging.display()))?;
        let mut writer = BufWriter::new(file);
        for (key, count) in self.sorted() {
            writeln!(writer, "{} {}", key, count)
                .io_context(|| format!("writing {}", staging.display()))?;
        }
        writer
            .flush()
            .io_context(|| format!("flushing {}", staging.display()))?;
        fs::rename(&staging, path).io_context(|| format!("renaming to {}", path.display()))
    }
}
