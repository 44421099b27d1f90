// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use indexmap::IndexMap;
use std::collections::BTreeSet;

/// Inverted index: word -> intermediate shards (by map job id) it appeared in.
///
/// Iteration follows first-discovery order, so partitioning is stable for
/// the lifetime of one index.
#[derive(Debug, Default, Clone)]
pub struct KeyIndex {
    keys: IndexMap<String, Vec<usize>>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `word` occurs in the intermediate shard of map job `shard`
    pub fn record(&mut self, word: &str, shard: usize) {
        if let Some(shards) = self.keys.get_mut(word) {
            // a map job reports a word once per slice, not once overall
            if !shards.contains(&shard) {
                shards.push(shard);
            }
            return;
        }
        self.keys.insert(word.to_string(), vec![shard]);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn shards_of(&self, word: &str) -> Option<&[usize]> {
        self.keys.get(word).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.keys.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// The keys one reducer owns and the intermediate shards it must read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducePartition {
    pub keys: Vec<String>,
    pub shards: BTreeSet<usize>,
}

/// Splits the key space over `reducers` partitions.
///
/// With K keys, the first K mod N partitions get ⌊K/N⌋+1 keys and the rest
/// get ⌊K/N⌋. Each partition reads the union of its keys' shards, nothing
/// more.
pub fn partition_keys(index: &KeyIndex, reducers: usize) -> Vec<ReducePartition> {
    if reducers == 0 {
        return Vec::new();
    }

    let base = index.len() / reducers;
    let remainder = index.len() % reducers;
    let mut entries = index.iter();

    (0..reducers)
        .map(|reducer| {
            let take = if reducer < remainder { base + 1 } else { base };
            let mut partition = ReducePartition {
                keys: Vec::with_capacity(take),
                shards: BTreeSet::new(),
            };
            for (key, shards) in entries.by_ref().take(take) {
                partition.keys.push(key.to_string());
                partition.shards.extend(shards.iter().copied());
            }
            partition
        })
        .collect()
}
