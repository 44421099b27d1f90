// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::tokenizer::Tokenizer;
use map_reduce_core::error::{IoContext, PipelineError};
use map_reduce_core::protocol::Mode;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSummary {
    pub slices: usize,
    pub failed_slices: usize,
    /// `word 1` records written to the intermediate shard
    pub tokens: usize,
    /// Words sent on stdout, counted once per slice
    pub announced: usize,
}

/// What one slice produced
struct SliceOutput {
    records: String,
    tokens: usize,
    announced: usize,
}

/// Byte offsets splitting `len` into `slices` near-equal ranges
pub fn slice_offsets(len: u64, slices: usize) -> Vec<u64> {
    let slices = slices.max(1) as u64;
    (0..=slices).map(|i| i * len / slices).collect()
}

/// SXUMX: tokenizes `input` in parallel slices.
///
/// Each slice writes `word 1` per accepted token to its own buffer and
/// announces its distinct words on `stdout`. Buffers are appended to
/// `output` in slice order, then the sentinel closes `stdout`. A failing
/// slice is logged and contributes nothing.
pub fn run_map<W: Write + Send>(
    tokenizer: &Tokenizer,
    input: &Path,
    output: &Path,
    slices: usize,
    stdout: W,
) -> Result<MapSummary, PipelineError> {
    let file = File::open(input).io_context(|| format!("opening shard {}", input.display()))?;
    let len = file
        .metadata()
        .io_context(|| format!("reading metadata of {}", input.display()))?
        .len();
    let offsets = slice_offsets(len, slices);
    let input_file = Mutex::new(file);
    let stdout = Mutex::new(stdout);

    let results: Vec<io::Result<SliceOutput>> = offsets
        .windows(2)
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|range| map_slice(tokenizer, &input_file, range[0], range[1], &stdout))
        .collect();

    let mut summary = MapSummary {
        slices: results.len(),
        ..MapSummary::default()
    };
    let mut records = String::new();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(slice) => {
                records.push_str(&slice.records);
                summary.tokens += slice.tokens;
                summary.announced += slice.announced;
            }
            Err(e) => {
                error!(slice = index, input = %input.display(), error = %e, "Map slice failed");
                summary.failed_slices += 1;
            }
        }
    }
    fs::write(output, records).io_context(|| format!("writing {}", output.display()))?;

    let mut stdout = stdout.into_inner().map_err(|_| PipelineError::Io {
        context: "stdout".to_string(),
        source: io::Error::other("stdout lock poisoned"),
    })?;
    writeln!(stdout, "{}", Mode::Map.sentinel())
        .and_then(|_| stdout.flush())
        .io_context(|| "writing sentinel".to_string())?;

    debug!(?summary, "Map job complete");
    Ok(summary)
}

fn map_slice<W: Write>(
    tokenizer: &Tokenizer,
    input: &Mutex<File>,
    start: u64,
    end: u64,
    stdout: &Mutex<W>,
) -> io::Result<SliceOutput> {
    let text = read_slice(input, start, end)?;
    let tokens = tokenizer.tokenize(&text);

    let mut records = String::with_capacity(tokens.len() * 8);
    let mut seen = HashSet::new();
    let mut fresh = Vec::new();
    for token in &tokens {
        records.push_str(token);
        records.push_str(" 1\n");
        if seen.insert(token.as_str()) {
            fresh.push(token.as_str());
        }
    }

    let mut out = stdout
        .lock()
        .map_err(|_| io::Error::other("stdout lock poisoned"))?;
    for word in &fresh {
        writeln!(out, "{}", word)?;
    }
    out.flush()?;

    Ok(SliceOutput {
        records,
        tokens: tokens.len(),
        announced: fresh.len(),
    })
}

/// Reads `[start, end)` widened to whitespace on both sides.
///
/// A slice not starting at 0 begins at the first whitespace at or after
/// `start - 1`; with none in range it is empty, since the previous slice
/// reads through it. A slice that ends inside a word keeps reading up to
/// and including the next whitespace byte.
fn read_slice(input: &Mutex<File>, start: u64, end: u64) -> io::Result<Vec<u8>> {
    let from = start.saturating_sub(1);
    let mut file = input
        .lock()
        .map_err(|_| io::Error::other("input lock poisoned"))?;
    file.seek(SeekFrom::Start(from))?;

    let mut buffer = Vec::with_capacity((end - from) as usize);
    Read::by_ref(&mut *file)
        .take(end - from)
        .read_to_end(&mut buffer)?;

    let skip = if start == 0 {
        0
    } else {
        match buffer.iter().position(u8::is_ascii_whitespace) {
            Some(position) => position,
            None => return Ok(Vec::new()),
        }
    };

    if buffer.last().is_some_and(|byte| !byte.is_ascii_whitespace()) {
        let mut byte = [0u8; 1];
        while file.read(&mut byte)? == 1 {
            buffer.push(byte[0]);
            if byte[0].is_ascii_whitespace() {
                break;
            }
        }
    }

    buffer.drain(..skip);
    Ok(buffer)
}
