// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{IoContext, PipelineError};
use crate::layout::WorkLayout;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Nominal shard size for `len` bytes split `shards` ways: ⌈len/shards⌉ + 1
pub fn shard_budget(len: u64, shards: usize) -> u64 {
    len.div_ceil(shards as u64) + 1
}

/// Splits `input` into exactly `shards` whitespace-aligned shard files.
///
/// Each shard takes the next budget of bytes, then keeps reading until a
/// whitespace byte or EOF. That whitespace byte is consumed but not written,
/// so no word is ever cut. Shards past the end of the input are empty.
pub fn split_input(
    input: &Path,
    shards: usize,
    layout: &WorkLayout,
) -> Result<Vec<PathBuf>, PipelineError> {
    if shards == 0 {
        return Err(PipelineError::InvalidArgument(
            "cannot split input into zero shards".to_string(),
        ));
    }

    let file = File::open(input).io_context(|| format!("opening input {}", input.display()))?;
    let len = file
        .metadata()
        .io_context(|| format!("reading metadata of {}", input.display()))?
        .len();
    let budget = shard_budget(len, shards);
    let mut reader = BufReader::new(file);

    let mut paths = Vec::with_capacity(shards);
    for index in 0..shards {
        let mut buffer = Vec::with_capacity(budget as usize);
        reader
            .by_ref()
            .take(budget)
            .read_to_end(&mut buffer)
            .io_context(|| format!("reading {}", input.display()))?;
        read_to_word_end(&mut reader, &mut buffer)
            .io_context(|| format!("reading {}", input.display()))?;

        let path = layout.shard(index);
        fs::write(&path, &buffer).io_context(|| format!("writing shard {}", path.display()))?;
        paths.push(path);
    }
    Ok(paths)
}

/// Appends bytes up to (excluding) the next whitespace byte, which is consumed
fn read_to_word_end<R: Read>(reader: &mut R, buffer: &mut Vec<u8>) -> std::io::Result<()> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(()),
            Ok(_) if byte[0].is_ascii_whitespace() => return Ok(()),
            Ok(_) => buffer.push(byte[0]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
