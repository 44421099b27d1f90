// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod loopback;
pub mod map_kernel;
pub mod reduce_kernel;
pub mod stop_words;
pub mod tokenizer;

use map_reduce_core::error::PipelineError;
use map_reduce_core::protocol::JobSpec;
use std::io::Write;
use tracing::info;

/// Runs one worker job, writing its wire output to `stdout`.
///
/// `threads` is the number of map slices; reduce jobs use one counter per
/// input shard regardless.
pub fn run_job<W: Write + Send>(
    tokenizer: &tokenizer::Tokenizer,
    threads: usize,
    spec: &JobSpec,
    stdout: W,
) -> Result<(), PipelineError> {
    match spec {
        JobSpec::Map { output, input } => {
            let summary = map_kernel::run_map(tokenizer, input, output, threads, stdout)?;
            info!(
                mode = %spec.mode(),
                input = %input.display(),
                slices = summary.slices,
                failed_slices = summary.failed_slices,
                tokens = summary.tokens,
                "Map job finished"
            );
        }
        JobSpec::Reduce {
            output,
            inputs,
            keys_file,
        } => {
            let counts = reduce_kernel::run_reduce(keys_file, inputs, output, stdout)?;
            info!(
                mode = %spec.mode(),
                keys = counts.len(),
                shards = inputs.len(),
                "Reduce job finished"
            );
        }
    }
    Ok(())
}
