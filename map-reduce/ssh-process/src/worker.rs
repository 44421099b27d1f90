// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use map_reduce_core::protocol::{unpack_fields, JobSpec};
use map_reduce_word_count::run_job;
use map_reduce_word_count::tokenizer::Tokenizer;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Map and reduce kernels started by the master; speaks on stdout
#[derive(Parser)]
#[command(name = "wordcount-worker", version, about, long_about = None)]
struct Cli {
    /// Parallel map slices (defaults to the number of logical CPUs)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    mode: ModeCommand,
}

#[derive(Subcommand)]
enum ModeCommand {
    /// Tokenize an input shard into an intermediate shard
    #[command(name = "SXUMX")]
    Map { output: PathBuf, input: PathBuf },

    /// Count the listed keys over `___`-separated intermediate shards
    #[command(name = "UMXRMX")]
    Reduce {
        output: PathBuf,
        inputs: String,
        keys_file: PathBuf,
    },
}

impl ModeCommand {
    fn into_spec(self) -> JobSpec {
        match self {
            ModeCommand::Map { output, input } => JobSpec::Map { output, input },
            ModeCommand::Reduce {
                output,
                inputs,
                keys_file,
            } => JobSpec::Reduce {
                output,
                inputs: unpack_fields(&inputs).into_iter().map(PathBuf::from).collect(),
                keys_file,
            },
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let threads = cli.threads.unwrap_or_else(num_cpus::get).max(1);
    let spec = cli.mode.into_spec();
    // map slices share this writer across rayon threads
    let stdout = BufWriter::new(io::stdout());
    run_job(&Tokenizer::default(), threads, &spec, stdout)
        .with_context(|| format!("{} job failed", spec.mode()))
}
