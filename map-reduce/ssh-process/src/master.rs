// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use anyhow::{Context, Result};
use clap::Parser;
use map_reduce_core::config::PipelineConfig;
use map_reduce_core::transport::Transport;
use map_reduce_core::worker_address::{read_address_file, WorkerAddress};
use map_reduce_core::{Pipeline, RunSummary};
use map_reduce_ssh::SshTransport;
use map_reduce_word_count::loopback::LoopbackTransport;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Distributed word count over the workers listed in an address file
#[derive(Parser)]
#[command(name = "wordcount-master", version, about, long_about = None)]
struct Cli {
    /// Text file to count
    input: PathBuf,

    /// One worker address per line
    addresses: PathBuf,

    /// How long the liveness probe waits for every worker, in milliseconds
    timeout_ms: u64,

    /// JSON configuration file
    #[arg(long)]
    config: Option<String>,

    /// Run the workers in this process instead of over the remote shell
    #[arg(long)]
    loopback: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
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

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(summary) => {
            info!(
                live_workers = summary.live_workers.len(),
                distinct_keys = summary.distinct_keys,
                total_count = summary.total_count,
                result = %summary.result_path.display(),
                wall_ms = summary.timings.total().as_millis() as u64,
                "Word count complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let config = match &cli.config {
        Some(path) => {
            PipelineConfig::load(path).with_context(|| format!("loading config {}", path))?
        }
        None => PipelineConfig::default(),
    };
    let candidates = read_address_file(&cli.addresses)
        .with_context(|| format!("reading addresses {}", cli.addresses.display()))?;
    let timeout = Duration::from_millis(cli.timeout_ms);

    info!(
        input = %cli.input.display(),
        candidates = candidates.len(),
        timeout_ms = cli.timeout_ms,
        loopback = cli.loopback,
        "Starting word count"
    );

    if cli.loopback {
        execute(LoopbackTransport::new(), config, &cli.input, &candidates, timeout).await
    } else {
        let transport = SshTransport::from_config(&config);
        execute(transport, config, &cli.input, &candidates, timeout).await
    }
}

async fn execute<T: Transport>(
    transport: T,
    config: PipelineConfig,
    input: &Path,
    candidates: &[WorkerAddress],
    timeout: Duration,
) -> Result<RunSummary> {
    let pipeline = Pipeline::new(transport, config);
    let summary = pipeline
        .run(input, candidates, timeout)
        .await
        .with_context(|| format!("counting words of {}", input.display()))?;
    Ok(summary)
}
