// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::run_job;
use crate::tokenizer::Tokenizer;
use async_trait::async_trait;
use map_reduce_core::protocol::{JobSpec, RemoteCommand};
use map_reduce_core::transport::{ExitReport, Transport};
use map_reduce_core::worker_address::WorkerAddress;
use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, DuplexStream};
use tokio::task::{self, JoinHandle};
use tracing::error;

const PIPE_CAPACITY: usize = 64 * 1024;

/// Runs worker jobs inside the current process instead of on remote hosts.
///
/// Every address is served by the same kernels; addresses marked
/// unreachable accept a session but never produce output.
#[derive(Clone)]
pub struct LoopbackTransport {
    tokenizer: Arc<Tokenizer>,
    threads: usize,
    unreachable: HashSet<WorkerAddress>,
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self {
            tokenizer: Arc::new(Tokenizer::default()),
            threads: num_cpus::get(),
            unreachable: HashSet::new(),
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = Arc::new(tokenizer);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_unreachable(mut self, address: WorkerAddress) -> Self {
        self.unreachable.insert(address);
        self
    }
}

/// An in-process session; dropping it stops the job
pub struct LoopbackSession {
    task: Option<JoinHandle<i32>>,
}

impl Drop for LoopbackSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    type Handle = LoopbackSession;
    type Stdout = DuplexStream;

    fn launch(
        &self,
        address: &WorkerAddress,
        command: &RemoteCommand,
    ) -> io::Result<(Self::Handle, Self::Stdout)> {
        let (mut writer, reader) = tokio::io::duplex(PIPE_CAPACITY);

        if self.unreachable.contains(address) {
            let task = task::spawn(async move {
                let _silent = writer;
                std::future::pending::<i32>().await
            });
            return Ok((LoopbackSession { task: Some(task) }, reader));
        }

        let task = match JobSpec::from_args(&command.args) {
            Ok(spec) => {
                let tokenizer = Arc::clone(&self.tokenizer);
                let threads = self.threads;
                let address = address.clone();
                task::spawn(async move {
                    let job = task::spawn_blocking(move || {
                        let mut stdout = Vec::new();
                        let result = run_job(&tokenizer, threads, &spec, &mut stdout);
                        (result, stdout)
                    });
                    let (result, stdout) = match job.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            error!(address = %address, error = %e, "Loopback job panicked");
                            return 1;
                        }
                    };
                    if writer.write_all(&stdout).await.is_err() {
                        return 1;
                    }
                    match result {
                        Ok(()) => 0,
                        Err(e) => {
                            error!(address = %address, error = %e, "Loopback job failed");
                            1
                        }
                    }
                })
            }
            Err(_) if command.program == "echo" => {
                let line = format!("{}\n", command.args.join(" "));
                task::spawn(async move {
                    match writer.write_all(line.as_bytes()).await {
                        Ok(()) => 0,
                        Err(_) => 1,
                    }
                })
            }
            Err(e) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("loopback cannot run '{}': {}", command.to_shell_line(), e),
                ));
            }
        };

        Ok((LoopbackSession { task: Some(task) }, reader))
    }

    async fn join(mut handle: Self::Handle) -> io::Result<ExitReport> {
        let Some(task) = handle.task.take() else {
            return Ok(ExitReport { code: None });
        };
        match task.await {
            Ok(code) => Ok(ExitReport { code: Some(code) }),
            Err(e) if e.is_cancelled() => Ok(ExitReport { code: None }),
            Err(e) => Err(e.into()),
        }
    }
}
