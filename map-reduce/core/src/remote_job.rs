// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::PipelineError;
use crate::protocol::{JobSpec, Mode, RemoteCommand};
use crate::transport::{ExitReport, Transport};
use crate::worker_address::WorkerAddress;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{StreamExt, StreamMap};
use tracing::{debug, warn};

/// Item forwarded from a job's stdout reader to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutput {
    Line(String),
    /// stdout closed; always the last item of a queue
    Eof,
    /// stdout could not be read; always the last item of a queue
    ReadError(String),
}

pub type JobOutputQueue = ReceiverStream<JobOutput>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Running,
    /// The sentinel has been read
    Ended,
}

/// One map or reduce invocation on one worker
pub struct RemoteJob<T: Transport> {
    id: usize,
    address: WorkerAddress,
    spec: JobSpec,
    state: JobState,
    handle: Option<T::Handle>,
    reader: Option<JoinHandle<()>>,
}

impl<T: Transport> RemoteJob<T> {
    pub fn new(id: usize, address: WorkerAddress, spec: JobSpec) -> Self {
        Self {
            id,
            address,
            spec,
            state: JobState::Pending,
            handle: None,
            reader: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn address(&self) -> &WorkerAddress {
        &self.address
    }

    pub fn spec(&self) -> &JobSpec {
        &self.spec
    }

    pub fn mode(&self) -> Mode {
        self.spec.mode()
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Launches the worker and returns the consumer side of its output queue
    pub fn start(
        &mut self,
        transport: &T,
        worker_program: &str,
        queue_capacity: usize,
    ) -> Result<JobOutputQueue, PipelineError> {
        if self.state != JobState::Pending {
            return Err(PipelineError::InvalidArgument(format!(
                "{} job on {} was already started",
                self.mode(),
                self.address
            )));
        }

        let command = RemoteCommand::new(worker_program, self.spec.to_args()?);
        let (handle, stdout) =
            transport
                .launch(&self.address, &command)
                .map_err(|source| PipelineError::Launch {
                    address: self.address.to_string(),
                    source,
                })?;
        debug!(job = self.id, address = %self.address, command = %command.to_shell_line(), "Job launched");

        let (tx, rx) = mpsc::channel(queue_capacity);
        self.reader = Some(tokio::spawn(forward_lines(stdout, tx)));
        self.handle = Some(handle);
        self.state = JobState::Running;
        Ok(ReceiverStream::new(rx))
    }

    pub fn mark_ended(&mut self) {
        self.state = JobState::Ended;
    }

    /// Waits for the reader and the remote session to finish
    pub async fn join(mut self) -> Result<ExitReport, PipelineError> {
        let (Some(handle), Some(reader)) = (self.handle.take(), self.reader.take()) else {
            return Err(self.failure("job was never started".to_string()));
        };
        if let Err(e) = reader.await {
            return Err(self.failure(format!("output reader crashed: {}", e)));
        }
        let exit = T::join(handle)
            .await
            .map_err(|e| self.failure(format!("waiting for remote session: {}", e)))?;
        if !exit.is_success() {
            warn!(address = %self.address, mode = %self.mode(), code = ?exit.code, "Remote session exited abnormally");
        }
        Ok(exit)
    }

    fn failure(&self, reason: String) -> PipelineError {
        PipelineError::JobFailed {
            address: self.address.to_string(),
            mode: self.mode(),
            reason,
        }
    }
}

impl<T: Transport> Drop for RemoteJob<T> {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Copies stdout into the bounded queue, one item per line.
///
/// Once the consumer hangs up, remaining lines are read and discarded so
/// the remote side never blocks on a full pipe.
async fn forward_lines<R>(stdout: R, tx: mpsc::Sender<JobOutput>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stdout).lines();
    let mut forwarding = true;
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if forwarding && tx.send(JobOutput::Line(line)).await.is_err() {
                    forwarding = false;
                }
            }
            Ok(None) => {
                let _ = tx.send(JobOutput::Eof).await;
                return;
            }
            Err(e) => {
                let _ = tx.send(JobOutput::ReadError(e.to_string())).await;
                return;
            }
        }
    }
}

/// Fan-in over every job's queue until each job has sent its sentinel.
///
/// `on_line` sees every non-sentinel line in per-job emission order. Lines
/// after a sentinel are dropped. A queue that terminates before its
/// sentinel fails the whole phase.
pub async fn drain_jobs<T, F>(
    jobs: &mut [RemoteJob<T>],
    queues: Vec<(usize, JobOutputQueue)>,
    mut on_line: F,
) -> Result<(), PipelineError>
where
    T: Transport,
    F: FnMut(&RemoteJob<T>, String) -> Result<(), PipelineError>,
{
    let mut streams = StreamMap::new();
    for (id, queue) in queues {
        streams.insert(id, queue);
    }

    while let Some((id, output)) = streams.next().await {
        let Some(job) = jobs.iter_mut().find(|job| job.id == id) else {
            streams.remove(&id);
            warn!(job = id, "Output from an unknown job ignored");
            continue;
        };
        match output {
            JobOutput::Line(line) if job.mode().is_sentinel(&line) => {
                job.mark_ended();
                streams.remove(&id);
                debug!(job = id, address = %job.address(), "Job reached its sentinel");
            }
            JobOutput::Line(line) => on_line(job, line)?,
            JobOutput::Eof => {
                return Err(job.failure(format!(
                    "output ended without '{}'",
                    job.mode().sentinel()
                )));
            }
            JobOutput::ReadError(e) => {
                return Err(job.failure(format!("unreadable output: {}", e)));
            }
        }
    }

    if let Some(job) = jobs.iter().find(|job| job.state() != JobState::Ended) {
        return Err(job.failure("output reader stopped before the sentinel".to_string()));
    }
    Ok(())
}
