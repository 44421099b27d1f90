// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::config::PipelineConfig;
use crate::error::{IoContext, PipelineError};
use crate::histogram::Histogram;
use crate::layout::WorkLayout;
use crate::liveness::probe_workers;
use crate::protocol::{parse_count_line, JobSpec, RemoteCommand};
use crate::remote_job::{drain_jobs, JobOutputQueue, RemoteJob};
use crate::shuffle::{partition_keys, KeyIndex, ReducePartition};
use crate::splitter::split_input;
use crate::transport::Transport;
use crate::worker_address::WorkerAddress;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Wall time spent in each phase of one run
#[derive(Debug, Clone, Default)]
pub struct PhaseTimings {
    pub probe: Duration,
    pub split: Duration,
    pub map: Duration,
    pub shuffle: Duration,
    pub reduce: Duration,
    pub assemble: Duration,
}

impl PhaseTimings {
    pub fn total(&self) -> Duration {
        self.probe + self.split + self.map + self.shuffle + self.reduce + self.assemble
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub live_workers: Vec<WorkerAddress>,
    pub distinct_keys: usize,
    pub total_count: u64,
    pub result_path: PathBuf,
    pub timings: PhaseTimings,
}

/// Drives probe, split, map, shuffle, reduce and assemble over one transport
pub struct Pipeline<T: Transport> {
    transport: Arc<T>,
    config: PipelineConfig,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(transport: T, config: PipelineConfig) -> Self {
        Self {
            transport: Arc::new(transport),
            config,
        }
    }

    /// Counts the words of `input` on the candidates that answer the probe.
    ///
    /// The result file is only written once every phase has succeeded.
    pub async fn run(
        &self,
        input: &Path,
        candidates: &[WorkerAddress],
        probe_timeout: Duration,
    ) -> Result<RunSummary, PipelineError> {
        self.config.validate()?;
        if !input.is_file() {
            return Err(PipelineError::InvalidArgument(format!(
                "input file {} does not exist",
                input.display()
            )));
        }
        if candidates.is_empty() {
            return Err(PipelineError::NoLiveWorkers { candidates: 0 });
        }
        let probe = RemoteCommand::from_parts(&self.config.probe_command).ok_or_else(|| {
            PipelineError::Config("probe_command must name a program".to_string())
        })?;

        let mut timings = PhaseTimings::default();

        let started = Instant::now();
        let live = probe_workers(&self.transport, candidates, &probe, probe_timeout).await;
        timings.probe = started.elapsed();
        info!(
            phase = "probe",
            candidates = candidates.len(),
            live = live.len(),
            wall_ms = timings.probe.as_millis() as u64,
            "Probe phase complete"
        );
        if live.is_empty() {
            return Err(PipelineError::NoLiveWorkers {
                candidates: candidates.len(),
            });
        }

        let started = Instant::now();
        let layout = WorkLayout::prepare(&self.config.work_dir, &self.config.result_file)?;
        let shards = split_input(input, live.len(), &layout)?;
        timings.split = started.elapsed();
        info!(
            phase = "split",
            shards = shards.len(),
            wall_ms = timings.split.as_millis() as u64,
            "Split phase complete"
        );

        let started = Instant::now();
        let index = self.map_phase(&live, &shards, &layout).await?;
        timings.map = started.elapsed();
        info!(
            phase = "map",
            workers = live.len(),
            keys = index.len(),
            wall_ms = timings.map.as_millis() as u64,
            "Map phase complete"
        );

        let started = Instant::now();
        let partitions = partition_keys(&index, live.len());
        timings.shuffle = started.elapsed();
        for (address, partition) in live.iter().zip(&partitions) {
            debug!(address = %address, keys = partition.keys.len(), shards = partition.shards.len(), "Reducer assignment");
        }
        info!(
            phase = "shuffle",
            keys = index.len(),
            reducers = partitions.len(),
            wall_ms = timings.shuffle.as_millis() as u64,
            "Shuffle phase complete"
        );

        let started = Instant::now();
        let histogram = self.reduce_phase(&live, &partitions, &layout).await?;
        timings.reduce = started.elapsed();
        info!(
            phase = "reduce",
            workers = live.len(),
            keys = histogram.len(),
            wall_ms = timings.reduce.as_millis() as u64,
            "Reduce phase complete"
        );

        let started = Instant::now();
        histogram.write_sorted(layout.result())?;
        if self.config.clean_intermediates {
            layout.remove_intermediates()?;
        }
        timings.assemble = started.elapsed();
        info!(
            phase = "assemble",
            result = %layout.result().display(),
            wall_ms = timings.assemble.as_millis() as u64,
            "Assemble phase complete"
        );

        Ok(RunSummary {
            live_workers: live,
            distinct_keys: histogram.len(),
            total_count: histogram.total(),
            result_path: layout.result().to_path_buf(),
            timings,
        })
    }

    /// One SXUMX job per live worker; map job `i` owns shard `i`
    async fn map_phase(
        &self,
        live: &[WorkerAddress],
        shards: &[PathBuf],
        layout: &WorkLayout,
    ) -> Result<KeyIndex, PipelineError> {
        let mut jobs: Vec<RemoteJob<T>> = live
            .iter()
            .zip(shards)
            .enumerate()
            .map(|(id, (address, shard))| {
                let spec = JobSpec::Map {
                    output: layout.intermediate(address),
                    input: shard.clone(),
                };
                RemoteJob::new(id, address.clone(), spec)
            })
            .collect();
        let queues = self.start_jobs(&mut jobs)?;

        let mut index = KeyIndex::new();
        drain_jobs(&mut jobs, queues, |job, word| {
            if !word.is_empty() {
                index.record(&word, job.id());
            }
            Ok(())
        })
        .await?;

        self.join_jobs(jobs).await?;
        Ok(index)
    }

    async fn reduce_phase(
        &self,
        live: &[WorkerAddress],
        partitions: &[ReducePartition],
        layout: &WorkLayout,
    ) -> Result<Histogram, PipelineError> {
        let mut key_files = KeyFiles::new(self.config.keep_key_files);
        let mut jobs = Vec::with_capacity(partitions.len());
        for (id, (address, partition)) in live.iter().zip(partitions).enumerate() {
            let keys_file = layout.keys(address);
            key_files.write(&keys_file, &partition.keys)?;

            let inputs = partition
                .shards
                .iter()
                .filter_map(|&shard| live.get(shard))
                .map(|mapper| layout.intermediate(mapper))
                .collect();
            let spec = JobSpec::Reduce {
                output: layout.reduce_output(address),
                inputs,
                keys_file,
            };
            jobs.push(RemoteJob::new(id, address.clone(), spec));
        }
        let queues = self.start_jobs(&mut jobs)?;

        let mut histogram = Histogram::new();
        drain_jobs(&mut jobs, queues, |job, line| {
            let (key, count) =
                parse_count_line(&line).ok_or_else(|| PipelineError::MalformedCount {
                    address: job.address().to_string(),
                    line: line.clone(),
                })?;
            histogram.add(key, count);
            Ok(())
        })
        .await?;

        self.join_jobs(jobs).await?;
        Ok(histogram)
    }

    fn start_jobs(
        &self,
        jobs: &mut [RemoteJob<T>],
    ) -> Result<Vec<(usize, JobOutputQueue)>, PipelineError> {
        jobs.iter_mut()
            .map(|job| {
                let queue = job.start(
                    &self.transport,
                    &self.config.worker_program,
                    self.config.queue_capacity,
                )?;
                Ok((job.id(), queue))
            })
            .collect()
    }

    async fn join_jobs(&self, jobs: Vec<RemoteJob<T>>) -> Result<(), PipelineError> {
        for job in jobs {
            job.join().await?;
        }
        Ok(())
    }
}

/// Reducer key lists, removed when the reduce phase ends however it ends
struct KeyFiles {
    paths: Vec<PathBuf>,
    keep: bool,
}

impl KeyFiles {
    fn new(keep: bool) -> Self {
        Self {
            paths: Vec::new(),
            keep,
        }
    }

    fn write(&mut self, path: &Path, keys: &[String]) -> Result<(), PipelineError> {
        let mut contents = String::new();
        for key in keys {
            contents.push_str(key);
            contents.push('\n');
        }
        self.paths.push(path.to_path_buf());
        fs::write(path, contents).io_context(|| format!("writing keys {}", path.display()))
    }
}

impl Drop for KeyFiles {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        for path in &self.paths {
            if let Err(e) = fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "Failed to remove keys file");
            }
        }
    }
}
