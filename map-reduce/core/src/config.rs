// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::PipelineError;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capacity of each job's output queue, in lines
    pub queue_capacity: usize,
    /// Program started on the remote host for map and reduce jobs
    pub worker_program: String,
    /// Trivial command used by the liveness probe (program first)
    pub probe_command: Vec<String>,
    /// Root of the Sx/UMx/Keys/RMx layout
    pub work_dir: PathBuf,
    /// Final result file, relative to `work_dir`
    pub result_file: PathBuf,
    /// Keep the per-reducer key files once the reduce phase is over
    pub keep_key_files: bool,
    /// Remove Sx/UMx/RMx after a successful run
    pub clean_intermediates: bool,
    /// Remote-shell program (master side only)
    pub ssh_program: String,
    /// Options passed to the remote-shell program before the address
    pub ssh_options: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 15_000,
            worker_program: "wordcount-worker".to_string(),
            probe_command: vec!["echo".to_string(), "alive".to_string()],
            work_dir: PathBuf::from("."),
            result_file: PathBuf::from("wordcount.txt"),
            keep_key_files: false,
            clean_intermediates: false,
            ssh_program: "ssh".to_string(),
            ssh_options: vec!["-o".to_string(), "BatchMode=yes".to_string()],
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &str) -> Result<Self, PipelineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("cannot read {}: {}", path, e)))?;
        let config: PipelineConfig = serde_json::from_str(&contents)
            .map_err(|e| PipelineError::Config(format!("cannot parse {}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.queue_capacity == 0 {
            return Err(PipelineError::Config(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.worker_program.trim().is_empty() {
            return Err(PipelineError::Config(
                "worker_program must not be empty".to_string(),
            ));
        }
        if self.probe_command.is_empty() {
            return Err(PipelineError::Config(
                "probe_command must name a program".to_string(),
            ));
        }
        Ok(())
    }
}
