// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{IoContext, PipelineError};
use crate::worker_address::WorkerAddress;
use std::fs;
use std::path::{Path, PathBuf};

const SHARD_DIR: &str = "Sx";
const INTERMEDIATE_DIR: &str = "UMx";
const KEYS_DIR: &str = "Keys";
const REDUCE_DIR: &str = "RMx";

/// File names of one run, rooted at an absolute work directory.
///
/// Workers receive these paths verbatim, so the work directory must be
/// visible under the same path on every host.
#[derive(Debug, Clone)]
pub struct WorkLayout {
    root: PathBuf,
    result: PathBuf,
}

impl WorkLayout {
    /// Creates the phase directories and resolves the root to an absolute path
    pub fn prepare(work_dir: &Path, result_file: &Path) -> Result<Self, PipelineError> {
        for dir in [SHARD_DIR, INTERMEDIATE_DIR, KEYS_DIR, REDUCE_DIR] {
            let path = work_dir.join(dir);
            fs::create_dir_all(&path).io_context(|| format!("creating {}", path.display()))?;
        }
        let root = fs::canonicalize(work_dir)
            .io_context(|| format!("resolving {}", work_dir.display()))?;
        let result = root.join(result_file);
        Ok(Self { root, result })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn shard_dir(&self) -> PathBuf {
        self.root.join(SHARD_DIR)
    }

    pub fn shard(&self, index: usize) -> PathBuf {
        self.shard_dir().join(format!("S_{}.txt", index))
    }

    pub fn intermediate(&self, address: &WorkerAddress) -> PathBuf {
        self.root
            .join(INTERMEDIATE_DIR)
            .join(format!("UM_{}.txt", address))
    }

    pub fn keys(&self, address: &WorkerAddress) -> PathBuf {
        self.root.join(KEYS_DIR).join(format!("Keys_{}.txt", address))
    }

    pub fn reduce_output(&self, address: &WorkerAddress) -> PathBuf {
        self.root.join(REDUCE_DIR).join(format!("RM_{}.txt", address))
    }

    pub fn result(&self) -> &Path {
        &self.result
    }

    /// Removes the shard, intermediate and reducer directories
    pub fn remove_intermediates(&self) -> Result<(), PipelineError> {
        for dir in [SHARD_DIR, INTERMEDIATE_DIR, REDUCE_DIR] {
            let path = self.root.join(dir);
            if path.exists() {
                fs::remove_dir_all(&path).io_context(|| format!("removing {}", path.display()))?;
            }
        }
        Ok(())
    }
}
