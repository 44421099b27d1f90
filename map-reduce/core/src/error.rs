// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::protocol::Mode;
use std::io;

/// Everything that can abort a pipeline run or a worker job
#[derive(Debug)]
pub enum PipelineError {
    /// Local file I/O failed
    Io { context: String, source: io::Error },

    /// A command-line argument, address or path was rejected
    InvalidArgument(String),

    /// A packed field contained the reserved `___` separator
    SeparatorInField(String),

    /// No candidate address answered the liveness probe in time
    NoLiveWorkers { candidates: usize },

    /// The transport could not start a remote session
    Launch { address: String, source: io::Error },

    /// A remote job ended without its sentinel or its output was unreadable
    JobFailed {
        address: String,
        mode: Mode,
        reason: String,
    },

    /// A reducer emitted a line that is not `<key> <count>`
    MalformedCount { address: String, line: String },

    /// The configuration file is unreadable or inconsistent
    Config(String),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::Io { context, source } => write!(f, "{}: {}", context, source),
            PipelineError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            PipelineError::SeparatorInField(field) => {
                write!(f, "Field '{}' contains the reserved '___' separator", field)
            }
            PipelineError::NoLiveWorkers { candidates } => write!(
                f,
                "No live worker: none of the {} candidate addresses answered the probe",
                candidates
            ),
            PipelineError::Launch { address, source } => {
                write!(f, "Failed to start remote session on {}: {}", address, source)
            }
            PipelineError::JobFailed {
                address,
                mode,
                reason,
            } => write!(f, "{} job on {} failed: {}", mode, address, reason),
            PipelineError::MalformedCount { address, line } => {
                write!(f, "Reducer on {} sent a malformed line: '{}'", address, line)
            }
            PipelineError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io { source, .. } | PipelineError::Launch { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Attaches a human-readable context to `io::Error`s
pub trait IoContext<T> {
    fn io_context<F>(self, context: F) -> Result<T, PipelineError>
    where
        F: FnOnce() -> String;
}

impl<T> IoContext<T> for Result<T, io::Error> {
    fn io_context<F>(self, context: F) -> Result<T, PipelineError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|source| PipelineError::Io {
            context: context(),
            source,
        })
    }
}
