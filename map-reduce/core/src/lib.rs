// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

pub mod config;
pub mod error;
pub mod histogram;
pub mod layout;
pub mod liveness;
pub mod pipeline;
pub mod protocol;
pub mod remote_job;
pub mod shuffle;
pub mod splitter;
pub mod transport;
pub mod worker_address;

pub use error::PipelineError;
pub use pipeline::{Pipeline, RunSummary};
