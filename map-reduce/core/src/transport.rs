// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::protocol::RemoteCommand;
use crate::worker_address::WorkerAddress;
use async_trait::async_trait;
use std::io;
use tokio::io::AsyncRead;

/// How a remote session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// `None` when the session was terminated by a signal
    pub code: Option<i32>,
}

impl ExitReport {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs commands on worker hosts and streams back their stdout.
///
/// Dropping a [`Transport::Handle`] must terminate the remote session.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    type Handle: Send + 'static;
    type Stdout: AsyncRead + Send + Unpin + 'static;

    /// Start `command` on `address`
    fn launch(
        &self,
        address: &WorkerAddress,
        command: &RemoteCommand,
    ) -> io::Result<(Self::Handle, Self::Stdout)>;

    /// Wait for the session to end
    async fn join(handle: Self::Handle) -> io::Result<ExitReport>;
}
