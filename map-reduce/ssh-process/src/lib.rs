// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use map_reduce_core::config::PipelineConfig;
use map_reduce_core::protocol::RemoteCommand;
use map_reduce_core::transport::{ExitReport, Transport};
use map_reduce_core::worker_address::WorkerAddress;
use std::io;
use std::process::Stdio;
use tokio::process::{Child, ChildStdout, Command};

/// Child process killed when dropped
pub struct AutoKillChild(Child);

impl Drop for AutoKillChild {
    fn drop(&mut self) {
        let _ = self.0.start_kill();
    }
}

/// Runs commands as `<ssh_program> <ssh_options..> <address> <command line>`
#[derive(Debug, Clone)]
pub struct SshTransport {
    program: String,
    options: Vec<String>,
}

impl SshTransport {
    pub fn new(program: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            program: program.into(),
            options,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.ssh_program.clone(), config.ssh_options.clone())
    }
}

#[async_trait]
impl Transport for SshTransport {
    type Handle = AutoKillChild;
    type Stdout = ChildStdout;

    fn launch(
        &self,
        address: &WorkerAddress,
        command: &RemoteCommand,
    ) -> io::Result<(Self::Handle, Self::Stdout)> {
        let mut child = Command::new(&self.program)
            .args(&self.options)
            .arg(address.as_str())
            .arg(command.to_shell_line())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("remote shell stdout was not captured"))?;
        Ok((AutoKillChild(child), stdout))
    }

    async fn join(mut handle: Self::Handle) -> io::Result<ExitReport> {
        let status = handle.0.wait().await?;
        Ok(ExitReport {
            code: status.code(),
        })
    }
}
