// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(dead_code)]

use async_trait::async_trait;
use map_reduce_core::protocol::RemoteCommand;
use map_reduce_core::transport::{ExitReport, Transport};
use map_reduce_core::worker_address::WorkerAddress;
use std::collections::HashMap;
use std::io;
use std::sync::Mutex;
use tokio::io::{AsyncWriteExt, DuplexStream};

#[derive(Clone)]
pub enum Script {
    /// Writes the text, then exits with the code
    Reply(String, i32),
    /// Holds the session open without writing anything
    Silent,
    /// The session cannot be started
    Unreachable,
}

/// Answers every launch on an address with a fixed script
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    launches: Mutex<Vec<(String, RemoteCommand)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, script: Script) -> Self {
        self.scripts.insert(address.to_string(), script);
        self
    }

    pub fn launches(&self) -> Vec<(String, RemoteCommand)> {
        self.launches.lock().unwrap().clone()
    }
}

pub struct ScriptedSession {
    code: i32,
    _held_open: Option<DuplexStream>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    type Handle = ScriptedSession;
    type Stdout = DuplexStream;

    fn launch(
        &self,
        address: &WorkerAddress,
        command: &RemoteCommand,
    ) -> io::Result<(Self::Handle, Self::Stdout)> {
        self.launches
            .lock()
            .unwrap()
            .push((address.to_string(), command.clone()));

        let script = self
            .scripts
            .get(address.as_str())
            .cloned()
            .unwrap_or(Script::Unreachable);
        let (mut writer, reader) = tokio::io::duplex(1024);
        match script {
            Script::Reply(text, code) => {
                tokio::spawn(async move {
                    let _ = writer.write_all(text.as_bytes()).await;
                });
                Ok((
                    ScriptedSession {
                        code,
                        _held_open: None,
                    },
                    reader,
                ))
            }
            Script::Silent => Ok((
                ScriptedSession {
                    code: 0,
                    _held_open: Some(writer),
                },
                reader,
            )),
            Script::Unreachable => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "host unreachable",
            )),
        }
    }

    async fn join(handle: Self::Handle) -> io::Result<ExitReport> {
        Ok(ExitReport {
            code: Some(handle.code),
        })
    }
}

pub fn address(name: &str) -> WorkerAddress {
    WorkerAddress::parse(name).unwrap()
}
