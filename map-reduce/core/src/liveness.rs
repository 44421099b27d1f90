// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::protocol::RemoteCommand;
use crate::transport::Transport;
use crate::worker_address::WorkerAddress;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Probes every candidate at once and keeps those that answer within `timeout`.
///
/// The phase always lasts `timeout`; probes still running at that point are
/// cancelled and their sessions dropped. The result keeps candidate order.
pub async fn probe_workers<T: Transport>(
    transport: &Arc<T>,
    candidates: &[WorkerAddress],
    probe: &RemoteCommand,
    timeout: Duration,
) -> Vec<WorkerAddress> {
    let token = CancellationToken::new();

    let probes: Vec<_> = candidates
        .iter()
        .map(|address| {
            let transport = Arc::clone(transport);
            let address = address.clone();
            let probe = probe.clone();
            let token = token.clone();
            tokio::spawn(async move { probe_one(transport.as_ref(), &address, &probe, token).await })
        })
        .collect();

    tokio::time::sleep(timeout).await;
    token.cancel();

    let mut live = Vec::new();
    for (address, probe) in candidates.iter().zip(probes) {
        let alive = match probe.await {
            Ok(alive) => alive,
            Err(e) => {
                warn!(address = %address, error = %e, "Probe task failed");
                false
            }
        };
        info!(address = %address, alive, "Probe result");
        if alive {
            live.push(address.clone());
        }
    }
    live
}

async fn probe_one<T: Transport>(
    transport: &T,
    address: &WorkerAddress,
    probe: &RemoteCommand,
    token: CancellationToken,
) -> bool {
    let (handle, stdout) = match transport.launch(address, probe) {
        Ok(session) => session,
        Err(e) => {
            warn!(address = %address, error = %e, "Probe could not be launched");
            return false;
        }
    };
    let mut lines = BufReader::new(stdout).lines();

    let alive = tokio::select! {
        _ = token.cancelled() => false,
        line = lines.next_line() => matches!(line, Ok(Some(_))),
    };
    drop(handle);
    alive
}
