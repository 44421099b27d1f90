// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{IoContext, PipelineError};
use crate::protocol::FIELD_SEPARATOR;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Opaque name of a host reachable through the transport
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerAddress(String);

impl WorkerAddress {
    /// Rejects names that cannot be embedded in a file name or an argument
    pub fn parse(raw: &str) -> Result<Self, PipelineError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PipelineError::InvalidArgument(
                "empty worker address".to_string(),
            ));
        }
        if raw.chars().any(|c| c.is_whitespace() || c == '/') || raw.contains(FIELD_SEPARATOR) {
            return Err(PipelineError::InvalidArgument(format!(
                "worker address '{}' contains whitespace, '/' or '___'",
                raw
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WorkerAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parses an address list: one per line, `#` comments and blanks ignored
pub fn parse_addresses(contents: &str) -> Result<Vec<WorkerAddress>, PipelineError> {
    let mut seen = HashSet::new();
    let mut addresses = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let address = WorkerAddress::parse(line)?;
        if !seen.insert(address.clone()) {
            warn!(address = %address, "Duplicate worker address ignored");
            continue;
        }
        addresses.push(address);
    }
    Ok(addresses)
}

pub fn read_address_file(path: &Path) -> Result<Vec<WorkerAddress>, PipelineError> {
    let contents =
        fs::read_to_string(path).io_context(|| format!("reading addresses {}", path.display()))?;
    parse_addresses(&contents)
}
