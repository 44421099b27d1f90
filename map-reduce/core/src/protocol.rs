// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Wire format shared by the master and the workers.
//!
//! Workers are driven purely through their argument vector and answer on
//! stdout, one record per line, closing with a sentinel line:
//!
//! ```text
//! SXUMX  : <word>\n ... END OF PROCESS SXUMX\n
//! UMXRMX : <key> <count>\n ... END OF PROCESS UMXRMX\n
//! ```

use crate::error::PipelineError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Reserved separator for packing several paths into one argument
pub const FIELD_SEPARATOR: &str = "___";

const SENTINEL_PREFIX: &str = "END OF PROCESS ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Input shard -> intermediate shard (map)
    Map,
    /// Intermediate shards -> final shard (reduce)
    Reduce,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Map => "SXUMX",
            Mode::Reduce => "UMXRMX",
        }
    }

    /// The line that closes a worker's stdout for this mode
    pub fn sentinel(&self) -> String {
        format!("{}{}", SENTINEL_PREFIX, self.as_str())
    }

    pub fn is_sentinel(&self, line: &str) -> bool {
        line.strip_prefix(SENTINEL_PREFIX) == Some(self.as_str())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One worker invocation, independent of the transport that carries it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSpec {
    Map {
        output: PathBuf,
        input: PathBuf,
    },
    Reduce {
        output: PathBuf,
        inputs: Vec<PathBuf>,
        keys_file: PathBuf,
    },
}

impl JobSpec {
    pub fn mode(&self) -> Mode {
        match self {
            JobSpec::Map { .. } => Mode::Map,
            JobSpec::Reduce { .. } => Mode::Reduce,
        }
    }

    pub fn output(&self) -> &Path {
        match self {
            JobSpec::Map { output, .. } | JobSpec::Reduce { output, .. } => output,
        }
    }

    /// Worker argument vector, mode first
    pub fn to_args(&self) -> Result<Vec<String>, PipelineError> {
        match self {
            JobSpec::Map { output, input } => Ok(vec![
                Mode::Map.as_str().to_string(),
                path_arg(output)?,
                path_arg(input)?,
            ]),
            JobSpec::Reduce {
                output,
                inputs,
                keys_file,
            } => {
                let inputs = inputs
                    .iter()
                    .map(|p| path_arg(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(vec![
                    Mode::Reduce.as_str().to_string(),
                    path_arg(output)?,
                    pack_fields(&inputs)?,
                    path_arg(keys_file)?,
                ])
            }
        }
    }

    /// Inverse of [`JobSpec::to_args`]
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, PipelineError> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        match args.as_slice() {
            ["SXUMX", output, input] => Ok(JobSpec::Map {
                output: PathBuf::from(output),
                input: PathBuf::from(input),
            }),
            ["UMXRMX", output, inputs, keys_file] => Ok(JobSpec::Reduce {
                output: PathBuf::from(output),
                inputs: unpack_fields(inputs).into_iter().map(PathBuf::from).collect(),
                keys_file: PathBuf::from(keys_file),
            }),
            ["SXUMX", ..] => Err(PipelineError::InvalidArgument(
                "SXUMX expects <output file> <input file>".to_string(),
            )),
            ["UMXRMX", ..] => Err(PipelineError::InvalidArgument(
                "UMXRMX expects <output file> <input files> <keys file>".to_string(),
            )),
            [] => Err(PipelineError::InvalidArgument(
                "missing <mode> argument".to_string(),
            )),
            [mode, ..] => Err(PipelineError::InvalidArgument(format!(
                "mode must be SXUMX or UMXRMX, got '{}'",
                mode
            ))),
        }
    }
}

fn path_arg(path: &Path) -> Result<String, PipelineError> {
    let arg = path.to_str().ok_or_else(|| {
        PipelineError::InvalidArgument(format!("path is not valid UTF-8: {}", path.display()))
    })?;
    if arg.contains(FIELD_SEPARATOR) {
        return Err(PipelineError::SeparatorInField(arg.to_string()));
    }
    Ok(arg.to_string())
}

/// Joins fields with `___`; an empty list packs to the empty string
pub fn pack_fields<S: AsRef<str>>(fields: &[S]) -> Result<String, PipelineError> {
    if let Some(bad) = fields
        .iter()
        .map(|f| f.as_ref())
        .find(|f| f.contains(FIELD_SEPARATOR))
    {
        return Err(PipelineError::SeparatorInField(bad.to_string()));
    }
    Ok(fields
        .iter()
        .map(|f| f.as_ref())
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR))
}

pub fn unpack_fields(packed: &str) -> Vec<String> {
    packed
        .split(FIELD_SEPARATOR)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses one reducer record, `<key> <count>`
pub fn parse_count_line(line: &str) -> Option<(&str, u64)> {
    let (key, count) = line.split_once(' ')?;
    if key.is_empty() {
        return None;
    }
    count.parse().ok().map(|count| (key, count))
}

/// A program plus its arguments, to be run on a remote host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl RemoteCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds a command from a non-empty `[program, args...]` list
    pub fn from_parts(parts: &[String]) -> Option<Self> {
        let (program, args) = parts.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    /// Single command line for shells on the remote side
    pub fn to_shell_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| shell_quote(part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(part: &str) -> String {
    let safe = !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_./:=@%+-".contains(c));
    if safe {
        part.to_string()
    } else {
        format!("'{}'", part.replace('\'', "'\\''"))
    }
}
