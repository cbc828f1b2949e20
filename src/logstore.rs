//! Append-only, size-capped log file on the data partition.
//!
//! Every call opens the file, does its work and closes it again: no handle
//! outlives a call, so nothing is left dangling across deep sleep.
//!
//! ```text
//!   append(msg) ──▶ size + len + 1 > limit ? ──yes──▶ Err(Full)
//!                                 │ no
//!                                 ▼
//!                  open(append) ─▶ write msg + '\n' ─▶ flush ─▶ close
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::app::ports::LogSink;

/// Default location on the SPIFFS partition.
pub const DEFAULT_LOG_PATH: &str = "/spiffs/LOGS.txt";

/// Hard cap on the stored log, in bytes.
pub const LOG_SIZE_LIMIT: u64 = 10 * 1024;

/// Bytes returned by a tail read.
pub const TAIL_LEN: usize = 512;

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogError {
    /// Appending would push the file past its limit.
    Full { size: u64, limit: u64 },
    /// Filesystem error (partition missing, write failed, ...).
    Io,
}

impl core::fmt::Display for LogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full { size, limit } => write!(f, "log full ({}/{} bytes)", size, limit),
            Self::Io => write!(f, "log I/O error"),
        }
    }
}

impl From<io::Error> for LogError {
    fn from(_: io::Error) -> Self {
        Self::Io
    }
}

// ── PersistentLog ─────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PersistentLog {
    path: PathBuf,
    size_limit: u64,
}

#[derive(Serialize)]
struct TailDocument<'a> {
    content: &'a str,
}

impl PersistentLog {
    pub fn new(path: impl Into<PathBuf>, size_limit: u64) -> Self {
        Self {
            path: path.into(),
            size_limit,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_limit(&self) -> u64 {
        self.size_limit
    }

    /// Current file size; a missing file counts as empty.
    pub fn size(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_full(&self) -> bool {
        self.size() >= self.size_limit
    }

    /// Append one record.  The stored content is untouched on rejection.
    pub fn append(&self, message: &str) -> Result<(), LogError> {
        let size = self.size();
        let needed = message.len() as u64 + 1;
        if size + needed > self.size_limit {
            return Err(LogError::Full {
                size,
                limit: self.size_limit,
            });
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(message.as_bytes())?;
        file.write_all(b"\n")?;
        file.flush()?;
        Ok(())
    }

    /// The last [`TAIL_LEN`] bytes of the file (fewer if it is shorter).
    pub fn read_tail(&self) -> Result<Vec<u8>, LogError> {
        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let len = file.metadata()?.len();
        let start = len.saturating_sub(TAIL_LEN as u64);
        file.seek(SeekFrom::Start(start))?;

        let mut tail = Vec::with_capacity(TAIL_LEN);
        file.read_to_end(&mut tail)?;
        Ok(tail)
    }

    /// Tail wrapped as `{"content": "..."}`, pretty-printed.
    pub fn read_tail_json(&self) -> Result<String, LogError> {
        let tail = self.read_tail()?;
        let content = String::from_utf8_lossy(&tail);
        serde_json::to_string_pretty(&TailDocument { content: &content }).map_err(|_| LogError::Io)
    }

    /// Delete the file.  The next append starts a fresh one.
    pub fn truncate(&self) -> Result<(), LogError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Log: truncated {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Hand the whole stored log to `sink`; truncate only if it accepts.
    ///
    /// Returns whether the sink took the content.
    pub fn drain(&self, sink: &mut impl LogSink) -> Result<bool, LogError> {
        let content = match fs::read(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(e.into()),
        };
        if content.is_empty() {
            return Ok(true);
        }
        if sink.flush(&content) {
            self.truncate()?;
            Ok(true)
        } else {
            warn!("Log: sink refused {} bytes, keeping log", content.len());
            Ok(false)
        }
    }
}

impl Default for PersistentLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_PATH, LOG_SIZE_LIMIT)
    }
}
