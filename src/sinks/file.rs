//! JSON-lines file sink

use super::lock::LockedWriter;
use super::Sink;
use crate::core::error::{AdapterError, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::time::Duration;

/// Append-only file destination, opened eagerly
///
/// The handle is unbuffered: each line reaches the OS before `write_line`
/// returns.
pub struct FileSink {
    handle: Mutex<File>,
    writer: LockedWriter,
}

impl FileSink {
    /// Open (or create) `path` for appending
    ///
    /// Fails with `AdapterError::Configuration` when the file cannot be opened.
    pub fn open(path: impl Into<PathBuf>, lock_timeout: Duration) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| AdapterError::configuration(path, e))?;

        Ok(Self {
            handle: Mutex::new(file),
            writer: LockedWriter::new(lock_timeout),
        })
    }
}

impl Sink for FileSink {
    fn write_line(&self, line: &str, lock_errors: &mut Vec<AdapterError>) -> Result<()> {
        let mut handle = self.handle.lock();
        self.writer.write(self.name(), &mut handle, line.as_bytes(), lock_errors)
    }

    fn name(&self) -> &str {
        "file"
    }
}
