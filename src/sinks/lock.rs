//! Advisory-locked writes shared by every sink
//!
//! Each line is written under an exclusive `flock`-style lock on the
//! destination's descriptor, so independent processes appending to the same
//! file never interleave partial lines. Lock waits are bounded; when the lock
//! cannot be taken the failure goes to the side channel and the write happens
//! anyway.

use crate::core::error::{AdapterError, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

const INITIAL_BACKOFF: Duration = Duration::from_millis(1);
const MAX_BACKOFF: Duration = Duration::from_millis(10);

/// Writes whole lines under an exclusive advisory lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedWriter {
    timeout: Duration,
}

impl LockedWriter {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Lock, write, flush, unlock
    ///
    /// Lock problems are pushed onto `lock_errors` and never abort the write.
    /// The returned error, if any, is the write failure itself.
    pub fn write(
        &self,
        sink: &str,
        handle: &mut File,
        line: &[u8],
        lock_errors: &mut Vec<AdapterError>,
    ) -> Result<()> {
        let locked = match self.acquire(sink, handle) {
            Ok(()) => true,
            Err(err) => {
                lock_errors.push(err);
                false
            }
        };

        let written = handle
            .write_all(line)
            .and_then(|()| handle.flush())
            .map_err(|e| AdapterError::write(sink, e));

        if locked {
            if let Err(e) = FileExt::unlock(&*handle) {
                lock_errors.push(AdapterError::lock(sink, e));
            }
        }

        written
    }

    /// Poll `try_lock_exclusive` with capped exponential backoff until the timeout
    fn acquire(&self, sink: &str, handle: &File) -> Result<()> {
        let start = Instant::now();
        let mut backoff = INITIAL_BACKOFF;

        loop {
            match handle.try_lock_exclusive() {
                Ok(()) => return Ok(()),
                Err(e) if is_contended(&e) => {
                    let waited = start.elapsed();
                    if waited >= self.timeout {
                        return Err(AdapterError::lock_timeout(sink, waited));
                    }
                    thread::sleep(backoff.min(self.timeout - waited));
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                Err(e) => return Err(AdapterError::lock(sink, e)),
            }
        }
    }
}

fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
