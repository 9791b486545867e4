//! Console (stderr) sink

use super::lock::LockedWriter;
use super::Sink;
use crate::core::error::{AdapterError, Result};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::fs::File;
use std::time::Duration;

/// How text reaches the console handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleEncoding {
    /// UTF-8 passes through untouched
    Unicode,
    /// Non-ASCII characters are written as `\uXXXX` escapes of their UTF-16
    /// units, the form JSON string literals use, so JSON lines stay valid
    AsciiEscaped,
}

impl ConsoleEncoding {
    /// Decide from the locale variables, highest precedence first
    /// (`LC_ALL`, `LC_CTYPE`, `LANG`). No locale at all means UTF-8.
    pub fn from_locale<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let active = candidates
            .into_iter()
            .flatten()
            .find(|value| !value.is_empty());

        match active {
            None => ConsoleEncoding::Unicode,
            Some(locale) => {
                let lower = locale.to_ascii_lowercase();
                if lower.contains("utf-8") || lower.contains("utf8") {
                    ConsoleEncoding::Unicode
                } else {
                    ConsoleEncoding::AsciiEscaped
                }
            }
        }
    }

    fn detect() -> Self {
        let vars: Vec<Option<String>> = ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .map(|name| std::env::var(name).ok())
            .collect();
        Self::from_locale(vars.iter().map(Option::as_deref))
    }

    pub fn encode<'a>(&self, line: &'a str) -> Cow<'a, str> {
        match self {
            ConsoleEncoding::Unicode => Cow::Borrowed(line),
            ConsoleEncoding::AsciiEscaped if line.is_ascii() => Cow::Borrowed(line),
            ConsoleEncoding::AsciiEscaped => {
                let mut escaped = String::with_capacity(line.len() + 8);
                let mut units = [0u16; 2];
                for c in line.chars() {
                    if c.is_ascii() {
                        escaped.push(c);
                        continue;
                    }
                    for unit in c.encode_utf16(&mut units) {
                        escaped.push_str(&format!("\\u{:04x}", unit));
                    }
                }
                Cow::Owned(escaped)
            }
        }
    }
}

struct ConsoleState {
    handle: Option<File>,
    encoding: Option<ConsoleEncoding>,
}

/// Console destination
///
/// Bound to stderr lazily on first write. The encoding decision is made once
/// per handle and reused for every later line.
pub struct ConsoleSink {
    state: Mutex<ConsoleState>,
    writer: LockedWriter,
}

impl ConsoleSink {
    pub fn stderr(lock_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(ConsoleState {
                handle: None,
                encoding: None,
            }),
            writer: LockedWriter::new(lock_timeout),
        }
    }

    /// Console sink writing to an already-open handle instead of stderr
    pub fn from_file(file: File, lock_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(ConsoleState {
                handle: Some(file),
                encoding: None,
            }),
            writer: LockedWriter::new(lock_timeout),
        }
    }

    /// Fix the encoding instead of probing the locale
    #[must_use]
    pub fn with_encoding(self, encoding: ConsoleEncoding) -> Self {
        self.state.lock().encoding = Some(encoding);
        self
    }

    /// Encoding in effect, if the first write has happened or it was fixed
    pub fn encoding(&self) -> Option<ConsoleEncoding> {
        self.state.lock().encoding
    }
}

impl Sink for ConsoleSink {
    fn write_line(&self, line: &str, lock_errors: &mut Vec<AdapterError>) -> Result<()> {
        let mut state = self.state.lock();
        let encoding = *state.encoding.get_or_insert_with(ConsoleEncoding::detect);

        let handle = match state.handle.take() {
            Some(handle) => handle,
            None => duplicate_stderr().map_err(|e| AdapterError::write("console", e))?,
        };
        let handle = state.handle.insert(handle);

        let encoded = encoding.encode(line);
        self.writer.write("console", handle, encoded.as_bytes(), lock_errors)
    }

    fn name(&self) -> &str {
        "console"
    }
}

/// An owned handle on the process's stderr, suitable for locking
#[cfg(unix)]
fn duplicate_stderr() -> std::io::Result<File> {
    use std::os::fd::AsFd;
    Ok(File::from(std::io::stderr().as_fd().try_clone_to_owned()?))
}

#[cfg(windows)]
fn duplicate_stderr() -> std::io::Result<File> {
    use std::os::windows::io::AsHandle;
    Ok(File::from(std::io::stderr().as_handle().try_clone_to_owned()?))
}
