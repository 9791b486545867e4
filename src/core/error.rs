//! Error types for the log adapter

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, AdapterError>;

/// Side channel for failures that must not re-enter the log stream
pub type ErrorCallback = Arc<dyn Fn(&AdapterError) + Send + Sync>;

/// Default side channel: one line on the process's stderr
pub fn stderr_error_callback() -> ErrorCallback {
    Arc::new(report_to_stderr)
}

pub fn report_to_stderr(err: &AdapterError) {
    eprintln!("[LOG ADAPTER ERROR] {}", err);
}

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// File sink target could not be opened or created
    #[error("Cannot open log file '{}': {source}", path.display())]
    Configuration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Severity outside the closed set
    #[error("Unknown severity '{0}' (expected one of trace, debug, info, warning, error, fatal, critical)")]
    UnknownSeverity(String),

    /// Advisory lock syscall failed
    #[error("Failed to lock {sink} sink: {source}")]
    LockAcquisition {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    /// Advisory lock still held by another writer after the bounded wait
    #[error("Timed out after {waited:?} waiting for {sink} sink lock")]
    LockTimeout { sink: String, waited: Duration },

    /// Writing a rendered line failed
    #[error("Write to {sink} sink failed: {source}")]
    Write {
        sink: String,
        #[source]
        source: std::io::Error,
    },

    /// A sink or formatter panicked while handling a record
    #[error("{sink} sink panicked: {message}")]
    SinkPanicked { sink: String, message: String },

    /// A panic raised while this thread was already emitting a record
    #[error("Panic while emitting a record: {message}")]
    PanicDuringEmit { message: String },

    /// Formatter error with format type
    #[error("Formatter error ({format_type}): {message}")]
    Formatter {
        format_type: String,
        message: String,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AdapterError {
    /// Create a configuration error for an unopenable file sink
    pub fn configuration(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AdapterError::Configuration {
            path: path.into(),
            source,
        }
    }

    pub fn unknown_severity(value: impl Into<String>) -> Self {
        AdapterError::UnknownSeverity(value.into())
    }

    /// Create a lock acquisition error
    pub fn lock(sink: impl Into<String>, source: std::io::Error) -> Self {
        AdapterError::LockAcquisition {
            sink: sink.into(),
            source,
        }
    }

    pub fn lock_timeout(sink: impl Into<String>, waited: Duration) -> Self {
        AdapterError::LockTimeout {
            sink: sink.into(),
            waited,
        }
    }

    /// Create a sink write error
    pub fn write(sink: impl Into<String>, source: std::io::Error) -> Self {
        AdapterError::Write {
            sink: sink.into(),
            source,
        }
    }

    pub fn sink_panicked(sink: impl Into<String>, message: impl Into<String>) -> Self {
        AdapterError::SinkPanicked {
            sink: sink.into(),
            message: message.into(),
        }
    }

    pub fn panic_during_emit(message: impl Into<String>) -> Self {
        AdapterError::PanicDuringEmit {
            message: message.into(),
        }
    }

    /// Create a formatter error
    pub fn formatter(format_type: impl Into<String>, message: impl Into<String>) -> Self {
        AdapterError::Formatter {
            format_type: format_type.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the locking discipline rather than the write itself
    pub fn is_lock_failure(&self) -> bool {
        matches!(
            self,
            AdapterError::LockAcquisition { .. } | AdapterError::LockTimeout { .. }
        )
    }
}
