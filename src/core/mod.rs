//! Core adapter types

pub mod adapter;
pub mod config;
pub mod error;
pub mod field;
pub mod formatter;
pub mod metrics;
pub mod record;
pub mod severity;
pub mod stack;
pub mod timestamp;

pub use adapter::LogAdapter;
pub use config::{
    AdapterOptions, ConsoleMode, ConsoleOption, Environment, FileMode, FileTarget, SinkConfig,
    DEFAULT_LOCK_TIMEOUT,
};
pub use error::{AdapterError, ErrorCallback, Result};
pub use field::FieldValue;
pub use formatter::{LineFormatter, OutputFormat, RecordFormatter};
pub use metrics::AdapterMetrics;
pub use record::{LogRecord, StackFrame};
pub use severity::Severity;
pub use stack::StackCollapser;
