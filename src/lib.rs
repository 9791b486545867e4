//! # Rust Log Adapter
//!
//! A logging output adapter that renders structured records to two
//! destinations at once.
//!
//! ## Features
//!
//! - **Dual sinks**: a JSON-lines file and the process's stderr
//! - **Environment-aware console**: JSON inside containers, ANSI color on
//!   terminals, plain text otherwise
//! - **Cross-process safe**: every line is written under an exclusive
//!   advisory lock with a bounded wait
//! - **Stack collapsing**: runs of async-executor frames shrink to one

pub mod core;
pub mod hooks;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        AdapterError, AdapterMetrics, AdapterOptions, ConsoleOption, Environment, FieldValue,
        LineFormatter, LogAdapter, LogRecord, OutputFormat, RecordFormatter, Result, Severity,
        StackFrame,
    };
    pub use crate::sinks::Sink;
}

pub use crate::core::{
    AdapterError, AdapterMetrics, AdapterOptions, ConsoleMode, ConsoleOption, Environment,
    ErrorCallback, FieldValue, FileMode, FileTarget, LineFormatter, LogAdapter, LogRecord,
    OutputFormat, RecordFormatter, Result, Severity, SinkConfig, StackCollapser, StackFrame,
    DEFAULT_LOCK_TIMEOUT,
};
pub use crate::sinks::{ConsoleSink, FileSink, Sink};
