//! Opt-in redirection of panics into the structured log stream
//!
//! Nothing here runs unless the host application calls
//! [`install_panic_hook`] itself.

use crate::core::adapter::is_emitting;
use crate::core::error::{report_to_stderr, AdapterError};
use crate::core::{LogAdapter, LogRecord, Severity};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::PanicHookInfo;
use std::sync::Arc;

/// Replace the process panic hook with one that emits a `critical` record
///
/// The previous hook is dropped. Restore the default with
/// `std::panic::take_hook()`.
///
/// A panic raised while the same thread is already inside
/// [`LogAdapter::emit`] (a panicking formatter, sink or error callback) is
/// not emitted. It goes to stderr as a side-channel line instead, and the
/// adapter's own isolation reports it as usual once it is caught.
///
/// # Example
///
/// ```no_run
/// use rust_log_adapter::prelude::*;
/// use rust_log_adapter::hooks::install_panic_hook;
/// use std::sync::Arc;
///
/// let adapter = Arc::new(LogAdapter::configure(AdapterOptions::new().default_file())?);
/// install_panic_hook(Arc::clone(&adapter));
/// # Ok::<(), rust_log_adapter::AdapterError>(())
/// ```
pub fn install_panic_hook(adapter: Arc<LogAdapter>) {
    std::panic::set_hook(Box::new(move |info| {
        if is_emitting() {
            report_to_stderr(&AdapterError::panic_during_emit(panic_message(info)));
            return;
        }
        adapter.emit(panic_record(info, Backtrace::capture()));
    }));
}

/// Build the record emitted for a panic
pub fn panic_record(info: &PanicHookInfo<'_>, backtrace: Backtrace) -> LogRecord {
    let thread = std::thread::current();
    let mut record = LogRecord::new(Severity::Critical, panic_message(info))
        .with_field("thread", thread.name().unwrap_or("<unnamed>"));

    if let Some(location) = info.location() {
        record = record
            .with_field("file", location.file())
            .with_field("line", location.line());
    }

    if backtrace.status() == BacktraceStatus::Captured {
        record = record.with_field("backtrace", backtrace.to_string());
    }

    record
}

/// `panicked at <file>:<line>:<col>: <payload>`
fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    };

    match info.location() {
        Some(location) => format!("panicked at {}: {}", location, payload),
        None => format!("panicked: {}", payload),
    }
}
