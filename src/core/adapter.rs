//! The log adapter: configuration resolution and per-record dispatch

use super::{
    config::{AdapterOptions, ConsoleMode, Environment, FileMode, SinkConfig},
    error::{stderr_error_callback, AdapterError, ErrorCallback, Result},
    formatter::{LineFormatter, OutputFormat, RecordFormatter},
    metrics::AdapterMetrics,
    record::LogRecord,
    stack::StackCollapser,
};
use crate::sinks::{ConsoleSink, FileSink, Sink};
use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};

thread_local! {
    static EMITTING: Cell<bool> = const { Cell::new(false) };
}

/// Whether the current thread is inside [`LogAdapter::emit`]
///
/// Anything that reacts to a panic by logging (such as the panic hook) checks
/// this first: a panic raised mid-emit must not be fed back into a sink.
pub fn is_emitting() -> bool {
    EMITTING.with(Cell::get)
}

/// Marks the current thread as emitting until dropped, including on unwind
struct EmitScope {
    outer: bool,
}

impl EmitScope {
    fn enter() -> Self {
        Self {
            outer: EMITTING.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for EmitScope {
    fn drop(&mut self) {
        EMITTING.with(|flag| flag.set(self.outer));
    }
}

/// Renders each record to the configured file and console sinks
///
/// Sinks are resolved once in [`LogAdapter::configure`] and never change;
/// build a new adapter to change them. `emit` is safe to call from many
/// threads at once.
///
/// # Example
///
/// ```no_run
/// use rust_log_adapter::prelude::*;
///
/// let adapter = LogAdapter::configure(
///     AdapterOptions::new()
///         .file("service.json.log")
///         .console(ConsoleOption::Auto),
/// )?;
///
/// adapter.emit(
///     LogRecord::new(Severity::Warning, "disk low")
///         .with_frame("main", "check")
///         .with_field("host", "web-1"),
/// );
/// # Ok::<(), rust_log_adapter::AdapterError>(())
/// ```
pub struct LogAdapter {
    config: SinkConfig,
    collapser: StackCollapser,
    formatter: Box<dyn RecordFormatter>,
    file_sink: Option<Box<dyn Sink>>,
    console_sink: Option<Box<dyn Sink>>,
    on_error: ErrorCallback,
    metrics: AdapterMetrics,
}

impl LogAdapter {
    /// Resolve `options` against the running process and open the sinks
    ///
    /// Fails if a file sink was requested and cannot be opened or created.
    pub fn configure(options: AdapterOptions) -> Result<Self> {
        Self::configure_with_env(options, Environment::detect())
    }

    /// Same as [`configure`](Self::configure) with an explicit environment
    pub fn configure_with_env(options: AdapterOptions, env: Environment) -> Result<Self> {
        let config = SinkConfig::resolve(&options, &env);

        let file_sink: Option<Box<dyn Sink>> = match &config.file {
            FileMode::Enabled(path) => Some(Box::new(FileSink::open(path, options.lock_timeout)?)),
            FileMode::Disabled => None,
        };

        let console_sink: Option<Box<dyn Sink>> = match config.console {
            ConsoleMode::Disabled => None,
            _ => Some(Box::new(ConsoleSink::stderr(options.lock_timeout))),
        };

        Ok(Self {
            config,
            collapser: StackCollapser::new(options.collapse_marker),
            formatter: Box::new(LineFormatter::new()),
            file_sink,
            console_sink,
            on_error: stderr_error_callback(),
            metrics: AdapterMetrics::new(),
        })
    }

    /// Replace the default [`LineFormatter`]
    #[must_use]
    pub fn with_formatter<F: RecordFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Route side-channel reports somewhere other than stderr
    #[must_use]
    pub fn with_error_callback(mut self, on_error: ErrorCallback) -> Self {
        self.on_error = on_error;
        self
    }

    /// Send console output to `sink` instead of stderr
    ///
    /// Has no effect when the console sink resolved to disabled.
    #[must_use]
    pub fn with_console_sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        if self.console_sink.is_some() {
            self.console_sink = Some(Box::new(sink));
        }
        self
    }

    pub fn config(&self) -> &SinkConfig {
        &self.config
    }

    pub fn metrics(&self) -> &AdapterMetrics {
        &self.metrics
    }

    /// Collapse the stack and write the record to every active sink
    ///
    /// Sinks are independent: a failure on one is reported to the side
    /// channel and the other is still attempted.
    pub fn emit(&self, mut record: LogRecord) {
        let _scope = EmitScope::enter();
        self.metrics.record_emitted();
        record.stack = self.collapser.collapse(&record.stack);

        if let Some(sink) = &self.file_sink {
            if let Err(err) = self.deliver(&**sink, &record, OutputFormat::Json, false) {
                self.metrics.record_file_failure();
                self.report(&err);
            }
        }

        if let (Some(sink), Some((format, color))) =
            (&self.console_sink, self.config.console.render_args())
        {
            if let Err(err) = self.deliver(&**sink, &record, format, color) {
                self.metrics.record_console_failure();
                self.report(&err);
            }
        }
    }

    /// Parse a raw JSON record from a producer and emit it
    ///
    /// A record that fails to parse (including an unknown severity) is
    /// reported to the side channel and returned to the caller.
    pub fn emit_json(&self, raw: &str) -> Result<()> {
        match LogRecord::from_json(raw) {
            Ok(record) => {
                self.emit(record);
                Ok(())
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Render and write with per-sink panic isolation
    fn deliver(
        &self,
        sink: &dyn Sink,
        record: &LogRecord,
        format: OutputFormat,
        color: bool,
    ) -> Result<()> {
        let mut lock_errors = Vec::new();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let line = self.formatter.render(record, format, color)?;
            sink.write_line(&line, &mut lock_errors)
        }));

        // The sink has released its handle by now.
        for err in &lock_errors {
            self.metrics.record_lock_failure();
            self.report(err);
        }

        match outcome {
            Ok(result) => result,
            Err(panic_info) => {
                let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                Err(AdapterError::sink_panicked(sink.name(), message))
            }
        }
    }

    fn report(&self, err: &AdapterError) {
        (self.on_error)(err);
    }
}
