//! Dual sink example
//!
//! Demonstrates writing the same records to a JSON-lines file and to the
//! console, with the console mode picked from the environment.
//!
//! Run with: cargo run --example dual_sink

use rust_log_adapter::hooks::install_panic_hook;
use rust_log_adapter::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Log Adapter - Dual Sink Example ===\n");

    let adapter = Arc::new(LogAdapter::configure(
        AdapterOptions::new()
            .file("dual_sink.json.log")
            .console(ConsoleOption::Auto),
    )?);
    println!("Resolved sinks: {:?}\n", adapter.config());

    install_panic_hook(Arc::clone(&adapter));

    adapter.emit(
        LogRecord::new(Severity::Info, "Application started")
            .with_field("pid", std::process::id()),
    );
    adapter.emit(
        LogRecord::new(Severity::Warning, "disk low")
            .with_frame("main", "check")
            .with_field("free_mb", 512),
    );
    adapter.emit(
        LogRecord::new(Severity::Error, "request failed\ncaused by: connection reset")
            .with_frame("server", "handle")
            .with_frame("futures", "poll")
            .with_frame("futures", "poll")
            .with_frame("client", "send"),
    );

    // Producers that already speak JSON can hand records over as-is.
    adapter.emit_json(
        r#"{"timestamp": 1623247131.0, "severity": "debug",
            "message": "from a producer", "host": "web-1"}"#,
    )?;

    println!("\n=== Example completed successfully! ===");
    println!("Check 'dual_sink.json.log' for the JSON lines");

    Ok(())
}
