//! Integration tests for the log adapter
//!
//! These tests verify:
//! - Console mode resolution against environment checks
//! - File sink JSON lines and passthrough metadata
//! - Text and color layouts on the console
//! - Independent sink failure handling
//! - Construction-time configuration errors

use parking_lot::Mutex;
use rust_log_adapter::prelude::*;
use rust_log_adapter::sinks::{ConsoleEncoding, ConsoleSink};
use rust_log_adapter::{ConsoleMode, ErrorCallback, FileMode};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const PIPE: Environment = Environment {
    stderr_is_terminal: false,
    in_container: false,
};
const TERMINAL: Environment = Environment {
    stderr_is_terminal: true,
    in_container: false,
};

fn console_capture(dir: &TempDir) -> (ConsoleSink, PathBuf) {
    let path = dir.path().join("console.out");
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .expect("Failed to open console capture");
    let sink = ConsoleSink::from_file(file, Duration::from_secs(1))
        .with_encoding(ConsoleEncoding::Unicode);
    (sink, path)
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("Failed to read output")
        .lines()
        .map(String::from)
        .collect()
}

fn collecting_callback() -> (ErrorCallback, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    let callback: ErrorCallback = Arc::new(move |err| seen_clone.lock().push(err.to_string()));
    (callback, seen)
}

fn disk_low() -> LogRecord {
    LogRecord::new(Severity::Warning, "disk low")
        .at(1623247131.0)
        .with_frame("main", "check")
}

#[test]
fn test_default_resolves_to_plain_text_without_terminal() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (sink, path) = console_capture(&temp_dir);

    let adapter = LogAdapter::configure_with_env(AdapterOptions::new(), PIPE)
        .expect("Failed to configure")
        .with_console_sink(sink);
    assert_eq!(adapter.config().console, ConsoleMode::Text);

    adapter.emit(disk_low());

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "2021-06-09T13:58:51.000 W [main->check] disk low\n");
    assert!(!content.contains('\x1b'));
}

#[test]
fn test_container_resolves_to_json_regardless_of_terminal() {
    for stderr_is_terminal in [false, true] {
        let env = Environment::new(stderr_is_terminal, true);
        let adapter = LogAdapter::configure_with_env(
            AdapterOptions::new().console(ConsoleOption::Auto),
            env,
        )
        .unwrap();
        assert_eq!(adapter.config().console, ConsoleMode::Json);
    }
}

#[test]
fn test_explicit_text_never_colored_on_terminal() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (sink, path) = console_capture(&temp_dir);

    let adapter = LogAdapter::configure_with_env(
        AdapterOptions::new().console(ConsoleOption::Text),
        TERMINAL,
    )
    .unwrap()
    .with_console_sink(sink);

    for severity in Severity::ALL {
        adapter.emit(LogRecord::new(severity, "line one\nline two"));
    }

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains('\x1b'), "unexpected ANSI in {:?}", content);
}

#[test]
fn test_auto_on_terminal_is_colored() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (sink, path) = console_capture(&temp_dir);

    let adapter = LogAdapter::configure_with_env(AdapterOptions::new(), TERMINAL)
        .unwrap()
        .with_console_sink(sink);
    assert_eq!(adapter.config().console, ConsoleMode::ColorText);

    adapter.emit(disk_low());

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("\x1b[34m2021-06-09T13:58:51.000\x1b[0m"));
    assert!(content.contains("\x1b[90m[main->check]\x1b[0m"));
    assert!(content.contains("\x1b[93mW\x1b[0m"));
    assert!(content.contains("\x1b[93mdisk low\x1b[0m"));
}

#[test]
fn test_file_sink_writes_json_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("service.json.log");

    let adapter = LogAdapter::configure_with_env(AdapterOptions::new().file(&log_file), TERMINAL)
        .expect("Failed to configure");
    assert_eq!(adapter.config().console, ConsoleMode::Disabled);
    assert_eq!(adapter.config().file, FileMode::Enabled(log_file.clone()));

    for i in 0..5 {
        adapter.emit(
            LogRecord::new(Severity::Info, format!("Iteration {}", i))
                .with_field("host", "web-1")
                .with_field("pid", 4242),
        );
    }

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 5);
    for (i, line) in lines.iter().enumerate() {
        let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(parsed["message"], format!("Iteration {}", i));
        assert_eq!(parsed["severity"], "info");
        assert_eq!(parsed["host"], "web-1");
        assert_eq!(parsed["pid"], 4242);
    }
}

#[test]
fn test_json_console_round_trips_field_set() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (sink, path) = console_capture(&temp_dir);

    let adapter = LogAdapter::configure_with_env(
        AdapterOptions::new().console(ConsoleOption::Json),
        TERMINAL,
    )
    .unwrap()
    .with_console_sink(sink);

    adapter.emit(disk_low().with_field("host", "web-1").with_field("pid", 7));

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1);
    assert!(!lines[0].contains('\x1b'));

    let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    let mut keys: Vec<&str> = parsed
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["host", "message", "pid", "severity", "stack", "timestamp"]
    );

    let record = LogRecord::from_json(&lines[0]).unwrap();
    assert_eq!(record, disk_low().with_field("host", "web-1").with_field("pid", 7));
}

#[test]
fn test_ascii_escaped_json_console_still_parses() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("console.out");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .expect("Failed to open console capture");
    let sink = ConsoleSink::from_file(file, Duration::from_secs(1))
        .with_encoding(ConsoleEncoding::AsciiEscaped);

    let adapter = LogAdapter::configure_with_env(
        AdapterOptions::new().console(ConsoleOption::Json),
        PIPE,
    )
    .unwrap()
    .with_console_sink(sink);

    adapter.emit(LogRecord::new(Severity::Info, "café 𝄞").with_field("city", "Zürich"));

    let lines = read_lines(&path);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].is_ascii());

    let record = LogRecord::from_json(&lines[0]).unwrap();
    assert_eq!(record.message, "café 𝄞");
    let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(parsed["city"], "Zürich");
}

#[test]
fn test_both_sinks_receive_record() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("both.json.log");
    let (sink, console_path) = console_capture(&temp_dir);

    let adapter = LogAdapter::configure_with_env(
        AdapterOptions::new()
            .file(&log_file)
            .console(ConsoleOption::Auto),
        PIPE,
    )
    .unwrap()
    .with_console_sink(sink);

    adapter.emit(disk_low());

    let file_lines = read_lines(&log_file);
    let console_lines = read_lines(&console_path);
    assert_eq!(file_lines.len(), 1);
    assert!(file_lines[0].starts_with('{'));
    assert_eq!(console_lines, vec!["2021-06-09T13:58:51.000 W [main->check] disk low"]);
}

#[test]
fn test_unopenable_file_fails_construction() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("no").join("such").join("dir.json.log");

    let result = LogAdapter::configure_with_env(AdapterOptions::new().file(&log_file), PIPE);
    match result {
        Err(AdapterError::Configuration { path, .. }) => assert_eq!(path, log_file),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("construction should fail"),
    }
}

#[cfg(target_os = "linux")]
#[test]
fn test_file_failure_does_not_block_console() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let (sink, console_path) = console_capture(&temp_dir);
    let (callback, seen) = collecting_callback();

    // Every write to /dev/full fails with ENOSPC.
    let adapter = LogAdapter::configure_with_env(
        AdapterOptions::new()
            .file("/dev/full")
            .console(ConsoleOption::Text),
        PIPE,
    )
    .unwrap()
    .with_console_sink(sink)
    .with_error_callback(callback);

    adapter.emit(disk_low());

    assert_eq!(read_lines(&console_path).len(), 1);
    assert_eq!(adapter.metrics().file_failures(), 1);
    assert_eq!(adapter.metrics().console_failures(), 0);
    assert!(seen.lock().iter().any(|e| e.contains("file sink")));
}

#[test]
fn test_console_failure_does_not_block_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("survivor.json.log");
    let read_only_path = temp_dir.path().join("readonly.out");
    fs::write(&read_only_path, "").unwrap();
    let read_only = OpenOptions::new().read(true).open(&read_only_path).unwrap();
    let (callback, seen) = collecting_callback();

    let adapter = LogAdapter::configure_with_env(
        AdapterOptions::new()
            .file(&log_file)
            .console(ConsoleOption::Text),
        PIPE,
    )
    .unwrap()
    .with_console_sink(ConsoleSink::from_file(read_only, Duration::from_millis(100)))
    .with_error_callback(callback);

    adapter.emit(disk_low());

    assert_eq!(read_lines(&log_file).len(), 1);
    assert_eq!(adapter.metrics().console_failures(), 1);
    assert_eq!(seen.lock().len(), 1);
}

#[test]
fn test_lock_timeout_still_writes() {
    use fs2::FileExt;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("contended.json.log");
    let (callback, seen) = collecting_callback();

    let adapter = LogAdapter::configure_with_env(
        AdapterOptions::new()
            .file(&log_file)
            .lock_timeout(Duration::from_millis(25)),
        PIPE,
    )
    .unwrap()
    .with_error_callback(callback);

    let holder = OpenOptions::new().append(true).open(&log_file).unwrap();
    holder.lock_exclusive().unwrap();

    adapter.emit(disk_low());
    FileExt::unlock(&holder).unwrap();

    assert_eq!(read_lines(&log_file).len(), 1);
    assert_eq!(adapter.metrics().lock_failures(), 1);
    assert_eq!(adapter.metrics().file_failures(), 0);
    assert!(seen.lock()[0].contains("Timed out"));
}

#[test]
fn test_multiline_message_stays_one_record_in_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("multiline.json.log");

    let adapter =
        LogAdapter::configure_with_env(AdapterOptions::new().file(&log_file), PIPE).unwrap();
    adapter.emit(LogRecord::new(
        Severity::Error,
        "Traceback\n  frame one\nERROR [fake] injected",
    ));

    let lines = read_lines(&log_file);
    assert_eq!(lines.len(), 1, "Record should be a single line");
    let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(parsed["message"], "Traceback\n  frame one\nERROR [fake] injected");
}
