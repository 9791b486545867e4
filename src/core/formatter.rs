//! Rendering of records into finished lines
//!
//! Two layouts are supported:
//! - Text: `<timestamp> <severity initial> [<context>] <message>`, optionally
//!   wrapped in ANSI colors
//! - Json: one sorted-key JSON document per line
//!
//! Every rendered line ends with exactly one `\n`, so one write carries one
//! record.

use super::error::{AdapterError, Result};
use super::record::{LogRecord, StackFrame};
use super::severity::Severity;
use super::timestamp;
use colored::Color;
use serde_json::Value;
use std::collections::BTreeMap;

/// Context shown when the record has no stack
pub const EMPTY_STACK_CONTEXT: &str = "main";

const TIMESTAMP_COLOR: Color = Color::Blue;
const CONTEXT_COLOR: Color = Color::BrightBlack;

/// Layout of a rendered line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable single-line layout (default)
    ///
    /// Example: `2021-06-09T13:58:51.000 W [main->check] disk low`
    #[default]
    Text,

    /// JSON document per line
    ///
    /// Example: `{"message":"disk low","severity":"warning","stack":[...],"timestamp":1623247131.0}`
    Json,
}

/// Strategy that turns a record into a finished, newline-terminated line
///
/// The adapter holds one of these per instance; [`LineFormatter`] is the
/// default.
pub trait RecordFormatter: Send + Sync {
    fn render(&self, record: &LogRecord, format: OutputFormat, color: bool) -> Result<String>;
}

/// Default text/color/JSON renderer
#[derive(Debug, Clone, Default)]
pub struct LineFormatter {
    _private: (),
}

impl LineFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    fn render_text(&self, record: &LogRecord, color: bool) -> String {
        let timestamp = timestamp::format_text(record.timestamp);
        let initial = record.severity.initial().to_string();
        let context = format!("[{}]", context_of(record));

        // Continuation lines line up under the first message character.
        let prefix_width =
            timestamp.chars().count() + initial.chars().count() + context.chars().count() + 3;
        let indent = " ".repeat(prefix_width);

        let mut output = if color {
            format!(
                "{} {} {} ",
                paint(&timestamp, TIMESTAMP_COLOR, false, false),
                styled(&initial, record.severity),
                paint(&context, CONTEXT_COLOR, false, false)
            )
        } else {
            format!("{} {} {} ", timestamp, initial, context)
        };

        let mut lines = record.message.lines();
        let first = lines.next().unwrap_or("");
        push_message_line(&mut output, first, record.severity, color);
        for line in lines {
            output.push('\n');
            output.push_str(&indent);
            push_message_line(&mut output, line, record.severity, color);
        }

        output.push('\n');
        output
    }

    fn render_json(&self, record: &LogRecord) -> Result<String> {
        // BTreeMap keeps key order stable regardless of serde_json features.
        let mut document: BTreeMap<String, Value> = record
            .metadata
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json_value()))
            .collect();

        // Core fields take precedence over colliding metadata keys
        document.insert("timestamp".to_string(), timestamp_value(record.timestamp));
        document.insert(
            "severity".to_string(),
            Value::String(record.severity.to_str().to_string()),
        );
        document.insert("message".to_string(), Value::String(record.message.clone()));
        document.insert(
            "stack".to_string(),
            Value::Array(record.stack.iter().map(frame_value).collect()),
        );

        let mut line = serde_json::to_string(&document)
            .map_err(|e| AdapterError::formatter("JSON", e.to_string()))?;
        line.push('\n');
        Ok(line)
    }
}

impl RecordFormatter for LineFormatter {
    fn render(&self, record: &LogRecord, format: OutputFormat, color: bool) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text(record, color)),
            OutputFormat::Json => self.render_json(record),
        }
    }
}

/// `source_component->method` of the innermost frame, or `main`
pub fn context_of(record: &LogRecord) -> String {
    record
        .innermost()
        .map(StackFrame::context)
        .unwrap_or_else(|| EMPTY_STACK_CONTEXT.to_string())
}

/// One ANSI span closed by its own reset
///
/// Built from the color's code directly so `colored`'s process-wide
/// colorize switch is neither consulted nor changed.
fn paint(text: &str, color: Color, bold: bool, dimmed: bool) -> String {
    let mut codes = String::new();
    if bold {
        codes.push_str("1;");
    }
    if dimmed {
        codes.push_str("2;");
    }
    codes.push_str(&color.to_fg_str());
    format!("\x1b[{}m{}\x1b[0m", codes, text)
}

fn styled(text: &str, severity: Severity) -> String {
    let style = severity.style();
    paint(text, style.color, style.bold, style.dimmed)
}

fn push_message_line(output: &mut String, line: &str, severity: Severity, color: bool) {
    if color && !line.is_empty() {
        output.push_str(&styled(line, severity));
    } else {
        output.push_str(line);
    }
}

fn timestamp_value(epoch_seconds: f64) -> Value {
    serde_json::Number::from_f64(epoch_seconds)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(epoch_seconds.to_string()))
}

fn frame_value(frame: &StackFrame) -> Value {
    let mut object = serde_json::Map::new();
    object.insert(
        "source_component".to_string(),
        Value::String(frame.source_component.clone()),
    );
    object.insert("method".to_string(), Value::String(frame.method.clone()));
    Value::Object(object)
}
