//! Log record structure

use super::error::Result;
use super::field::FieldValue;
use super::severity::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// One call-site in a stack trace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackFrame {
    pub source_component: String,
    pub method: String,
}

impl StackFrame {
    pub fn new(source_component: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            source_component: source_component.into(),
            method: method.into(),
        }
    }

    /// `source_component->method`, as shown in the text layout
    pub fn context(&self) -> String {
        format!("{}->{}", self.source_component, self.method)
    }
}

/// A single incoming log event
///
/// `timestamp` is fractional seconds since the Unix epoch. `stack` runs from
/// the outermost to the innermost call context. Any key the producer attaches
/// beyond the core fields lands in `metadata` and is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: f64,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub stack: Vec<StackFrame>,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, FieldValue>,
}

/// Current wall-clock time as fractional epoch seconds
pub fn now_epoch() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

impl LogRecord {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            timestamp: now_epoch(),
            severity,
            message: message.into(),
            stack: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Override the timestamp (fractional seconds since epoch)
    #[must_use]
    pub fn at(mut self, epoch_seconds: f64) -> Self {
        self.timestamp = epoch_seconds;
        self
    }

    /// Append a frame; frames are added outermost first
    #[must_use]
    pub fn with_frame(
        mut self,
        source_component: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        self.stack.push(StackFrame::new(source_component, method));
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: Vec<StackFrame>) -> Self {
        self.stack = stack;
        self
    }

    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Innermost frame, if any
    pub fn innermost(&self) -> Option<&StackFrame> {
        self.stack.last()
    }

    /// Build a record from a raw JSON document supplied by a producer
    ///
    /// Fails with `UnknownSeverity` when the severity is outside the closed set.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        // Check severity first so a taxonomy mismatch surfaces as its own error
        // rather than a generic deserialization failure.
        if let Some(raw) = value.get("severity").and_then(serde_json::Value::as_str) {
            raw.parse::<Severity>()?;
        }
        Ok(serde_json::from_value(value)?)
    }
}
