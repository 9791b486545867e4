//! Severity definitions and the per-severity color table

use super::error::AdapterError;
use colored::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of severities the adapter recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
    Critical,
}

/// ANSI styling for one severity entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityStyle {
    pub color: Color,
    pub bold: bool,
    pub dimmed: bool,
}

impl Severity {
    pub const ALL: [Severity; 7] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
        Severity::Critical,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::Critical => "critical",
        }
    }

    /// Single uppercase letter used in the text layout
    pub fn initial(&self) -> char {
        match self {
            Severity::Trace => 'T',
            Severity::Debug => 'D',
            Severity::Info => 'I',
            Severity::Warning => 'W',
            Severity::Error => 'E',
            Severity::Fatal => 'F',
            Severity::Critical => 'C',
        }
    }

    pub fn style(&self) -> SeverityStyle {
        use colored::Color::*;
        let (color, bold, dimmed) = match self {
            Severity::Trace => (BrightBlack, false, true),
            Severity::Debug => (White, false, true),
            Severity::Info => (Green, false, false),
            Severity::Warning => (BrightYellow, false, false),
            Severity::Error | Severity::Fatal | Severity::Critical => (Red, true, false),
        };
        SeverityStyle {
            color,
            bold,
            dimmed,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Severity {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, AdapterError> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            "critical" => Ok(Severity::Critical),
            _ => Err(AdapterError::unknown_severity(s)),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = AdapterError;

    fn try_from(value: String) -> Result<Self, AdapterError> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials_are_unique_uppercase() {
        let initials: Vec<char> = Severity::ALL.iter().map(Severity::initial).collect();
        let mut deduped = initials.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), initials.len());
        assert!(initials.iter().all(char::is_ascii_uppercase));
    }

    #[test]
    fn test_parse_accepts_aliases_and_case() {
        assert_eq!("WARN".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("Critical".parse::<Severity>().unwrap(), Severity::Critical);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "notice".parse::<Severity>().unwrap_err();
        assert!(matches!(err, AdapterError::UnknownSeverity(ref s) if s == "notice"));
    }

    #[test]
    fn test_try_from_string() {
        assert_eq!(Severity::try_from("Fatal".to_string()).unwrap(), Severity::Fatal);
        let err = Severity::try_from("verbose".to_string()).unwrap_err();
        assert!(matches!(err, AdapterError::UnknownSeverity(ref s) if s == "verbose"));
    }

    #[test]
    fn test_color_table() {
        assert_eq!(Severity::Info.style().color, Color::Green);
        assert_eq!(Severity::Warning.style().color, Color::BrightYellow);
        for severity in [Severity::Error, Severity::Fatal, Severity::Critical] {
            let style = severity.style();
            assert_eq!(style.color, Color::Red);
            assert!(style.bold);
        }
        assert!(Severity::Trace.style().dimmed);
        assert!(Severity::Debug.style().dimmed);
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
        let parsed: Severity = serde_json::from_str("\"fatal\"").unwrap();
        assert_eq!(parsed, Severity::Fatal);
        assert!(serde_json::from_str::<Severity>("\"verbose\"").is_err());
    }
}
