//! Construction-time options and sink resolution
//!
//! `AdapterOptions` is what the caller asks for; `SinkConfig` is what the
//! adapter actually runs with once the environment checks have been applied.
//! Resolution happens once and the result never changes.

use super::formatter::OutputFormat;
use super::stack::DEFAULT_COLLAPSIBLE_SOURCE;
use serde::{Deserialize, Deserializer};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default bounded wait for a sink lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Suffix of the JSON-lines file when no path is given
pub const LOG_FILE_SUFFIX: &str = ".json.log";

/// Requested console behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleOption {
    /// Pick json, color text or text from the environment
    Auto,
    /// Always JSON
    Json,
    /// Always plain text, never colored
    Text,
}

/// Requested file target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTarget {
    /// `<program name>.json.log` in the working directory
    Default,
    Path(PathBuf),
}

impl FileTarget {
    pub fn path(&self) -> PathBuf {
        match self {
            FileTarget::Default => default_log_path(),
            FileTarget::Path(path) => path.clone(),
        }
    }
}

/// File name derived from the invoking program, e.g. `server.json.log`
pub fn default_log_path() -> PathBuf {
    let stem = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "app".to_string());
    PathBuf::from(format!("{}{}", stem, LOG_FILE_SUFFIX))
}

/// Caller-facing construction options
///
/// Deserializable from a config document where `console` is `true`,
/// `"json"` or `"text"` and `file` is `true` or a path:
///
/// ```
/// use rust_log_adapter::{AdapterOptions, ConsoleOption};
///
/// let options: AdapterOptions =
///     serde_json::from_str(r#"{"console": "json", "lock_timeout_ms": 250}"#).unwrap();
/// assert_eq!(options.console, Some(ConsoleOption::Json));
/// assert!(options.file.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdapterOptions {
    #[serde(deserialize_with = "deserialize_file")]
    pub file: Option<FileTarget>,
    #[serde(deserialize_with = "deserialize_console")]
    pub console: Option<ConsoleOption>,
    #[serde(rename = "lock_timeout_ms", deserialize_with = "deserialize_millis")]
    pub lock_timeout: Duration,
    pub collapse_marker: String,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            file: None,
            console: None,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            collapse_marker: DEFAULT_COLLAPSIBLE_SOURCE.to_string(),
        }
    }
}

impl AdapterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(FileTarget::Path(path.into()));
        self
    }

    /// Log to `<program name>.json.log`
    #[must_use = "builder methods return a new value"]
    pub fn default_file(mut self) -> Self {
        self.file = Some(FileTarget::Default);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn console(mut self, console: ConsoleOption) -> Self {
        self.console = Some(console);
        self
    }

    /// Upper bound on how long a write waits for a sink lock
    #[must_use = "builder methods return a new value"]
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn collapse_marker(mut self, marker: impl Into<String>) -> Self {
        self.collapse_marker = marker.into();
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagOrName {
    Flag(bool),
    Name(String),
}

fn deserialize_console<'de, D>(deserializer: D) -> Result<Option<ConsoleOption>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    match Option::<FlagOrName>::deserialize(deserializer)? {
        None | Some(FlagOrName::Flag(false)) => Ok(None),
        Some(FlagOrName::Flag(true)) => Ok(Some(ConsoleOption::Auto)),
        Some(FlagOrName::Name(name)) => match name.as_str() {
            "json" => Ok(Some(ConsoleOption::Json)),
            "text" => Ok(Some(ConsoleOption::Text)),
            other => Err(D::Error::custom(format!(
                "invalid console mode '{}' (expected true, \"json\" or \"text\")",
                other
            ))),
        },
    }
}

fn deserialize_file<'de, D>(deserializer: D) -> Result<Option<FileTarget>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<FlagOrName>::deserialize(deserializer)? {
        None | Some(FlagOrName::Flag(false)) => None,
        Some(FlagOrName::Flag(true)) => Some(FileTarget::Default),
        Some(FlagOrName::Name(path)) => Some(FileTarget::Path(PathBuf::from(path))),
    })
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

/// Environment checks consulted once at construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Environment {
    pub stderr_is_terminal: bool,
    pub in_container: bool,
}

impl Environment {
    pub fn new(stderr_is_terminal: bool, in_container: bool) -> Self {
        Self {
            stderr_is_terminal,
            in_container,
        }
    }

    /// Probe the running process
    pub fn detect() -> Self {
        Self {
            stderr_is_terminal: std::io::stderr().is_terminal(),
            in_container: detect_container(),
        }
    }
}

fn detect_container() -> bool {
    if std::env::var_os("KUBERNETES_SERVICE_HOST").is_some()
        || std::env::var_os("container").is_some()
    {
        return true;
    }
    if Path::new("/.dockerenv").exists() || Path::new("/run/.containerenv").exists() {
        return true;
    }
    std::fs::read_to_string("/proc/1/cgroup")
        .map(|contents| cgroup_indicates_container(&contents))
        .unwrap_or(false)
}

/// Whether a `/proc/<pid>/cgroup` listing names a container runtime
pub fn cgroup_indicates_container(contents: &str) -> bool {
    const MARKERS: [&str; 5] = ["docker", "kubepods", "containerd", "libpod", "lxc"];
    contents
        .lines()
        .any(|line| MARKERS.iter().any(|marker| line.contains(marker)))
}

/// Resolved console sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMode {
    Disabled,
    Text,
    ColorText,
    Json,
}

impl ConsoleMode {
    /// Format and color flag to render with, or `None` when disabled
    pub fn render_args(&self) -> Option<(OutputFormat, bool)> {
        match self {
            ConsoleMode::Disabled => None,
            ConsoleMode::Text => Some((OutputFormat::Text, false)),
            ConsoleMode::ColorText => Some((OutputFormat::Text, true)),
            ConsoleMode::Json => Some((OutputFormat::Json, false)),
        }
    }
}

/// Resolved file sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileMode {
    Disabled,
    Enabled(PathBuf),
}

/// Sink configuration fixed for the adapter's lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    pub console: ConsoleMode,
    pub file: FileMode,
}

impl SinkConfig {
    /// Apply the environment checks to the requested options
    ///
    /// Explicit `"text"` is never colorized; only the automatic mode consults
    /// the terminal check, and a container always wins over a terminal.
    pub fn resolve(options: &AdapterOptions, env: &Environment) -> Self {
        let requested = match (&options.file, options.console) {
            (None, None) => Some(ConsoleOption::Auto),
            (_, console) => console,
        };

        let console = match requested {
            None => ConsoleMode::Disabled,
            Some(ConsoleOption::Json) => ConsoleMode::Json,
            Some(ConsoleOption::Text) => ConsoleMode::Text,
            Some(ConsoleOption::Auto) if env.in_container => ConsoleMode::Json,
            Some(ConsoleOption::Auto) if env.stderr_is_terminal => ConsoleMode::ColorText,
            Some(ConsoleOption::Auto) => ConsoleMode::Text,
        };

        let file = match &options.file {
            None => FileMode::Disabled,
            Some(target) => FileMode::Enabled(target.path()),
        };

        Self { console, file }
    }
}
