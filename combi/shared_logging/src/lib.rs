#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Structured JSON-lines logging shared by the enumerator and the CLI.
//!
//! Stdout belongs to the combinations themselves, so diagnostics go either to
//! an append-only file or to stderr.

use std::{
    fmt,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Log severity level, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Debug information.
    Debug,
    /// Informational events.
    #[default]
    Info,
    /// Warning indicator.
    Warn,
    /// Error indicator.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => bail!("unknown log level {other:?}"),
        }
    }
}

/// Structured log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Timestamp in ISO8601.
    pub timestamp: DateTime<Utc>,
    /// Module emitting the log.
    pub module: String,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// Arbitrary JSON fields.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl LogRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(module: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            module: module.into(),
            level,
            message: message.into(),
            metadata: Map::new(),
        }
    }

    /// Adds a metadata field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Merges the fields of a JSON object into the metadata. Non-object values
    /// are stored under `data`.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        match metadata {
            Value::Object(map) => self.metadata.extend(map),
            Value::Null => {}
            other => {
                self.metadata.insert("data".into(), other);
            }
        }
        self
    }
}

enum Target {
    File { path: PathBuf, file: File },
    Stderr,
}

impl Target {
    fn write_line(&mut self, record: &LogRecord) -> Result<()> {
        match self {
            Self::File { file, .. } => write_record(file, record),
            Self::Stderr => write_record(&mut io::stderr().lock(), record),
        }
    }
}

fn write_record(writer: &mut impl Write, record: &LogRecord) -> Result<()> {
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Thread-safe JSON-lines logger with a minimum level filter.
pub struct JsonLogger {
    min_level: LogLevel,
    target: Mutex<Target>,
}

impl fmt::Debug for JsonLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLogger")
            .field("min_level", &self.min_level)
            .field("path", &self.path())
            .finish()
    }
}

impl JsonLogger {
    /// Creates or opens an append-only log file, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            min_level: LogLevel::Debug,
            target: Mutex::new(Target::File { path, file }),
        })
    }

    /// Logger writing to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            min_level: LogLevel::Debug,
            target: Mutex::new(Target::Stderr),
        }
    }

    /// Drops records below `level`.
    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Minimum level that will be written.
    #[must_use]
    pub const fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Returns true when a record at `level` would be written.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Writes a log record as a JSON line.
    pub fn log(&self, record: &LogRecord) -> Result<()> {
        if !self.enabled(record.level) {
            return Ok(());
        }
        self.target.lock().write_line(record)
    }

    /// Returns the backing file path, `None` for stderr.
    #[must_use]
    pub fn path(&self) -> Option<PathBuf> {
        match &*self.target.lock() {
            Target::File { path, .. } => Some(path.clone()),
            Target::Stderr => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn writes_json_lines() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::new(dir.path().join("nested/test.log")).unwrap();
        logger
            .log(&LogRecord::new("module", LogLevel::Info, "hello").with_field("n", 4))
            .unwrap();
        let content = fs::read_to_string(logger.path().unwrap()).unwrap();
        assert!(content.contains("\"message\":\"hello\""));
        assert!(content.contains("\"level\":\"INFO\""));
        assert!(content.contains("\"n\":4"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn filters_below_min_level() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::new(dir.path().join("filtered.log"))
            .unwrap()
            .with_min_level(LogLevel::Warn);
        logger
            .log(&LogRecord::new("module", LogLevel::Info, "dropped"))
            .unwrap();
        logger
            .log(&LogRecord::new("module", LogLevel::Error, "kept"))
            .unwrap();
        let content = fs::read_to_string(logger.path().unwrap()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("kept"));
    }

    #[test]
    fn appends_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("append.log");
        for message in ["first", "second"] {
            JsonLogger::new(&path)
                .unwrap()
                .log(&LogRecord::new("module", LogLevel::Info, message))
                .unwrap();
        }
        let content = fs::read_to_string(&path).unwrap();
        let messages: Vec<String> = content
            .lines()
            .map(|line| serde_json::from_str::<LogRecord>(line).unwrap().message)
            .collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn metadata_merges_objects_and_wraps_scalars() {
        let record = LogRecord::new("m", LogLevel::Debug, "x")
            .with_metadata(json!({ "k": 2 }))
            .with_metadata(json!(7));
        assert_eq!(record.metadata["k"], json!(2));
        assert_eq!(record.metadata["data"], json!(7));
    }

    #[test]
    fn parses_levels() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Debug < LogLevel::Error);
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn stderr_logger_has_no_path() {
        let logger = JsonLogger::stderr().with_min_level(LogLevel::Error);
        assert!(logger.path().is_none());
        assert!(!logger.enabled(LogLevel::Info));
    }
}
