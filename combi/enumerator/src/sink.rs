use std::{
    fmt,
    io::{self, Write},
    str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::EnumerationError;

/// Receives every completed combination, in emission order.
pub trait CombinationSink {
    /// Handles one combination. An error aborts the enumeration.
    fn emit(&mut self, combination: &[u32]) -> Result<(), EnumerationError>;
}

impl<F> CombinationSink for F
where
    F: FnMut(&[u32]) -> Result<(), EnumerationError>,
{
    fn emit(&mut self, combination: &[u32]) -> Result<(), EnumerationError> {
        self(combination)
    }
}

/// Display adapter rendering a combination as `[a, b, c]`.
#[derive(Debug, Clone, Copy)]
pub struct Combination<'a>(pub &'a [u32]);

impl fmt::Display for Combination<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, value) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

/// Formats a combination as `[a, b, c]`; the empty combination is `[]`.
#[must_use]
pub fn format_combination(combination: &[u32]) -> String {
    Combination(combination).to_string()
}

/// Line format used by [`WriterSink`]. Parsed case-insensitively, both from
/// the command line and from config files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `[1, 2, 3]`
    #[default]
    Text,
    /// `[1,2,3]`, one JSON array per line.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = EnumerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(EnumerationError::InvalidArgument(format!(
                "unknown output format {other:?} (expected text or json)"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for OutputFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Writes one line per combination to any [`Write`] target.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> WriterSink<W> {
    /// Wraps a writer.
    pub const fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> Result<(), EnumerationError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Returns the underlying writer without flushing it.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CombinationSink for WriterSink<W> {
    fn emit(&mut self, combination: &[u32]) -> Result<(), EnumerationError> {
        match self.format {
            OutputFormat::Text => writeln!(self.writer, "{}", Combination(combination))?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.writer, combination).map_err(io::Error::from)?;
                self.writer.write_all(b"\n")?;
            }
        }
        Ok(())
    }
}

/// Keeps every emitted combination in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectingSink {
    combinations: Vec<Vec<u32>>,
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            combinations: Vec::new(),
        }
    }

    /// Combinations collected so far.
    #[must_use]
    pub fn combinations(&self) -> &[Vec<u32>] {
        &self.combinations
    }

    /// Consumes the sink.
    #[must_use]
    pub fn into_inner(self) -> Vec<Vec<u32>> {
        self.combinations
    }
}

impl CombinationSink for CollectingSink {
    fn emit(&mut self, combination: &[u32]) -> Result<(), EnumerationError> {
        self.combinations.push(combination.to_vec());
        Ok(())
    }
}
