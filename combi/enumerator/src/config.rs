use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    enumerate::{binomial, validate_upper_bound},
    error::EnumerationError,
    sink::OutputFormat,
};

/// Upper bound used when nothing else is configured.
pub const DEFAULT_N: u32 = 4;
/// Combination length used when nothing else is configured.
pub const DEFAULT_K: usize = 2;

/// Parameters for one enumeration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnumeratorConfig {
    /// Inclusive upper bound of the value range `1..=n`.
    pub n: u32,
    /// Number of elements per combination.
    pub k: usize,
    /// Output line format.
    pub format: OutputFormat,
    /// Optional JSON-lines run log.
    pub log_path: Option<PathBuf>,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            n: DEFAULT_N,
            k: DEFAULT_K,
            format: OutputFormat::Text,
            log_path: None,
        }
    }
}

impl EnumeratorConfig {
    /// Loads configuration from a TOML file. Missing keys keep their defaults
    /// and a relative `log_path` is resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EnumerationError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| {
            EnumerationError::Config(format!("reading {}: {err}", path.display()))
        })?;
        let mut config: Self = toml::from_str(&raw).map_err(|err| {
            EnumerationError::Config(format!("parsing {}: {err}", path.display()))
        })?;
        let source_dir = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        if let Some(log_path) = config.log_path.as_mut() {
            if log_path.is_relative() {
                *log_path = source_dir.join(&*log_path);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks the parameters accepted by [`crate::enumerate`].
    pub fn validate(&self) -> Result<(), EnumerationError> {
        validate_upper_bound(self.n)
    }

    /// Expected number of combinations, `None` if it overflows `u64`.
    #[must_use]
    pub fn expected(&self) -> Option<u64> {
        binomial(self.n, self.k)
    }

    /// Overrides `n`.
    #[must_use]
    pub fn with_n(mut self, n: u32) -> Self {
        self.n = n;
        self
    }

    /// Overrides `k`.
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Overrides the output format.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Overrides the run log path.
    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }
}
