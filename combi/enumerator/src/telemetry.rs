use std::{fmt, path::PathBuf, sync::Arc};

use serde_json::Value;
use shared_logging::{JsonLogger, LogLevel, LogRecord};
use uuid::Uuid;

use crate::error::EnumerationError;

/// Builder for enumeration telemetry sinks.
#[derive(Debug)]
pub struct EnumeratorTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    stderr: bool,
    min_level: LogLevel,
}

impl EnumeratorTelemetryBuilder {
    /// Creates the builder.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            stderr: false,
            min_level: LogLevel::Debug,
        }
    }

    /// Writes records to a JSON-lines file.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Writes records to stderr when no log path is set.
    #[must_use]
    pub fn stderr(mut self, enabled: bool) -> Self {
        self.stderr = enabled;
        self
    }

    /// Drops records below `level`.
    #[must_use]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Builds the telemetry handle, opening the log file if one was set.
    pub fn build(self) -> Result<EnumeratorTelemetry, EnumerationError> {
        let logger = match (self.log_path, self.stderr) {
            (Some(path), _) => Some(JsonLogger::new(&path).map_err(|err| {
                EnumerationError::Telemetry(format!("opening {}: {err:#}", path.display()))
            })?),
            (None, true) => Some(JsonLogger::stderr()),
            (None, false) => None,
        };
        Ok(EnumeratorTelemetry::from_parts(
            self.module,
            logger.map(|logger| logger.with_min_level(self.min_level)),
        ))
    }
}

/// Telemetry handle for one enumeration run; every record carries its run id.
#[derive(Clone)]
pub struct EnumeratorTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for EnumeratorTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumeratorTelemetry")
            .field("module", &self.inner.module)
            .field("run_id", &self.inner.run_id)
            .finish_non_exhaustive()
    }
}

struct TelemetryInner {
    module: String,
    run_id: Uuid,
    logger: Option<JsonLogger>,
}

impl EnumeratorTelemetry {
    fn from_parts(module: String, logger: Option<JsonLogger>) -> Self {
        Self {
            inner: Arc::new(TelemetryInner {
                module,
                run_id: Uuid::new_v4(),
                logger,
            }),
        }
    }

    /// Returns a builder.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> EnumeratorTelemetryBuilder {
        EnumeratorTelemetryBuilder::new(module)
    }

    /// Handle that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::from_parts("combi".into(), None)
    }

    /// Returns true when records are written somewhere.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.logger.is_some()
    }

    /// Backing log file, `None` for stderr or a disabled handle.
    #[must_use]
    pub fn log_path(&self) -> Option<PathBuf> {
        self.inner.logger.as_ref().and_then(JsonLogger::path)
    }

    /// Identifier attached to every record of this run.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.inner.run_id
    }

    /// Logs structured metadata.
    pub fn log(
        &self,
        level: LogLevel,
        message: &str,
        metadata: Value,
    ) -> Result<(), EnumerationError> {
        if let Some(logger) = &self.inner.logger {
            let record = LogRecord::new(&self.inner.module, level, message)
                .with_metadata(metadata)
                .with_field("run_id", self.inner.run_id.to_string());
            logger
                .log(&record)
                .map_err(|err| EnumerationError::Telemetry(format!("{err:#}")))?;
        }
        Ok(())
    }
}
