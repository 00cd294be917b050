use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_logging::LogLevel;
use uuid::Uuid;

use crate::{
    config::EnumeratorConfig, enumerate::enumerate, error::EnumerationError,
    sink::CombinationSink, telemetry::EnumeratorTelemetry,
};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Run identifier shared with the log records.
    pub run_id: Uuid,
    /// Upper bound used.
    pub n: u32,
    /// Combination length used.
    pub k: usize,
    /// Combinations handed to the sink.
    pub emitted: u64,
    /// C(n, k), absent when it overflows `u64`.
    pub expected: Option<u64>,
    /// Start of enumeration.
    pub started_at: DateTime<Utc>,
    /// End of enumeration.
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Wall-clock duration of the enumeration.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.finished_at - self.started_at
    }
}

/// Validates `config`, enumerates into `sink` and records the run.
///
/// Run records are best-effort: a log write failure is reported on stderr and
/// never changes the outcome. Only validation and sink errors are returned.
pub fn run<S>(
    config: &EnumeratorConfig,
    sink: &mut S,
    telemetry: &EnumeratorTelemetry,
) -> Result<RunSummary, EnumerationError>
where
    S: CombinationSink + ?Sized,
{
    config.validate()?;
    let expected = config.expected();
    let started_at = Utc::now();
    record(
        telemetry,
        LogLevel::Info,
        "enumeration.started",
        json!({
            "n": config.n,
            "k": config.k,
            "expected": expected,
            "format": config.format,
        }),
    );

    let emitted = match enumerate(config.n, config.k, sink) {
        Ok(emitted) => emitted,
        Err(err) => {
            record(
                telemetry,
                LogLevel::Error,
                "enumeration.failed",
                json!({ "error": err.to_string() }),
            );
            return Err(err);
        }
    };
    let finished_at = Utc::now();

    if let Some(expected) = expected.filter(|expected| *expected != emitted) {
        record(
            telemetry,
            LogLevel::Warn,
            "enumeration.count_mismatch",
            json!({ "expected": expected, "emitted": emitted }),
        );
    }
    record(
        telemetry,
        LogLevel::Info,
        "enumeration.completed",
        json!({
            "emitted": emitted,
            "elapsed_ms": (finished_at - started_at).num_milliseconds(),
        }),
    );

    Ok(RunSummary {
        run_id: telemetry.run_id(),
        n: config.n,
        k: config.k,
        emitted,
        expected,
        started_at,
        finished_at,
    })
}

fn record(telemetry: &EnumeratorTelemetry, level: LogLevel, message: &str, metadata: Value) {
    if let Err(err) = telemetry.log(level, message, metadata) {
        eprintln!("run log write failed ({message}): {err}");
    }
}
