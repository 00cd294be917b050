#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Lexicographic enumeration of k-combinations of `1..=n`.
//!
//! The core is [`generate`], a depth-first backtracking routine writing into a
//! caller-owned path buffer. Everything else wires it to output sinks,
//! configuration files and structured run logs.

/// Run configuration (n, k, output format, log destination).
pub mod config;
/// Backtracking enumerator and binomial counting.
pub mod enumerate;
/// Library error type.
pub mod error;
/// Run orchestration producing a [`RunSummary`].
pub mod runner;
/// Emission targets for completed combinations.
pub mod sink;
/// Structured logging for enumeration runs.
pub mod telemetry;

pub use config::EnumeratorConfig;
pub use enumerate::{binomial, enumerate, generate};
pub use error::EnumerationError;
pub use runner::{run, RunSummary};
pub use sink::{
    format_combination, CollectingSink, Combination, CombinationSink, OutputFormat, WriterSink,
};
pub use telemetry::{EnumeratorTelemetry, EnumeratorTelemetryBuilder};
