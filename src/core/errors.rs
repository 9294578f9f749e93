/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use super::types::Tick;
use miette::Diagnostic;
use thiserror::Error;

/// Workload ingestion errors
///
/// Local to ingestion: a rejected record never invalidates records that were
/// already accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum IngestError {
    #[error("Malformed record on line {line}: {reason}")]
    #[diagnostic(
        code(ingest::malformed_input),
        help("Expected six fields: id arrival burst1 blocks block_duration burst2")
    )]
    MalformedInput { line: usize, reason: String },

    #[error("Duplicate process id '{id}' on line {line}")]
    #[diagnostic(
        code(ingest::duplicate_process),
        help("Process ids must be unique within a workload.")
    )]
    DuplicateProcess { line: usize, id: String },

    #[error("Failed to read workload: {0}")]
    #[diagnostic(code(ingest::io), help("Check that the workload file exists and is readable."))]
    Io(String),

    #[error("Invalid JSON workload: {0}")]
    #[diagnostic(
        code(ingest::json),
        help("A JSON workload is an array of process descriptor objects.")
    )]
    Json(String),
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::Json(err.to_string())
    }
}

/// Simulation engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(sim::invalid_config),
        help("Quantum and core count must both be at least 1.")
    )]
    InvalidConfig(String),

    #[error("Invariant violated at tick {tick}: {context}")]
    #[diagnostic(
        code(sim::invariant_violation),
        help("Shared scheduler state was mutated outside the monitor discipline.")
    )]
    InvariantViolation { tick: Tick, context: String },

    #[error("Actor '{actor}' failed: {reason}")]
    #[diagnostic(code(sim::actor_failed))]
    Actor { actor: String, reason: String },
}

impl SimError {
    /// Shorthand for an invariant violation observed at `tick`
    pub fn invariant(tick: Tick, context: impl Into<String>) -> Self {
        SimError::InvariantViolation {
            tick,
            context: context.into(),
        }
    }

    /// Whether the error signals broken synchronization
    pub fn is_fatal(&self) -> bool {
        matches!(self, SimError::InvariantViolation { .. } | SimError::Actor { .. })
    }
}
