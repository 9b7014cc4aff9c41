//! Error types shared by every stage of the Spider pipeline.
//!
//! Each fatal kind named in the specification's error-handling design is a
//! distinct variant carrying the identifiers a caller needs to act on it
//! (vertex/edge names, rates, repetition values) rather than a single
//! pre-formatted string, so callers can match on structure the way
//! `GraphError::NodeExecution { node, error }` does in the teacher crate this
//! workspace is descended from.

use thiserror::Error;

/// Convenience result type using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Every fatal or recoverable condition the runtime can surface.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The BRV solver found a cycle whose rational firing counts contradict
    /// each other. Fatal to the iteration; parameters are not committed.
    #[error("inconsistent rates on edge {source} -> {sink}: producer({source_rate}) * R({source_rep}) != consumer({sink_rate}) * R({sink_rep})")]
    InconsistentRates {
        source: String,
        sink: String,
        source_rate: i64,
        sink_rate: i64,
        source_rep: u32,
        sink_rep: u32,
    },

    /// A self-loop delay is smaller than the sink rate it must cover.
    #[error("delay on self-loop of '{vertex}' has size {delay_size}, need at least {required}")]
    InsufficientDelay {
        vertex: String,
        delay_size: i64,
        required: i64,
    },

    /// A CONFIG or DELAY vertex ended the BRV solve with repetition != 1.
    #[error("vertex '{vertex}' is {kind} and must have repetition value 1, got {repetition}")]
    InvalidSpecialRepetition {
        vertex: String,
        kind: &'static str,
        repetition: u32,
    },

    /// Expansion needed a parameter value that has not been produced yet.
    #[error("parameter '{parameter}' required by '{context}' is not yet resolved")]
    UnresolvedParameter { parameter: String, context: String },

    /// The mapper found no processing element able to host a task.
    #[error("task '{task}' has no candidate processing element in its mappable set")]
    UnmappableTask { task: String },

    /// A bus-cost computation saturated; the caller should demote the
    /// candidate PE rather than abort (non-fatal).
    #[error("bus cost computation overflowed for transfer of {bytes} bytes")]
    BusOverflow { bytes: u64 },

    /// Two parameters share a name within one graph scope.
    #[error("duplicate parameter '{parameter}' in graph '{graph}'")]
    DuplicateParameter { parameter: String, graph: String },

    /// A kernel reported failure; the owning task is marked SKIPPED and the
    /// error is not itself fatal to the iteration.
    #[error("kernel for task '{task}' reported a runtime error: {message}")]
    KernelRuntimeError { task: String, message: String },

    /// Error surfaced by the expression evaluator contract.
    #[error("expression error: {0}")]
    Expression(String),

    /// Graph structure is invalid independent of parameter resolution
    /// (dangling port reference, duplicate port index, malformed delay).
    #[error("graph validation failed: {0}")]
    Validation(String),

    /// Serialization/deserialization of configuration or messages failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration (startup or per-graph runtime configuration) is
    /// malformed or internally inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Whether this error kind aborts the whole iteration (as opposed to
    /// `KernelRuntimeError`/`BusOverflow`, which admit local recovery).
    pub fn is_fatal_to_iteration(&self) -> bool {
        !matches!(self, Error::KernelRuntimeError { .. } | Error::BusOverflow { .. })
    }
}
