//! Error types for region search.
//!
//! # Error taxonomy
//!
//! - **Configuration errors** (`SearchError` variants other than `WorkerPanicked`)
//!   are fatal: they are returned from `SchedulerBuilder::build` (or `Grid::new`)
//!   before any worker starts.
//! - **Logic inconsistencies** (a witness that does not belong to any refined
//!   sub-region) are never errors. They are logged with `tracing::warn!` and the
//!   witness is dropped.
//! - **Empty regions** (no grid points after clamping) are silently discarded.
//! - **Oracle failures** are reported through `OracleError` and handled fail-closed:
//!   the affected point is skipped and never treated as safe.

use thiserror::Error;

/// Errors that abort a search before (or while) workers run.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Two objects that must share a dimensionality do not.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    /// The domain has no dimensions or an inverted / NaN interval.
    #[error("domain is not a valid region")]
    InvalidDomain,
    /// The initial region is invalid after clamping to the domain.
    #[error("initial region is not valid inside the domain")]
    InvalidInitialRegion,
    /// Grid spacing must be finite and nonzero in every dimension.
    #[error("granularity in dimension {dimension} must be finite and nonzero, got {value}")]
    InvalidGranularity { dimension: usize, value: String },
    /// The grid reference point must have finite coordinates.
    #[error("grid reference point must be finite")]
    InvalidReference,
    /// A required strategy was not supplied to the builder.
    #[error("missing required strategy: {0}")]
    MissingStrategy(&'static str),
    /// `search` needs at least one worker.
    #[error("worker count must be positive")]
    InvalidWorkerCount,
    /// A worker thread unwound; the search was stopped.
    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

/// Failure of the external scoring oracle behind a safety predicate.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("oracle failed: {message}")]
pub struct OracleError {
    message: String,
}

impl OracleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
