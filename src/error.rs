//! Error taxonomy for the roster engine.
//!
//! Every fallible core operation returns `Result<T, RosterError>`. The
//! variants mirror the failure-mode taxonomy of the engine's MOM-compliance
//! contract: callers branch on the *kind*, not on a message string.

use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RosterError>;

/// Errors the core can surface to a caller. Never silently clamps or
/// continues past one of these — only the best-effort unassigned-slot
/// attribution in the Constraint Model Builder is allowed to degrade
/// instead of propagating.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("headcount must be non-negative (got {headcount}) for requirement {requirement_id}")]
    NegativeHeadcount {
        requirement_id: String,
        headcount: i64,
    },

    #[error(
        "pattern for requirement {requirement_id} is structurally infeasible under MOM rules: {}",
        violations.join("; ")
    )]
    InfeasiblePattern {
        requirement_id: String,
        violations: Vec<String>,
        alternatives: Vec<String>,
    },

    #[error("solver proved the constraint model infeasible ({unassigned_count} slots unattributable)")]
    InfeasibleModel { unassigned_count: usize },

    #[error("solve exceeded the wall-clock limit of {limit_seconds}s with no feasible solution")]
    Timeout { limit_seconds: f64 },

    #[error("incremental window invalid: cutoff={cutoff} solveFrom={solve_from} solveTo={solve_to}")]
    IncrementalWindow {
        cutoff: NaiveDate,
        solve_from: NaiveDate,
        solve_to: NaiveDate,
    },

    #[error("previous output is missing or has no assignments for an incremental solve")]
    MissingPrevious,

    #[error("previous output schema version {found} is incompatible (expected one of {expected:?})")]
    IncompatibleSchemaVersion { found: String, expected: Vec<String> },

    #[error("malformed monthly-hour-limit rule: {reason}")]
    MalformedRule { reason: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl RosterError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        RosterError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        RosterError::Internal(reason.into())
    }
}
