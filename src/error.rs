//! Error types for the Payroll Engine.
//!
//! Every fallible operation in this crate reports synchronously through
//! [`PayrollResult`].  Nothing is retried internally: the computations
//! are pure and deterministic, so retrying with the same bad input
//! cannot succeed.  Callers (an API layer, the CLI) are responsible for
//! translating these into user-facing responses.

use thiserror::Error;

/// Errors produced by payroll calculations and configuration loading.
#[derive(Error, Debug)]
pub enum PayrollError {
    /// The caller supplied a value that can never be calculated:
    /// negative pay, a malformed pay period, an inverted date range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The bracket table failed validation (empty, unsorted,
    /// overlapping, gapped, or not anchored at zero income).
    #[error("invalid bracket table: {0}")]
    InvalidBracketTable(String),

    /// The employee directory has no entry for the referenced id.
    /// Raised by the directory collaborator and propagated unchanged.
    #[error("employee not found: {0}")]
    EmployeeNotFound(String),

    /// A policy file could not be read or parsed.
    #[error("policy configuration error: {0}")]
    Policy(#[from] anyhow::Error),
}

/// Result type alias used throughout the crate.
pub type PayrollResult<T> = Result<T, PayrollError>;
