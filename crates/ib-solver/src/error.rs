//! Error types for constraint solves.

use ib_core::IbError;
use thiserror::Error;

/// Errors that can occur while solving the constraint system.
///
/// All of them leave the flow without a valid circulation/force pair.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Solver setup error: {what}")]
    Setup { what: String },

    #[error("Schur complement is not positive definite: {what}")]
    SingularSchur { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Solver used before initialization: {what}")]
    NotInitialized { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error(transparent)]
    Core(#[from] IbError),
}

pub type SolverResult<T> = Result<T, SolverError>;
