//! Error types for time integration.

use ib_model::ModelError;
use ib_solver::SolverError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors encountered while stepping a flow.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Unknown scheme: {0}")]
    UnknownScheme(String),

    #[error("Timestepper not initialized: {what}")]
    NotInitialized { what: &'static str },

    #[error("History file {path}: {source}")]
    HistoryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("History file {path} is not a valid snapshot: {source}")]
    HistoryCodec {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("History file {path} does not match this run: {what}")]
    IncompatibleHistory { path: PathBuf, what: String },

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type SimResult<T> = Result<T, SimError>;

impl From<ib_core::IbError> for SimError {
    fn from(e: ib_core::IbError) -> Self {
        SimError::InvalidArg {
            what: e.to_string(),
        }
    }
}
