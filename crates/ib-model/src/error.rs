//! Error types for state persistence and model construction.

use ib_core::IbError;
use ib_grid::GridError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot decode error: {0}")]
    Decode(#[from] bincode::Error),

    #[error("Incompatible snapshot: {what}")]
    Incompatible { what: String },

    #[error("Invalid model setup: {what}")]
    InvalidSetup { what: String },

    #[error("Unknown model '{0}' (expected nonlinear, linear, adjoint or linearperiodic)")]
    UnknownModel(String),

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error(transparent)]
    Core(#[from] IbError),
}

pub type ModelResult<T> = Result<T, ModelError>;
