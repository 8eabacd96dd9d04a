//! Error types for the application layer.

use crate::config::ValidationError;
use std::path::PathBuf;

/// Application error type wrapping the errors of the library crates.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read run file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Run file is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Run file validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to load {what} from {path}: {message}")]
    StateLoad {
        what: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("Output error ({sink}): {message}")]
    Output { sink: String, message: String },

    #[error("Grid error: {0}")]
    Grid(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ib-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ib_grid::GridError> for AppError {
    fn from(err: ib_grid::GridError) -> Self {
        AppError::Grid(err.to_string())
    }
}

impl From<ib_model::ModelError> for AppError {
    fn from(err: ib_model::ModelError) -> Self {
        AppError::Model(err.to_string())
    }
}

impl From<ib_solver::SolverError> for AppError {
    fn from(err: ib_solver::SolverError) -> Self {
        AppError::Solver(err.to_string())
    }
}

impl From<ib_sim::SimError> for AppError {
    fn from(err: ib_sim::SimError) -> Self {
        AppError::Simulation(err.to_string())
    }
}
