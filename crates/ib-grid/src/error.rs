//! Error types for grid and geometry construction.

use ib_core::IbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Invalid grid: {what}")]
    InvalidGrid { what: String },

    #[error("Invalid geometry: {what}")]
    InvalidGeometry { what: String },

    #[error(transparent)]
    Core(#[from] IbError),
}

pub type GridResult<T> = Result<T, GridError>;
