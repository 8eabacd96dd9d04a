use thiserror::Error;

pub type IbResult<T> = Result<T, IbError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IbError {
    #[error("{what} must be finite, got {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("{what} must be positive, got {value}")]
    NotPositive { what: &'static str, value: f64 },
}
