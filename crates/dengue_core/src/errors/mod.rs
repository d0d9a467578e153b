use thiserror::Error;

/// Centralized error type for the dengue_core crate
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Nenhum dado agregado disponível: {0}")]
    EmptyAggregate(String),
}

/// Alias for fallible operations in the dengue_core crate
pub type CoreResult<T> = Result<T, CoreError>;
