use imdg_models::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error(transparent)]
    InvalidName(#[from] ModelError),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid database value: {0}")]
    InvalidDbValue(String),

    #[error("Store task failed: {0}")]
    Task(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
