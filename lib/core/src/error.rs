use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Startup failed: {0}")]
    Startup(String),

    #[error("Failed to encode query: {0}")]
    Encoding(String),

    #[error("Index position {position} has no record (row store holds {rows} rows)")]
    Alignment { position: usize, rows: usize },

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse error classes reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Startup,
    Encoding,
    Alignment,
    Generation,
    InvalidInput,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Startup(_) | Error::Io(_) | Error::Serialization(_) => ErrorKind::Startup,
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::Alignment { .. } => ErrorKind::Alignment,
            Error::Generation(_) => ErrorKind::Generation,
            Error::InvalidDimension { .. } | Error::InvalidConfig(_) => ErrorKind::InvalidInput,
        }
    }
}
