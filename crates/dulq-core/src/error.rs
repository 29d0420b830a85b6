//! Error type shared by every core operation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DulqError {
    #[error("cell ({row}, {col}) is outside a {rows}×{cols} grid")]
    OutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("interpolation needs at least {required} readings, found {found}")]
    InsufficientData { found: usize, required: usize },

    #[error("degenerate sample geometry: {0}")]
    DegenerateGeometry(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid reading {value} at cell ({row}, {col}): readings must be finite and non-negative")]
    InvalidReading { row: usize, col: usize, value: f64 },

    #[error("no readings to summarise")]
    EmptyDataset,

    #[error("mean of all readings is zero; uniformity is undefined")]
    DivisionUndefined,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DulqError>;
