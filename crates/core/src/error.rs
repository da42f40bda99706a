//! Error types for Viridia

use thiserror::Error;

/// Main error type for Viridia operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error(
        "Band of {rows}x{cols} at replication factor {factor} cannot reach reference grid {ref_rows}x{ref_cols}"
    )]
    ResolutionMismatch {
        rows: usize,
        cols: usize,
        factor: usize,
        ref_rows: usize,
        ref_cols: usize,
    },

    #[error("Unknown band name: {0}")]
    UnknownBand(String),

    #[error("Band {0} not present in aligned stack")]
    MissingBand(String),

    #[error("Unknown scene class name: {0}")]
    UnknownClass(String),

    #[error("Unknown vegetation index: {0}")]
    UnknownIndex(String),

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Viridia operations
pub type Result<T> = std::result::Result<T, Error>;
