use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OneraError {
    #[error("Invalid ONERA file: {0}")]
    Format(String),

    #[error("A file name must be specified")]
    MissingFileName,

    #[error("Cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Short read at row {row}: expected {expected} bytes, got {actual}")]
    ShortRead {
        row: u64,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Region rows {row_offset}+{row_count}, cols {col_offset}+{col_count} exceeds image {width}x{height}"
    )]
    RegionOutOfBounds {
        row_offset: u32,
        col_offset: u32,
        row_count: u32,
        col_count: u32,
        width: u32,
        height: u32,
    },

    #[error("Buffer holds {actual} components, region needs {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Invalid codec state: {0}")]
    InvalidState(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OneraError>;
