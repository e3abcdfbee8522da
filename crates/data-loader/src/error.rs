//! Error types for the data-loader crate.
//!
//! Every variant here means the catalog is unavailable. Callers treat any
//! `DataLoadError` as fatal at startup: nothing downstream can run without
//! the movie table and the similarity matrix.

use thiserror::Error;

/// Errors that can occur while fetching, reading or validating the data files
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or writing a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file exists but its contents could not be deserialized
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// A row of the similarity matrix has the wrong length
    #[error("Similarity matrix is not square: row {row} has {found} columns, expected {expected}")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Matrix dimension doesn't agree with the movie table
    #[error("Similarity matrix has dimension {matrix} but the movie table has {movies} records")]
    DimensionMismatch { movies: usize, matrix: usize },

    /// Downloading a missing data file failed
    #[error("Failed to download {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
