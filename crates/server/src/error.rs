//! Per-request errors of the recommendation service.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecommendError {
    /// The title doesn't exactly match any movie in the catalog
    #[error("Movie not found: {title}")]
    MovieNotFound { title: String },
}

pub type Result<T> = std::result::Result<T, RecommendError>;
