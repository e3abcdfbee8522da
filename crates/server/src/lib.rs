//! Server crate for the movie recommendation engine.
//!
//! This crate contains the recommendation service that pairs the
//! similarity ranking with poster lookups.

pub mod error;
pub mod ranking;
pub mod recommender;

pub use error::RecommendError;
pub use ranking::{Neighbor, rank_row, similar_movies};
pub use recommender::{
    DEFAULT_RECOMMENDATIONS, Recommendation, RecommendationResult, RecommendationService,
};
