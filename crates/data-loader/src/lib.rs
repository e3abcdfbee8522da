//! # Data Loader Crate
//!
//! This crate loads the movie table and the precomputed similarity matrix
//! into an immutable [`MovieCatalog`].
//!
//! ## Main Components
//!
//! - **types**: Core domain types (MovieRecord, SimilarityMatrix, MovieCatalog)
//! - **parser**: Parse the JSON data files into Rust structs
//! - **index**: Load and validate a catalog from disk
//! - **bootstrap**: Download missing data files on first run
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::MovieCatalog;
//! use std::path::Path;
//!
//! let catalog = MovieCatalog::load_from_files(
//!     Path::new("movie_dict.json"),
//!     Path::new("similarity.json"),
//! )?;
//!
//! let avatar = catalog.get_by_title("Avatar").unwrap();
//! let row = catalog.similarity().row(avatar.index).unwrap();
//! ```

// Public modules
pub mod bootstrap;
pub mod error;
pub mod index;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use bootstrap::{DataSource, ensure_file};
pub use error::{DataLoadError, Result};
pub use types::{MovieCatalog, MovieId, MovieRecord, RowIndex, SimilarityMatrix};
