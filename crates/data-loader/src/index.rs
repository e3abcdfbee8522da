//! Catalog loading.
//!
//! Parses both data files in parallel, then assembles and validates the
//! `MovieCatalog`. Any failure here is a startup failure.

use crate::error::Result;
use crate::parser;
use crate::types::*;
use std::path::Path;
use std::time::Instant;
use tracing::info;

impl MovieCatalog {
    /// Load the movie table and the similarity matrix from disk
    pub fn load_from_files(movies_path: &Path, similarity_path: &Path) -> Result<Self> {
        info!(
            movies = %movies_path.display(),
            similarity = %similarity_path.display(),
            "Loading movie catalog"
        );
        let start = Instant::now();

        // The matrix is by far the larger file; parse both at once
        let (movies, similarity) = rayon::join(
            || parser::parse_movies(movies_path),
            || parser::parse_similarity(similarity_path),
        );
        let movies = movies?;
        let similarity = similarity?;

        info!(
            "Parsed {} movies and a {}x{} similarity matrix",
            movies.len(),
            similarity.dim(),
            similarity.dim()
        );

        let catalog = MovieCatalog::new(movies, similarity)?;

        info!("Movie catalog ready in {:.2?}", start.elapsed());
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataLoadError;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir, movies: &str, similarity: &str) -> (std::path::PathBuf, std::path::PathBuf) {
        let movies_path = dir.path().join("movie_dict.json");
        let similarity_path = dir.path().join("similarity.json");
        fs::write(&movies_path, movies).unwrap();
        fs::write(&similarity_path, similarity).unwrap();
        (movies_path, similarity_path)
    }

    #[test]
    fn test_load_catalog() {
        let dir = TempDir::new().unwrap();
        let (movies, similarity) = write_fixture(
            &dir,
            r#"{"movie_id": {"0": 10, "1": 20, "2": 30}, "title": {"0": "A", "1": "B", "2": "C"}}"#,
            "[[1.0, 0.2, 0.7], [0.2, 1.0, 0.1], [0.7, 0.1, 1.0]]",
        );

        let catalog = MovieCatalog::load_from_files(&movies, &similarity).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get_by_title("C").unwrap().id, 30);
        assert_eq!(catalog.similarity().score(0, 2), Some(0.7));
    }

    #[test]
    fn test_dimension_mismatch_fails_fast() {
        let dir = TempDir::new().unwrap();
        let (movies, similarity) = write_fixture(
            &dir,
            r#"[{"movie_id": 1, "title": "A"}, {"movie_id": 2, "title": "B"}, {"movie_id": 3, "title": "C"}]"#,
            "[[1.0, 0.5], [0.5, 1.0]]",
        );

        let err = MovieCatalog::load_from_files(&movies, &similarity).unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::DimensionMismatch {
                movies: 3,
                matrix: 2
            }
        ));
    }

    #[test]
    fn test_missing_similarity_file() {
        let dir = TempDir::new().unwrap();
        let movies = dir.path().join("movie_dict.json");
        fs::write(&movies, r#"[{"movie_id": 1, "title": "A"}]"#).unwrap();

        let err =
            MovieCatalog::load_from_files(&movies, &dir.path().join("similarity.json")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
