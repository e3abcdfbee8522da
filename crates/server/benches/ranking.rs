//! Benchmarks for similarity ranking
//!
//! Run with: cargo bench --package server
//!
//! Uses a synthetic catalog about the size of the TMDB 5000 dataset.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use data_loader::{MovieCatalog, MovieRecord, SimilarityMatrix};
use server::similar_movies;

const MOVIES: usize = 4800;

fn build_catalog() -> MovieCatalog {
    // Cheap deterministic pseudo-scores, symmetric with 1.0 on the diagonal
    let score = |i: usize, j: usize| {
        if i == j {
            1.0
        } else {
            let x = (i * 31 + j * 31 + (i ^ j) * 17) % 1000;
            x as f32 / 1000.0
        }
    };

    let rows = (0..MOVIES)
        .map(|i| (0..MOVIES).map(|j| score(i, j)).collect())
        .collect();
    let movies = (0..MOVIES)
        .map(|i| MovieRecord::new(i as u32, format!("Movie {}", i), i))
        .collect();

    MovieCatalog::new(movies, SimilarityMatrix::from_rows(rows).expect("square matrix"))
        .expect("valid catalog")
}

fn bench_similar_movies(c: &mut Criterion) {
    let catalog = build_catalog();

    c.bench_function("similar_movies_top5", |b| {
        b.iter(|| {
            let neighbors = similar_movies(&catalog, black_box("Movie 1234"), 5);
            black_box(neighbors)
        })
    });
}

criterion_group!(benches, bench_similar_movies);
criterion_main!(benches);
