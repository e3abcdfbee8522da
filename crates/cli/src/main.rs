use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DataSource, MovieCatalog, ensure_file};
use poster_client::{PosterConfig, PosterFetcher, config::DEFAULT_API_BASE_URL};
use server::{DEFAULT_RECOMMENDATIONS, RecommendationResult, RecommendationService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Movie Recs - content-based movie recommendations
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(about = "Find movies similar to a movie you like", long_about = None)]
struct Cli {
    /// Path to the movie table (JSON)
    #[arg(long, env = "MOVIES_PATH", default_value = "movie_dict.json")]
    movies: PathBuf,

    /// Path to the similarity matrix (JSON)
    #[arg(long, env = "SIMILARITY_PATH", default_value = "similarity.json")]
    similarity: PathBuf,

    /// Where to download the movie table from if it's missing
    #[arg(long, env = "MOVIES_URL")]
    movies_url: Option<String>,

    /// Where to download the similarity matrix from if it's missing
    #[arg(long, env = "SIMILARITY_URL")]
    similarity_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend movies similar to a title
    Recommend {
        /// Exact movie title
        #[arg(long)]
        title: String,

        /// Metadata API key used for poster lookups
        #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Metadata API movie endpoint
        #[arg(long, env = "TMDB_API_BASE_URL", default_value = DEFAULT_API_BASE_URL)]
        api_base_url: String,
    },

    /// List every title in the catalog
    Titles {
        /// Only print the first N titles
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Search for titles (case-insensitive substring match)
    Search {
        /// Text to look for in titles
        #[arg(long)]
        title: String,
    },

    /// Time the similarity ranking for random titles
    Benchmark {
        /// Number of lookups to make
        #[arg(long, default_value = "1000")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let catalog = Arc::new(load_catalog(&cli).await?);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Recommend {
            title,
            api_key,
            api_base_url,
        } => handle_recommend(catalog, &title, api_key, api_base_url).await?,
        Commands::Titles { limit } => handle_titles(&catalog, limit),
        Commands::Search { title } => handle_search(&catalog, &title),
        Commands::Benchmark { requests } => handle_benchmark(&catalog, requests)?,
    }

    Ok(())
}

/// Fetch missing data files, then load the catalog. Any failure halts startup.
async fn load_catalog(cli: &Cli) -> Result<MovieCatalog> {
    let client = reqwest::Client::new();
    let sources = [
        DataSource::new(&cli.movies, cli.movies_url.clone()),
        DataSource::new(&cli.similarity, cli.similarity_url.clone()),
    ];
    for source in &sources {
        if ensure_file(&client, source)
            .await
            .with_context(|| format!("Data file {} is unavailable", source.path.display()))?
        {
            info!("Downloaded {}", source.path.display());
        }
    }

    info!("Loading movie catalog...");
    let start = Instant::now();
    let movies = cli.movies.clone();
    let similarity = cli.similarity.clone();

    // Parsing a large matrix is CPU-bound; keep it off the async workers
    let catalog = tokio::task::spawn_blocking(move || {
        MovieCatalog::load_from_files(&movies, &similarity)
    })
    .await
    .context("Catalog loading task panicked")?
    .context("Failed to load movie catalog")?;

    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        catalog.len(),
        start.elapsed()
    );
    Ok(catalog)
}

/// Handle the 'recommend' command
async fn handle_recommend(
    catalog: Arc<MovieCatalog>,
    title: &str,
    api_key: String,
    api_base_url: String,
) -> Result<()> {
    let config = PosterConfig::new(api_key).with_api_base_url(api_base_url);
    let fetcher = PosterFetcher::from_config(&config).context("Failed to build HTTP client")?;
    let service = RecommendationService::new(catalog, fetcher);

    match service.recommend(title).await {
        Ok(result) => {
            print_recommendations(&result);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            let suggestions = service.search_titles(title);
            if !suggestions.is_empty() {
                eprintln!("Did you mean:");
                for movie in suggestions.iter().take(5) {
                    eprintln!("  - {}", movie.title);
                }
            }
            Err(anyhow!("Could not fetch recommendations for '{}'", title))
        }
    }
}

/// Handle the 'titles' command
fn handle_titles(catalog: &MovieCatalog, limit: Option<usize>) {
    let limit = limit.unwrap_or(usize::MAX);
    for title in catalog.titles().take(limit) {
        println!("{}", title);
    }
}

/// Handle the 'search' command
fn handle_search(catalog: &MovieCatalog, query: &str) {
    let matches = catalog.search_titles(query);

    println!("{}", format!("Search results for '{}':", query).bold().blue());
    for movie in matches.iter().take(20) {
        println!("{}: {}", movie.id, movie.title);
    }
    if matches.len() > 20 {
        println!("... and {} more", matches.len() - 20);
    }
}

/// Handle the 'benchmark' command
fn handle_benchmark(catalog: &MovieCatalog, requests: usize) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("--requests must be at least 1"));
    }

    // Pick random titles from the catalog
    let titles: Vec<&str> = (0..requests)
        .map(|_| {
            let index = rand::random::<u32>() as usize % catalog.len();
            catalog.movies()[index].title.as_str()
        })
        .collect();

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    for title in titles {
        let start = Instant::now();
        server::similar_movies(catalog, title, DEFAULT_RECOMMENDATIONS)?;
        timings.push(start.elapsed());
    }

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let percentile = |p: f32| timings[((timings.len() as f32 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("Benchmark results:");
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} lookups/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(result: &RecommendationResult) {
    println!(
        "{}",
        format!("Movies similar to '{}':", result.query).bold().blue()
    );
    for (i, rec) in result.items.iter().enumerate() {
        println!(
            "{}. {} - Score: {:.3}",
            (i + 1).to_string().green(),
            rec.title,
            rec.score
        );
        println!("   Poster: {}", rec.poster_url);
    }
}
