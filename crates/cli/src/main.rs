use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{DataIndex, ItemId, Rating, Score, UserId};
use rand::seq::IndexedRandom;
use server::{BusinessRecommendation, RecommendationService, ServiceConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Tourism Recs - business recommendations for visitors
#[derive(Parser)]
#[command(name = "tourism-recs")]
#[command(about = "Item-based collaborative filtering over a tourism catalog", long_about = None)]
struct Cli {
    /// Path to the JSON seed file (overrides RECS_DATA_PATH)
    #[arg(short, long)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get business recommendations for a user
    Recommend {
        /// User ID to get recommendations for
        #[arg(long)]
        user_id: UserId,

        /// Number of recommendations to return (overrides RECS_DEFAULT_LIMIT)
        #[arg(long)]
        limit: Option<usize>,

        /// Print the recommendations as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the most popular businesses
    Popular {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show a user's profile and rating history
    User {
        #[arg(long)]
        user_id: UserId,
    },

    /// Record a rating and show the updated recommendations.
    /// The rating only lives for this run, the seed file is not rewritten.
    Rate {
        #[arg(long)]
        user_id: UserId,

        #[arg(long)]
        item_id: ItemId,

        /// Score from 1 to 5
        #[arg(long)]
        score: Score,
    },

    /// Print the item similarity matrix
    Similarity,

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
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

    let mut config = ServiceConfig::from_env()?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    println!("Loading catalog from {}...", config.data_path.display());
    let start = Instant::now();
    let data_index = Arc::new(
        DataIndex::load_from_file(&config.data_path).context("Failed to load seed file")?,
    );
    let service = RecommendationService::new(data_index.clone(), data_index.clone(), config);
    println!(
        "{} Loaded catalog and built model in {:?}",
        "✓".green(),
        start.elapsed()
    );

    let default_limit = service.config().default_limit;
    match cli.command {
        Commands::Recommend {
            user_id,
            limit,
            json,
        } => handle_recommend(&service, &user_id, limit.unwrap_or(default_limit), json)?,
        Commands::Popular { limit } => {
            let recommendations = service.recommend_popular(limit.unwrap_or(default_limit));
            print_recommendations("Most Popular", &recommendations);
        }
        Commands::User { user_id } => handle_user(&data_index, &user_id)?,
        Commands::Rate {
            user_id,
            item_id,
            score,
        } => handle_rate(&service, user_id, item_id, score).await?,
        Commands::Similarity => handle_similarity(&service, &data_index),
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(&service, &data_index, requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'recommend' command
fn handle_recommend(
    service: &RecommendationService,
    user_id: &str,
    limit: usize,
    json: bool,
) -> Result<()> {
    let recommendations = service.recommend(user_id, limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    } else {
        print_recommendations(&format!("Recommendations for {}", user_id), &recommendations);
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(data_index: &DataIndex, user_id: &str) -> Result<()> {
    let user = data_index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;
    let mut ratings = data_index.get_user_ratings(user_id);

    println!("{}", format!("User ID: {}", user.id).bold().blue());
    println!("{}Name: {}", "• ".green(), user.name);
    if let Some(email) = &user.email {
        println!("{}Email: {}", "• ".green(), email);
    }

    let avg_score = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().map(|r| f32::from(r.score)).sum::<f32>() / ratings.len() as f32
    };
    println!("{}Number of ratings: {}", "• ".cyan(), ratings.len());
    println!("{}Average score: {:.2}", "• ".cyan(), avg_score);

    ratings.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.item_id.cmp(&b.item_id)));
    println!("Rated businesses:");
    for rating in &ratings {
        match data_index.get_business(&rating.item_id) {
            Some(business) => println!(
                "  - {} [{}] (Score: {})",
                business.name, business.category, rating.score
            ),
            None => println!("  - {} (Score: {})", rating.item_id, rating.score),
        }
    }
    Ok(())
}

/// Handle the 'rate' command
async fn handle_rate(
    service: &RecommendationService,
    user_id: UserId,
    item_id: ItemId,
    score: Score,
) -> Result<()> {
    let generation = service.model_generation();
    service
        .record_rating(Rating::new(user_id.clone(), item_id.clone(), score))
        .await?;
    service.wait_for_rebuilds().await?;

    println!(
        "{} Recorded {} stars from {} for {} (model generation {} -> {})",
        "✓".green(),
        score,
        user_id,
        item_id,
        generation,
        service.model_generation()
    );
    print_recommendations(
        &format!("Updated recommendations for {}", user_id),
        &service.recommend_default(&user_id),
    );
    Ok(())
}

/// Handle the 'similarity' command
fn handle_similarity(service: &RecommendationService, data_index: &DataIndex) {
    let model = service.model_snapshot();
    let Some(matrix) = model.matrix() else {
        println!("{}", "No ratings yet, the similarity model is empty".yellow());
        return;
    };

    let stats = data_index.compute_business_stats();
    println!("{}", "Item Similarity Matrix:".bold().blue());
    for (i, item_id) in matrix.items().iter().enumerate() {
        let name = data_index
            .get_business(item_id)
            .map_or(item_id.as_str(), |business| business.name.as_str());
        match stats.get(item_id) {
            Some(stat) => println!(
                "{:>3}. {} ({} ratings, avg {:.2})",
                i + 1,
                name,
                stat.rating_count,
                stat.avg_score
            ),
            None => println!("{:>3}. {}", i + 1, name),
        }
    }

    print!("     ");
    for i in 0..matrix.len() {
        print!("{:>7}", i + 1);
    }
    println!();
    for (i, a) in matrix.items().iter().enumerate() {
        print!("{:>5}", i + 1);
        for b in matrix.items() {
            let value = matrix.get(a, b).unwrap_or_default();
            let cell = format!("{:>7.3}", value);
            if a != b && value > 0.0 {
                print!("{}", cell.green());
            } else {
                print!("{}", cell);
            }
        }
        println!();
    }
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: &RecommendationService,
    data_index: &DataIndex,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let known_users = data_index.user_ids();
    if known_users.is_empty() {
        return Err(anyhow!("No users in the catalog to benchmark with"));
    }

    let mut rng = rand::rng();
    let user_ids: Vec<UserId> = (0..requests)
        .filter_map(|_| known_users.choose(&mut rng).cloned())
        .collect();

    let semaphore = Arc::new(Semaphore::new(concurrent.max(1)));
    let limit = service.config().default_limit;
    let start = Instant::now();

    let mut handles = vec![];
    for user_id in user_ids {
        let service = service.clone();
        let permit = semaphore.clone().acquire_owned().await?;
        let handle = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            service.recommend(&user_id, limit);
            drop(permit);
            start.elapsed()
        });
        handles.push(handle);
    }

    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        timings.push(handle.await?);
    }
    let total_time = start.elapsed();

    if timings.is_empty() {
        println!("No requests made");
        return Ok(());
    }
    timings.sort();
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendations
fn print_recommendations(title: &str, recommendations: &[BusinessRecommendation]) {
    println!("{}", format!("{}:", title).bold().blue());
    if recommendations.is_empty() {
        println!("  (nothing to recommend)");
        return;
    }

    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "{}. {} [{}] - Score: {:.3} ({:?}, rated {:.1})",
            (i + 1).to_string().green(),
            rec.name,
            rec.category,
            rec.score,
            rec.source,
            rec.ranking
        );
    }
}
