//! Simple test harness for the recommendation service.
//!
//! Loads the seed file, prints recommendations for every user, records one
//! rating and shows how the recommendations change.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use data_loader::{BusinessCatalog, DataIndex, Rating};
use server::{RecommendationService, ServiceConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,pipeline=debug")),
        )
        .init();

    info!("Starting tourism recommender test harness");

    let config = ServiceConfig::from_env()?;
    info!("Loading data from {}", config.data_path.display());
    let data_index = Arc::new(
        DataIndex::load_from_file(&config.data_path)
            .with_context(|| format!("Failed to load {}", config.data_path.display()))?,
    );

    let service = RecommendationService::new(data_index.clone(), data_index.clone(), config);
    info!(
        "Similarity model covers {} businesses",
        service.model_snapshot().item_count()
    );

    for user_id in data_index.user_ids() {
        let recommendations = service.recommend_default(&user_id);
        info!("Recommendations for user {}:", user_id);
        for (i, rec) in recommendations.iter().enumerate() {
            info!(
                "{}. {} [{}] - Score: {:.3} ({:?})",
                i + 1,
                rec.name,
                rec.category,
                rec.score,
                rec.source
            );
        }
    }

    // Rate the least popular business and watch the model change
    let Some(user_id) = data_index.user_ids().into_iter().next() else {
        info!("No users in the seed file, nothing more to show");
        return Ok(());
    };
    let Some(item_id) = data_index.top_by_popularity(usize::MAX).pop() else {
        info!("No businesses in the seed file, nothing more to show");
        return Ok(());
    };

    info!("Recording a 5 star rating from {} for {}", user_id, item_id);
    service.record_rating(Rating::new(user_id.clone(), item_id, 5)).await?;
    service.wait_for_rebuilds().await?;

    for rec in service.recommend_default(&user_id) {
        info!("   {} - Score: {:.3} ({:?})", rec.name, rec.score, rec.source);
    }
    info!("Model generation is now {}", service.model_generation());

    Ok(())
}
