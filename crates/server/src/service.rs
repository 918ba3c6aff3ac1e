//! # Recommendation Service
//!
//! Ties the pieces together for callers:
//! 1. Build the similarity model from the rating store at startup
//! 2. Answer recommendation requests against the current model snapshot
//! 3. Enrich recommended ids with business metadata
//! 4. Record new ratings and rebuild the model (inline or on a blocking worker)

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use data_loader::{BusinessCatalog, ItemId, Rating, RatingStore};
use pipeline::{Recommendation, RecommendationGenerator, RecommendationSource};
use similarity::{SimilarityModel, SimilarityModelBuilder};

use crate::config::{RebuildMode, ServiceConfig};
use crate::state::SharedModel;

/// A recommendation as handed to clients: the business plus why it was picked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessRecommendation {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    /// The business's aggregate average rating
    pub ranking: f32,
    pub image_url: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub score: f64,
    pub source: RecommendationSource,
}

#[derive(Clone)]
pub struct RecommendationService {
    ratings: Arc<dyn RatingStore>,
    catalog: Arc<dyn BusinessCatalog>,
    builder: SimilarityModelBuilder,
    generator: RecommendationGenerator,
    model: SharedModel,
    config: ServiceConfig,
    /// Background rebuilds not yet awaited
    pending_rebuilds: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl RecommendationService {
    /// Create the service and publish the startup model.
    ///
    /// The initial build runs inline, so the first request already sees a
    /// model built from every stored rating.
    pub fn new(
        ratings: Arc<dyn RatingStore>,
        catalog: Arc<dyn BusinessCatalog>,
        config: ServiceConfig,
    ) -> Self {
        let service = Self {
            builder: SimilarityModelBuilder::new(ratings.clone()),
            generator: RecommendationGenerator::new(ratings.clone(), catalog.clone()),
            ratings,
            catalog,
            model: SharedModel::new(),
            config,
            pending_rebuilds: Arc::new(Mutex::new(Vec::new())),
        };
        service.rebuild_similarity_model();
        service
    }

    /// Replace the generator (custom filters, other stores)
    pub fn with_generator(mut self, generator: RecommendationGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Rebuild the model from every stored rating and publish it.
    ///
    /// Returns the model this rebuild produced. If a newer rebuild already
    /// published by the time this one finishes, the result is discarded and
    /// the newer model stays in place.
    pub fn rebuild_similarity_model(&self) -> Arc<SimilarityModel> {
        let generation = self.model.reserve_generation();
        let (model, _) = self.builder.build();
        let model = Arc::new(model);

        if self.model.publish(generation, model.clone()) {
            info!(generation, items = model.item_count(), "Published similarity model");
        } else {
            debug!(generation, "Discarded stale similarity model");
        }
        model
    }

    /// Up to `limit` businesses for `user_id`, best first
    #[instrument(skip(self))]
    pub fn recommend(&self, user_id: &str, limit: usize) -> Vec<BusinessRecommendation> {
        let start_time = Instant::now();

        let model = self.model.snapshot();
        let recommendations = self.generator.recommend(user_id, &model, limit);
        let mut enriched = self.enrich(recommendations);

        if enriched.is_empty() && limit > 0 {
            warn!("No recommendation could be resolved to a business, using popularity ranking");
            enriched = self.recommend_popular(limit);
        }

        info!(
            "Generated {} recommendations in {:.2?}",
            enriched.len(),
            start_time.elapsed()
        );
        enriched
    }

    /// Recommendations with the configured default limit
    pub fn recommend_default(&self, user_id: &str) -> Vec<BusinessRecommendation> {
        self.recommend(user_id, self.config.default_limit)
    }

    /// The most popular businesses, for anonymous visitors
    pub fn recommend_popular(&self, limit: usize) -> Vec<BusinessRecommendation> {
        self.enrich(self.generator.popularity_fallback(limit))
    }

    /// Store a rating, then rebuild according to the configured mode.
    ///
    /// In synchronous mode this only returns once the new model is published.
    /// In background mode it returns after the upsert; the rebuild finishes
    /// later (see [`wait_for_rebuilds`](Self::wait_for_rebuilds)).
    #[instrument(skip(self), fields(user_id = %rating.user_id, item_id = %rating.item_id))]
    pub async fn record_rating(&self, rating: Rating) -> Result<()> {
        self.ratings
            .upsert_rating(rating)
            .context("Failed to record rating")?;

        let rebuild = self.spawn_rebuild();
        match self.config.rebuild_mode {
            RebuildMode::Synchronous => {
                rebuild.await.context("Similarity rebuild task failed")?;
            }
            RebuildMode::Background => {
                let finished = {
                    let mut pending = self.lock_pending();
                    let (finished, running): (Vec<_>, Vec<_>) =
                        pending.drain(..).partition(|handle| handle.is_finished());
                    *pending = running;
                    pending.push(rebuild);
                    debug!("{} background rebuilds outstanding", pending.len());
                    finished
                };
                reap_rebuilds(finished).await;
            }
        }
        Ok(())
    }

    /// Wait until every background rebuild started so far has finished
    pub async fn wait_for_rebuilds(&self) -> Result<()> {
        let handles: Vec<JoinHandle<()>> = self.lock_pending().drain(..).collect();
        for handle in handles {
            handle.await.context("Similarity rebuild task failed")?;
        }
        Ok(())
    }

    /// The model currently published
    pub fn model_snapshot(&self) -> Arc<SimilarityModel> {
        self.model.snapshot()
    }

    /// Generation of the model currently published (0 before the first build)
    pub fn model_generation(&self) -> u64 {
        self.model.generation()
    }

    // The build is CPU-bound, keep it off the async workers
    fn spawn_rebuild(&self) -> JoinHandle<()> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || {
            service.rebuild_similarity_model();
        })
    }

    fn enrich(&self, recommendations: Vec<Recommendation>) -> Vec<BusinessRecommendation> {
        recommendations
            .into_iter()
            .filter_map(|recommendation| {
                let Some(business) = self.catalog.get_business(&recommendation.item_id) else {
                    warn!(item_id = %recommendation.item_id, "Dropping recommendation for unknown business");
                    return None;
                };
                Some(BusinessRecommendation {
                    image_url: business.image_url_or_placeholder().to_string(),
                    lat: business.coordinates.as_ref().map(|c| c.lat),
                    lng: business.coordinates.as_ref().map(|c| c.lon),
                    id: business.id,
                    name: business.name,
                    category: business.category,
                    ranking: business.average_rating,
                    score: recommendation.score,
                    source: recommendation.source,
                })
            })
            .collect()
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending_rebuilds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Collect finished rebuild handles, logging any that panicked or were
/// cancelled. Returns the number of failed rebuilds.
async fn reap_rebuilds(handles: Vec<JoinHandle<()>>) -> usize {
    let mut failed = 0;
    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "Background similarity rebuild failed");
            failed += 1;
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Business, Coordinates, DataIndex, User};

    fn business(id: &str, average_rating: f32) -> Business {
        Business {
            id: id.to_string(),
            name: format!("Business {}", id),
            category: "Restaurantes".to_string(),
            description: String::new(),
            average_rating,
            image_url: None,
            coordinates: None,
            phone: None,
            email: None,
            opening_hours: Default::default(),
        }
    }

    fn create_test_index() -> Arc<DataIndex> {
        let mut index = DataIndex::new();
        index.insert_business(Business {
            image_url: Some("https://img.example/a.jpg".to_string()),
            coordinates: Some(Coordinates {
                lat: 19.4326,
                lon: -99.1332,
            }),
            ..business("A", 3.0)
        });
        index.insert_business(business("B", 3.5));
        index.insert_business(business("C", 2.5));
        index.insert_business(business("X", 4.9));
        index.insert_business(business("Y", 4.8));

        for id in ["U1", "U2", "U3"] {
            index.insert_user(User {
                id: id.to_string(),
                name: id.to_string(),
                email: None,
            });
        }
        index.insert_rating(Rating::new("U1", "A", 5));
        index.insert_rating(Rating::new("U1", "B", 4));
        index.insert_rating(Rating::new("U2", "B", 5));
        index.insert_rating(Rating::new("U2", "C", 4));
        Arc::new(index)
    }

    fn service_with(mode: RebuildMode) -> (Arc<DataIndex>, RecommendationService) {
        let index = create_test_index();
        let config = ServiceConfig::default().with_rebuild_mode(mode);
        let service = RecommendationService::new(index.clone(), index.clone(), config);
        (index, service)
    }

    fn ids(recommendations: &[BusinessRecommendation]) -> Vec<&str> {
        recommendations.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_startup_build_is_published() {
        let (_, service) = service_with(RebuildMode::Synchronous);

        assert_eq!(service.model_generation(), 1);
        assert_eq!(service.model_snapshot().item_count(), 3);
    }

    #[test]
    fn test_recommend_enriches_businesses() {
        let (_, service) = service_with(RebuildMode::Synchronous);

        let recommendations = service.recommend("U2", 5);
        assert_eq!(ids(&recommendations), ["A"]);

        let first = &recommendations[0];
        assert_eq!(first.name, "Business A");
        assert_eq!(first.ranking, 3.0);
        assert_eq!(first.image_url, "https://img.example/a.jpg");
        assert_eq!(first.lat, Some(19.4326));
        assert_eq!(first.lng, Some(-99.1332));
        assert_eq!(first.source, RecommendationSource::Collaborative);
    }

    #[test]
    fn test_popular_uses_placeholder_image() {
        let (_, service) = service_with(RebuildMode::Synchronous);

        let popular = service.recommend_popular(2);
        assert_eq!(ids(&popular), ["X", "Y"]);
        assert_eq!(popular[0].image_url, data_loader::PLACEHOLDER_IMAGE_URL);
        assert_eq!(popular[0].lat, None);
        assert!(popular.iter().all(|r| r.source == RecommendationSource::Popularity));
    }

    #[test]
    fn test_user_without_ratings_gets_popular() {
        let (_, service) = service_with(RebuildMode::Synchronous);

        assert_eq!(ids(&service.recommend("U3", 2)), ["X", "Y"]);
        assert_eq!(ids(&service.recommend_default("U3")).len(), 5);
    }

    #[tokio::test]
    async fn test_synchronous_rating_is_visible_immediately() {
        let (_, service) = service_with(RebuildMode::Synchronous);
        let before = service.model_generation();

        service.record_rating(Rating::new("U3", "X", 5)).await.unwrap();

        assert_eq!(service.model_generation(), before + 1);
        assert!(service.model_snapshot().similarity("X", "X").is_some());
    }

    #[tokio::test]
    async fn test_background_rating_is_visible_after_wait() {
        let (index, service) = service_with(RebuildMode::Background);

        service.record_rating(Rating::new("U3", "X", 5)).await.unwrap();
        // The rating itself is stored before record_rating returns
        assert_eq!(index.fetch_ratings_for_user("U3").len(), 1);

        service.wait_for_rebuilds().await.unwrap();
        assert_eq!(service.model_generation(), 2);
        assert!(service.model_snapshot().similarity("X", "X").is_some());
    }

    #[tokio::test]
    async fn test_overlapping_background_rebuilds_end_on_newest() {
        let (_, service) = service_with(RebuildMode::Background);

        service.record_rating(Rating::new("U3", "X", 5)).await.unwrap();
        service.record_rating(Rating::new("U3", "Y", 4)).await.unwrap();
        service.record_rating(Rating::new("U1", "X", 2)).await.unwrap();
        service.wait_for_rebuilds().await.unwrap();

        // Whatever order the workers finished in, the last reservation wins
        assert_eq!(service.model_generation(), 4);
        assert_eq!(service.model_snapshot().item_count(), 5);
    }

    #[tokio::test]
    async fn test_snapshot_outlives_rebuild() {
        let (_, service) = service_with(RebuildMode::Synchronous);
        let snapshot = service.model_snapshot();

        service.record_rating(Rating::new("U3", "X", 5)).await.unwrap();

        assert_eq!(snapshot.item_count(), 3);
        assert_eq!(service.model_snapshot().item_count(), 4);
    }

    #[tokio::test]
    async fn test_invalid_rating_is_rejected_without_rebuild() {
        let (_, service) = service_with(RebuildMode::Synchronous);

        assert!(service.record_rating(Rating::new("U1", "C", 9)).await.is_err());
        assert!(service.record_rating(Rating::new("ghost", "C", 3)).await.is_err());
        assert_eq!(service.model_generation(), 1);
    }

    #[tokio::test]
    async fn test_failed_background_rebuild_is_reported() {
        let failing: JoinHandle<()> = tokio::task::spawn_blocking(|| panic!("rebuild blew up"));
        let succeeding = tokio::task::spawn_blocking(|| ());
        while !(failing.is_finished() && succeeding.is_finished()) {
            tokio::task::yield_now().await;
        }

        assert_eq!(reap_rebuilds(vec![failing, succeeding]).await, 1);
        assert_eq!(reap_rebuilds(Vec::new()).await, 0);
    }

    #[tokio::test]
    async fn test_finished_background_rebuilds_are_reaped() {
        let (_, service) = service_with(RebuildMode::Background);

        service.record_rating(Rating::new("U3", "X", 5)).await.unwrap();
        while !service.lock_pending().iter().all(|handle| handle.is_finished()) {
            tokio::task::yield_now().await;
        }
        service.record_rating(Rating::new("U3", "Y", 4)).await.unwrap();

        // The first handle was reaped, only the new rebuild is parked
        assert_eq!(service.lock_pending().len(), 1);
        service.wait_for_rebuilds().await.unwrap();
        assert_eq!(service.model_generation(), 3);
    }

    #[test]
    fn test_empty_store_serves_popularity() {
        let mut index = DataIndex::new();
        index.insert_business(business("A", 4.0));
        index.insert_business(business("B", 4.5));
        let index = Arc::new(index);

        let service = RecommendationService::new(index.clone(), index, ServiceConfig::default());

        assert!(service.model_snapshot().is_empty());
        assert_eq!(ids(&service.recommend("anyone", 5)), ["B", "A"]);
    }
}
