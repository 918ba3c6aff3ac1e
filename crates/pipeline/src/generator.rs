//! Recommendation Generator - item-based weighted voting with a popularity
//! fallback.
//!
//! ## Algorithm
//! 1. Fetch the user's own ratings. No ratings, or an empty model, means the
//!    popularity ranking answers the request
//! 2. For every business the user rated, walk its similarity row and add the
//!    similarity to each business the user hasn't rated yet
//! 3. Run the candidates through the filter pipeline (already rated, unknown
//!    to the catalog)
//! 4. Sort by accumulated score, highest first, ties by business id
//! 5. Keep the top N; if nothing survived, fall back to popularity

use crate::filter_pipeline::FilterPipeline;
use crate::filters::{AlreadyRatedFilter, KnownBusinessFilter};
use crate::profile::build_user_profile;
use crate::types::{Recommendation, RecommendationSource, UserProfile};
use data_loader::{BusinessCatalog, ItemId, RatingStore};
use similarity::{ItemSimilarityMatrix, SimilarityModel};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Number of recommendations returned when the caller doesn't say
pub const DEFAULT_LIMIT: usize = 5;

/// Produces ranked recommendations for one user at a time
#[derive(Clone)]
pub struct RecommendationGenerator {
    ratings: Arc<dyn RatingStore>,
    catalog: Arc<dyn BusinessCatalog>,
    filter_pipeline: Arc<FilterPipeline>,
}

impl RecommendationGenerator {
    /// Create a generator with the standard filters
    /// (`AlreadyRatedFilter`, then `KnownBusinessFilter`)
    pub fn new(ratings: Arc<dyn RatingStore>, catalog: Arc<dyn BusinessCatalog>) -> Self {
        let filter_pipeline = FilterPipeline::new()
            .add_filter(AlreadyRatedFilter)
            .add_filter(KnownBusinessFilter::new(catalog.clone()));

        Self {
            ratings,
            catalog,
            filter_pipeline: Arc::new(filter_pipeline),
        }
    }

    /// Replace the filter pipeline
    pub fn with_filter_pipeline(mut self, filter_pipeline: FilterPipeline) -> Self {
        self.filter_pipeline = Arc::new(filter_pipeline);
        self
    }

    /// Up to `limit` recommendations for `user_id`, best first.
    ///
    /// Never fails: every degenerate case (unknown user, empty model, nothing
    /// left after filtering, a filter error) ends in the popularity ranking.
    #[instrument(skip(self, model))]
    pub fn recommend(
        &self,
        user_id: &str,
        model: &SimilarityModel,
        limit: usize,
    ) -> Vec<Recommendation> {
        let profile = build_user_profile(self.ratings.as_ref(), user_id);

        let matrix = match model.matrix() {
            Some(matrix) if profile.has_ratings() => matrix,
            Some(_) => {
                debug!("User has no ratings, using popularity ranking");
                return self.popularity_fallback(limit);
            }
            None => {
                debug!("Similarity model is empty, using popularity ranking");
                return self.popularity_fallback(limit);
            }
        };

        let candidates = score_candidates(matrix, &profile);
        debug!(
            "Scored {} candidates from {} rated businesses",
            candidates.len(),
            profile.rated_items.len()
        );

        let mut filtered = match self.filter_pipeline.apply(candidates, &profile) {
            Ok(filtered) => filtered,
            Err(e) => {
                warn!(error = %e, "Filtering failed, using popularity ranking");
                return self.popularity_fallback(limit);
            }
        };

        if filtered.is_empty() {
            debug!("No candidates left after filtering, using popularity ranking");
            return self.popularity_fallback(limit);
        }

        rank_candidates(&mut filtered);
        filtered.truncate(limit);
        filtered
    }

    /// The catalog's top businesses by popularity, scored by their average
    /// rating
    pub fn popularity_fallback(&self, limit: usize) -> Vec<Recommendation> {
        self.catalog
            .top_by_popularity(limit)
            .into_iter()
            .map(|item_id| {
                let score = self.catalog.popularity(&item_id).unwrap_or_default();
                Recommendation::new(item_id, RecommendationSource::Popularity, f64::from(score))
            })
            .collect()
    }
}

/// Weighted voting: sum the similarity between each rated business and every
/// business the user hasn't rated.
///
/// Rated businesses missing from the matrix (rated after the last rebuild)
/// contribute nothing. A business never votes for itself because it is
/// always in the rated set. Output is in business id order.
pub fn score_candidates(matrix: &ItemSimilarityMatrix, profile: &UserProfile) -> Vec<Recommendation> {
    let mut scores: BTreeMap<&ItemId, f64> = BTreeMap::new();

    for rated_item in profile.rated_items.keys() {
        let Some(row) = matrix.row(rated_item) else {
            continue;
        };
        for (other, similarity) in row {
            if profile.has_rated(other) {
                continue;
            }
            *scores.entry(other).or_insert(0.0) += similarity;
        }
    }

    scores
        .into_iter()
        .map(|(item_id, score)| {
            Recommendation::new(item_id.clone(), RecommendationSource::Collaborative, score)
        })
        .collect()
}

/// Sort by score descending, then business id ascending
pub fn rank_candidates(candidates: &mut [Recommendation]) {
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });
}
