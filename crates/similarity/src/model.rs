//! Similarity model building.
//!
//! ## Algorithm
//! 1. Pivot the complete rating set into a user × item matrix (0 = unrated)
//! 2. Compute cosine similarity between every pair of item columns
//! 3. Wrap the result, or signal an empty model when there is nothing to pivot
//!
//! The build is a pure function of the rating set: the same ratings always
//! give a bit-identical matrix, whatever order the store returned them in.

use crate::cosine::ItemSimilarityMatrix;
use crate::matrix::UserItemMatrix;
use data_loader::{Rating, RatingStore};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Output of a model build.
///
/// `Empty` is a legitimate state (no ratings yet), not an error: consumers
/// answer every request from the popularity ranking while it holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SimilarityModel {
    #[default]
    Empty,
    Trained(ItemSimilarityMatrix),
}

impl SimilarityModel {
    pub fn is_empty(&self) -> bool {
        matches!(self, SimilarityModel::Empty)
    }

    /// The similarity matrix, if one could be built
    pub fn matrix(&self) -> Option<&ItemSimilarityMatrix> {
        match self {
            SimilarityModel::Empty => None,
            SimilarityModel::Trained(matrix) => Some(matrix),
        }
    }

    /// Similarity of two items; `None` for an empty model or unknown items
    pub fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        self.matrix()?.get(a, b)
    }

    /// Number of items covered by the model
    pub fn item_count(&self) -> usize {
        self.matrix().map_or(0, ItemSimilarityMatrix::len)
    }
}

/// Summary of one build, logged after every rebuild
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModelStats {
    pub users: usize,
    pub items: usize,
    /// Distinct (user, item) cells that made it into the matrix
    pub ratings_used: usize,
    /// Input ratings dropped for an out-of-range score
    pub ratings_skipped: usize,
    /// Fraction of rated cells in the user-item matrix
    pub density: f64,
}

/// Build a similarity model from a complete rating set.
#[instrument(skip(ratings), fields(rating_count = ratings.len()))]
pub fn build_similarity_model(ratings: &[Rating]) -> (SimilarityModel, ModelStats) {
    let user_item = UserItemMatrix::from_ratings(ratings);

    let ratings_used = user_item.rated_cells();
    let cells = user_item.users().len() * user_item.items().len();
    let stats = ModelStats {
        users: user_item.users().len(),
        items: user_item.items().len(),
        ratings_used,
        ratings_skipped: user_item.skipped(),
        density: if cells > 0 {
            ratings_used as f64 / cells as f64
        } else {
            0.0
        },
    };

    if user_item.is_empty() {
        debug!("No usable ratings, similarity model is empty");
        return (SimilarityModel::Empty, stats);
    }

    debug!(
        "Pivoted {} ratings into a {}x{} user-item matrix",
        ratings_used, stats.users, stats.items
    );
    let matrix = ItemSimilarityMatrix::from_user_item(&user_item);
    (SimilarityModel::Trained(matrix), stats)
}

/// Builds similarity models from whatever a rating store currently holds
#[derive(Clone)]
pub struct SimilarityModelBuilder {
    /// Shared handle to the rating store (read-only here)
    store: Arc<dyn RatingStore>,
}

impl SimilarityModelBuilder {
    pub fn new(store: Arc<dyn RatingStore>) -> Self {
        Self { store }
    }

    /// Read every rating and build a fresh model.
    ///
    /// The model is built in isolation; publishing it is the caller's job.
    pub fn build(&self) -> (SimilarityModel, ModelStats) {
        let start_time = Instant::now();
        let ratings = self.store.fetch_all_ratings();
        let (model, stats) = build_similarity_model(&ratings);

        info!(
            users = stats.users,
            items = stats.items,
            ratings_used = stats.ratings_used,
            ratings_skipped = stats.ratings_skipped,
            density = stats.density,
            "Built similarity model in {:.2?}",
            start_time.elapsed()
        );
        (model, stats)
    }
}
