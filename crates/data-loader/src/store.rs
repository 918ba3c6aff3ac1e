//! Store-access traits consumed by the recommender.
//!
//! The similarity builder and the recommendation generator only ever see
//! these two narrow interfaces, never the concrete [`DataIndex`]. Anything
//! that can list ratings and rank businesses by popularity can back them.

use crate::error::Result;
use crate::index::DataIndex;
use crate::types::{Business, ItemId, Rating};

/// Read/write access to rating records.
///
/// No ordering guarantee is required from implementations.
pub trait RatingStore: Send + Sync {
    /// Every rating currently stored
    fn fetch_all_ratings(&self) -> Vec<Rating>;

    /// Ratings made by one user; empty for unknown users
    fn fetch_ratings_for_user(&self, user_id: &str) -> Vec<Rating>;

    /// Store a rating, replacing any earlier score for the same pair
    fn upsert_rating(&self, rating: Rating) -> Result<()>;
}

/// Business metadata and popularity ranking.
pub trait BusinessCatalog: Send + Sync {
    /// Up to `n` business ids, most popular first
    fn top_by_popularity(&self, n: usize) -> Vec<ItemId>;

    fn get_business(&self, id: &str) -> Option<Business>;

    /// Popularity score of a business (its aggregate average rating)
    fn popularity(&self, id: &str) -> Option<f32> {
        self.get_business(id).map(|business| business.average_rating)
    }
}

impl RatingStore for DataIndex {
    fn fetch_all_ratings(&self) -> Vec<Rating> {
        self.all_ratings()
    }

    fn fetch_ratings_for_user(&self, user_id: &str) -> Vec<Rating> {
        self.get_user_ratings(user_id)
    }

    fn upsert_rating(&self, rating: Rating) -> Result<()> {
        self.record_rating(rating).map(|_| ())
    }
}

impl BusinessCatalog for DataIndex {
    /// Sorted by average rating descending; ties keep catalog order
    fn top_by_popularity(&self, n: usize) -> Vec<ItemId> {
        let mut ranked: Vec<&Business> = self.businesses().iter().collect();
        // stable sort, so equal ratings stay in catalog order
        ranked.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
        ranked
            .into_iter()
            .take(n)
            .map(|business| business.id.clone())
            .collect()
    }

    fn get_business(&self, id: &str) -> Option<Business> {
        DataIndex::get_business(self, id).cloned()
    }
}
