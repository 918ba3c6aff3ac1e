//! Types shared by the filters and the recommendation generator.

use data_loader::{ItemId, Score, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a recommendation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationSource {
    /// Weighted voting over the item similarity matrix
    Collaborative,
    /// Catalog popularity ranking
    Popularity,
}

/// One ranked business for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    /// Accumulated similarity for collaborative results, the business's
    /// average rating for popularity results
    pub score: f64,
    pub source: RecommendationSource,
}

impl Recommendation {
    pub fn new(item_id: impl Into<ItemId>, source: RecommendationSource, score: f64) -> Self {
        Self {
            item_id: item_id.into(),
            score,
            source,
        }
    }
}

/// What the generator knows about the requesting user: their own ratings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub user_id: UserId,
    /// Rated businesses, ordered by id
    pub rated_items: BTreeMap<ItemId, Score>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            rated_items: BTreeMap::new(),
        }
    }

    pub fn has_ratings(&self) -> bool {
        !self.rated_items.is_empty()
    }

    pub fn has_rated(&self, item_id: &str) -> bool {
        self.rated_items.contains_key(item_id)
    }
}
