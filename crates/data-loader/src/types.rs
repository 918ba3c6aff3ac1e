//! Core domain types for the tourism catalog.
//!
//! This module defines the records every other crate works with:
//! - Type aliases for domain clarity (UserId, ItemId, Score)
//! - Business, User and Rating records as they appear in the seed file
//! - Precomputed per-business rating statistics

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// Type Aliases
// =============================================================================
// Identifiers are opaque strings (24 hex digits in the seed data). Keeping them
// as `String` gives a total, stable ordering we rely on for determinism.

/// Unique identifier for a user
pub type UserId = String;

/// Unique identifier for a business (an "item" to the recommender)
pub type ItemId = String;

/// A rating score, always in `MIN_SCORE..=MAX_SCORE` once validated
pub type Score = u8;

/// Lowest valid rating score
pub const MIN_SCORE: Score = 1;

/// Highest valid rating score
pub const MAX_SCORE: Score = 5;

/// Image shown for businesses that have none
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/300x200";

// =============================================================================
// Business-related Types
// =============================================================================

/// Geographic position of a business
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A local business listed in the catalog
///
/// Only `id` and `average_rating` matter to the recommender; the rest is
/// carried through to whoever renders the recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Aggregate average rating, used as the popularity score
    #[serde(default)]
    pub average_rating: f32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Opening hours keyed by day name
    #[serde(default)]
    pub opening_hours: BTreeMap<String, String>,
}

impl Business {
    /// Image URL, or the placeholder when the business has none
    pub fn image_url_or_placeholder(&self) -> &str {
        self.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE_URL)
    }
}

// =============================================================================
// User-related Types
// =============================================================================

/// A registered user of the tourism app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

// =============================================================================
// Rating Type
// =============================================================================

/// A single user's score for one business
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub score: Score,
}

impl Rating {
    pub fn new(user_id: impl Into<UserId>, item_id: impl Into<ItemId>, score: Score) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            score,
        }
    }

    /// Whether the score is inside the valid 1-5 range
    pub fn has_valid_score(&self) -> bool {
        (MIN_SCORE..=MAX_SCORE).contains(&self.score)
    }
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Rating statistics for a business, computed from the stored ratings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusinessStats {
    pub avg_score: f32,
    pub rating_count: u32,
}
