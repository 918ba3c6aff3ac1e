//! Parser for the JSON seed file.
//!
//! The seed file holds the three collections the app starts with:
//!
//! ```json
//! {
//!   "businesses": [{ "id": "...", "name": "...", "category": "...", "average_rating": 4.5 }],
//!   "users":      [{ "id": "...", "name": "..." }],
//!   "ratings":    [{ "user_id": "...", "item_id": "...", "score": 5 }]
//! }
//! ```
//!
//! Parsing only checks shape; referential checks live in
//! [`SeedData::validate`].

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// The raw contents of a seed file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub businesses: Vec<Business>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
}

impl SeedData {
    /// Check that every rating points at a known user and business and
    /// carries a score in the valid range
    pub fn validate(&self) -> Result<()> {
        let mut business_ids = HashSet::new();
        for business in &self.businesses {
            if !business_ids.insert(business.id.as_str()) {
                return Err(DataLoadError::ValidationError(format!(
                    "duplicate business id {}",
                    business.id
                )));
            }
            if !business.average_rating.is_finite() || business.average_rating < 0.0 {
                return Err(DataLoadError::InvalidValue {
                    field: "average_rating".to_string(),
                    value: business.average_rating.to_string(),
                });
            }
        }

        let user_ids: HashSet<&str> = self.users.iter().map(|u| u.id.as_str()).collect();

        for rating in &self.ratings {
            if !user_ids.contains(rating.user_id.as_str()) {
                return Err(DataLoadError::MissingReference {
                    entity: "User".to_string(),
                    id: rating.user_id.clone(),
                });
            }
            if !business_ids.contains(rating.item_id.as_str()) {
                return Err(DataLoadError::MissingReference {
                    entity: "Business".to_string(),
                    id: rating.item_id.clone(),
                });
            }
            if !rating.has_valid_score() {
                return Err(DataLoadError::InvalidValue {
                    field: "score".to_string(),
                    value: rating.score.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Parse seed data from a JSON string
///
/// `file` is only used to label errors.
pub fn parse_seed_str(content: &str, file: &str) -> Result<SeedData> {
    serde_json::from_str(content).map_err(|source| DataLoadError::ParseError {
        file: file.to_string(),
        source,
    })
}

/// Read and parse a seed file from disk
pub fn parse_seed_file(path: &Path) -> Result<SeedData> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;
    parse_seed_str(&content, &path.display().to_string())
}
