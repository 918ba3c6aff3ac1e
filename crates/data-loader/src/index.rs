//! DataIndex - the in-memory store behind the recommender.
//!
//! Holds the business catalog, the users and the current rating set. Ratings
//! sit behind an `RwLock` so the index can be shared through an `Arc` while
//! new ratings arrive.

use crate::error::{DataLoadError, Result};
use crate::parser::{self, SeedData};
use crate::types::*;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

/// Main data structure that holds the catalog, the users and the ratings.
#[derive(Debug, Default)]
pub struct DataIndex {
    /// Businesses in catalog (seed) order
    pub(crate) businesses: Vec<Business>,
    /// Position of each business in `businesses`
    pub(crate) business_positions: HashMap<ItemId, usize>,
    pub(crate) users: HashMap<UserId, User>,
    /// One score per (user, business); later writes overwrite
    pub(crate) ratings: RwLock<BTreeMap<(UserId, ItemId), Score>>,
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a seed file, then build the index from it
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading seed data from {:?}", path);
        let seed = parser::parse_seed_file(path)?;
        let index = Self::from_seed(seed)?;

        let (businesses, users, ratings) = index.counts();
        info!(
            "Loaded {} businesses, {} users, {} ratings",
            businesses, users, ratings
        );
        Ok(index)
    }

    /// Build an index from already-parsed seed data
    pub fn from_seed(seed: SeedData) -> Result<Self> {
        seed.validate()?;

        let mut index = DataIndex::new();
        for business in seed.businesses {
            index.insert_business(business);
        }
        for user in seed.users {
            index.insert_user(user);
        }
        for rating in seed.ratings {
            index.insert_rating(rating);
        }
        Ok(index)
    }

    // Getters

    pub fn get_user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn get_business(&self, id: &str) -> Option<&Business> {
        self.business_positions
            .get(id)
            .map(|&position| &self.businesses[position])
    }

    /// All businesses in catalog order
    pub fn businesses(&self) -> &[Business] {
        &self.businesses
    }

    /// All user ids, sorted
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Ratings made by a user, ordered by business id
    pub fn get_user_ratings(&self, user_id: &str) -> Vec<Rating> {
        // keys sort by user first, so one user's ratings are contiguous
        self.read_ratings()
            .range((user_id.to_string(), ItemId::new())..)
            .take_while(|((uid, _), _)| uid == user_id)
            .map(|((uid, iid), &score)| Rating::new(uid.clone(), iid.clone(), score))
            .collect()
    }

    /// Every stored rating, ordered by (user, business)
    pub fn all_ratings(&self) -> Vec<Rating> {
        self.read_ratings()
            .iter()
            .map(|((uid, iid), &score)| Rating::new(uid.clone(), iid.clone(), score))
            .collect()
    }

    // Mutators

    /// Insert a business, replacing any existing record with the same id
    /// while keeping its catalog position
    pub fn insert_business(&mut self, business: Business) {
        match self.business_positions.get(&business.id) {
            Some(&position) => self.businesses[position] = business,
            None => {
                self.business_positions
                    .insert(business.id.clone(), self.businesses.len());
                self.businesses.push(business);
            }
        }
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    /// Insert a rating without validation (seed loading and tests)
    pub fn insert_rating(&mut self, rating: Rating) {
        self.ratings
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((rating.user_id, rating.item_id), rating.score);
    }

    /// Validate and store a rating through a shared reference.
    ///
    /// Returns the previous score when the rating replaced an older one.
    pub fn record_rating(&self, rating: Rating) -> Result<Option<Score>> {
        if !rating.has_valid_score() {
            return Err(DataLoadError::InvalidValue {
                field: "score".to_string(),
                value: rating.score.to_string(),
            });
        }
        if !self.users.contains_key(&rating.user_id) {
            return Err(DataLoadError::MissingReference {
                entity: "User".to_string(),
                id: rating.user_id,
            });
        }
        if !self.business_positions.contains_key(&rating.item_id) {
            return Err(DataLoadError::MissingReference {
                entity: "Business".to_string(),
                id: rating.item_id,
            });
        }

        Ok(self
            .write_ratings()
            .insert((rating.user_id, rating.item_id), rating.score))
    }

    /// Compute per-business rating statistics from the stored ratings
    pub fn compute_business_stats(&self) -> HashMap<ItemId, BusinessStats> {
        let mut per_business: HashMap<ItemId, Vec<Score>> = HashMap::new();
        for ((_, item_id), &score) in self.read_ratings().iter() {
            per_business.entry(item_id.clone()).or_default().push(score);
        }

        per_business
            .into_par_iter()
            .map(|(item_id, scores)| {
                let rating_count = scores.len() as u32;
                let total: u32 = scores.iter().map(|&s| s as u32).sum();
                let avg_score = total as f32 / rating_count as f32;
                (item_id, BusinessStats { avg_score, rating_count })
            })
            .collect()
    }

    /// Get counts (businesses, users, ratings) for debugging/validation
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.businesses.len(), self.users.len(), self.read_ratings().len())
    }

    fn read_ratings(&self) -> RwLockReadGuard<'_, BTreeMap<(UserId, ItemId), Score>> {
        self.ratings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_ratings(&self) -> RwLockWriteGuard<'_, BTreeMap<(UserId, ItemId), Score>> {
        self.ratings.write().unwrap_or_else(PoisonError::into_inner)
    }
}
