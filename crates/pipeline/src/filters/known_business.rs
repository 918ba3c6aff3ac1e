//! Filter to drop candidates the catalog can't resolve.
//!
//! Ratings can outlive the businesses they point at; a recommendation for a
//! business that no longer exists would render as nothing.

use crate::traits::Filter;
use crate::types::{Recommendation, UserProfile};
use anyhow::Result;
use data_loader::BusinessCatalog;
use std::sync::Arc;

/// Keeps only candidates present in the business catalog
pub struct KnownBusinessFilter {
    catalog: Arc<dyn BusinessCatalog>,
}

impl KnownBusinessFilter {
    pub fn new(catalog: Arc<dyn BusinessCatalog>) -> Self {
        Self { catalog }
    }
}

impl Filter for KnownBusinessFilter {
    fn name(&self) -> &str {
        "KnownBusinessFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Recommendation>,
        _profile: &UserProfile,
    ) -> Result<Vec<Recommendation>> {
        Ok(candidates
            .into_iter()
            .filter(|candidate| self.catalog.get_business(&candidate.item_id).is_some())
            .collect())
    }
}
