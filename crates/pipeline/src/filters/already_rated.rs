//! Filter to remove businesses the user has already rated.
//!
//! Scoring already skips rated businesses; running this filter first in the
//! pipeline keeps that guarantee for any candidates added by other means.

use crate::traits::Filter;
use crate::types::{Recommendation, UserProfile};
use anyhow::Result;

/// Removes candidates that the user has already rated.
pub struct AlreadyRatedFilter;

impl Filter for AlreadyRatedFilter {
    fn name(&self) -> &str {
        "AlreadyRatedFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Recommendation>,
        profile: &UserProfile,
    ) -> Result<Vec<Recommendation>> {
        let filtered: Vec<Recommendation> = candidates
            .into_iter()
            .filter(|candidate| !profile.has_rated(&candidate.item_id))
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RecommendationSource;

    #[test]
    fn test_already_rated_filter() {
        let mut profile = UserProfile::new("U1");
        profile.rated_items.insert("a".to_string(), 5);
        profile.rated_items.insert("c".to_string(), 3);

        let candidates = vec![
            Recommendation::new("a", RecommendationSource::Collaborative, 0.9),
            Recommendation::new("b", RecommendationSource::Collaborative, 0.8),
            Recommendation::new("c", RecommendationSource::Collaborative, 0.7),
            Recommendation::new("d", RecommendationSource::Collaborative, 0.6),
        ];

        let filtered = AlreadyRatedFilter.apply(candidates, &profile).unwrap();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].item_id, "b");
        assert_eq!(filtered[1].item_id, "d");
    }
}
