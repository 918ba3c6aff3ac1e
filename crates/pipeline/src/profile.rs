//! Build a UserProfile from the rating store.

use crate::types::UserProfile;
use data_loader::RatingStore;
use tracing::debug;

/// Collect a user's own ratings.
///
/// Unknown users simply get an empty profile; the generator treats that the
/// same way as an empty model. Ratings with an out-of-range score are ignored.
pub fn build_user_profile(store: &dyn RatingStore, user_id: &str) -> UserProfile {
    let mut profile = UserProfile::new(user_id);

    for rating in store.fetch_ratings_for_user(user_id) {
        if rating.user_id != user_id || !rating.has_valid_score() {
            debug!(
                item_id = %rating.item_id,
                score = rating.score,
                "Ignoring unusable rating in user profile"
            );
            continue;
        }
        profile.rated_items.insert(rating.item_id, rating.score);
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Rating, Result};

    /// Store stub that hands back whatever it was given
    struct FixedStore(Vec<Rating>);

    impl RatingStore for FixedStore {
        fn fetch_all_ratings(&self) -> Vec<Rating> {
            self.0.clone()
        }

        fn fetch_ratings_for_user(&self, user_id: &str) -> Vec<Rating> {
            self.0.iter().filter(|r| r.user_id == user_id).cloned().collect()
        }

        fn upsert_rating(&self, _rating: Rating) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_profile_collects_ratings() {
        let store = FixedStore(vec![
            Rating::new("U1", "A", 5),
            Rating::new("U1", "B", 3),
            Rating::new("U2", "C", 4),
        ]);

        let profile = build_user_profile(&store, "U1");
        assert_eq!(profile.user_id, "U1");
        assert_eq!(profile.rated_items.len(), 2);
        assert!(profile.has_rated("A"));
        assert!(!profile.has_rated("C"));
    }

    #[test]
    fn test_unknown_user_gets_empty_profile() {
        let store = FixedStore(vec![Rating::new("U1", "A", 5)]);

        let profile = build_user_profile(&store, "nobody");
        assert!(!profile.has_ratings());
    }

    #[test]
    fn test_out_of_range_scores_are_ignored() {
        let store = FixedStore(vec![Rating::new("U1", "A", 0), Rating::new("U1", "B", 4)]);

        let profile = build_user_profile(&store, "U1");
        assert_eq!(profile.rated_items.keys().collect::<Vec<_>>(), ["B"]);
    }
}
