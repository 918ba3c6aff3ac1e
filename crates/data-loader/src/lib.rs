//! # Data Loader Crate
//!
//! This crate loads the tourism catalog and exposes it to the recommender.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Business, User, Rating)
//! - **parser**: Parse the JSON seed file
//! - **index**: The in-memory `DataIndex` holding catalog, users and ratings
//! - **store**: The `RatingStore` / `BusinessCatalog` traits the core consumes
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{BusinessCatalog, DataIndex, RatingStore};
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_file(Path::new("data/seed.json"))?;
//!
//! let popular = index.top_by_popularity(5);
//! let ratings = index.fetch_ratings_for_user("66d6c483d463d12d45a90105");
//! ```

// Public modules
pub mod error;
pub mod index;
pub mod parser;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::DataIndex;
pub use parser::SeedData;
pub use store::{BusinessCatalog, RatingStore};
pub use types::{
    // Type aliases
    ItemId,
    Score,
    UserId,
    // Core types
    Business,
    BusinessStats,
    Coordinates,
    Rating,
    User,
    // Constants
    MAX_SCORE,
    MIN_SCORE,
    PLACEHOLDER_IMAGE_URL,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_index_creation() {
        let index = DataIndex::new();
        let (businesses, users, ratings) = index.counts();

        assert_eq!(businesses, 0);
        assert_eq!(users, 0);
        assert_eq!(ratings, 0);
    }

    #[test]
    fn test_empty_queries() {
        let index = DataIndex::new();

        assert!(index.get_user("999").is_none());
        assert!(index.get_business("999").is_none());
        assert!(index.get_user_ratings("999").is_empty());
        assert!(index.top_by_popularity(5).is_empty());
    }

    #[test]
    fn test_load_bundled_seed() {
        // The seed file ships at the workspace root
        let path = std::path::Path::new("../../data/seed.json");

        if path.exists() {
            let index = DataIndex::load_from_file(path).unwrap();
            let (businesses, users, ratings) = index.counts();

            assert_eq!(businesses, 5);
            assert_eq!(users, 2);
            assert_eq!(ratings, 5);
        }
    }
}
