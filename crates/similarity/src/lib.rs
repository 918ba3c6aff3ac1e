//! # Similarity Crate
//!
//! Item-based collaborative filtering model for the tourism recommender.
//!
//! ## Components
//!
//! ### User-Item Matrix
//! The complete rating set pivoted into a dense table: one row per user, one
//! column per business, 0 where the user never rated the business.
//!
//! ### Item Similarity Matrix
//! Cosine similarity between every pair of business columns. Symmetric, with
//! 1 on the diagonal for any business that has at least one rating. A column
//! nobody rated is 0 against everything instead of dividing by zero.
//!
//! ### Similarity Model
//! Either a trained matrix or the explicit `Empty` signal when no ratings
//! exist yet. Rebuilt wholesale whenever ratings change.
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::{build_similarity_model, SimilarityModelBuilder};
//! use data_loader::DataIndex;
//! use std::sync::Arc;
//!
//! let index = Arc::new(DataIndex::load_from_file("data/seed.json".as_ref())?);
//! let builder = SimilarityModelBuilder::new(index.clone());
//! let (model, stats) = builder.build();
//!
//! if let Some(sim) = model.similarity("business-a", "business-b") {
//!     println!("similarity: {:.3}", sim);
//! }
//! ```

// Public modules
pub mod cosine;
pub mod matrix;
pub mod model;

// Re-export commonly used types
pub use cosine::{ItemSimilarityMatrix, cosine_similarity};
pub use matrix::UserItemMatrix;
pub use model::{ModelStats, SimilarityModel, SimilarityModelBuilder, build_similarity_model};
