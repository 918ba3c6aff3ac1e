//! Recommendation pipeline for the tourism recommender.
//!
//! This crate provides:
//! - `RecommendationGenerator`: weighted voting over the item similarity
//!   matrix with a popularity fallback
//! - Filter trait and implementations for candidate filtering
//! - FilterPipeline for composing filters
//!
//! ## Architecture
//! A request flows through these stages:
//! 1. The user's ratings are gathered into a `UserProfile`
//! 2. Unrated businesses are scored by summed similarity to rated ones
//! 3. Filters remove unwanted candidates (already rated, unknown business)
//! 4. Survivors are ranked and truncated; an empty result falls back to
//!    the catalog's popularity ranking
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{RecommendationGenerator, DEFAULT_LIMIT};
//!
//! let generator = RecommendationGenerator::new(index.clone(), index.clone());
//! let recommendations = generator.recommend("user-1", &model, DEFAULT_LIMIT);
//! ```

pub mod filter_pipeline;
pub mod filters;
pub mod generator;
pub mod profile;
pub mod traits;
pub mod types;

// Re-export main types
pub use filter_pipeline::FilterPipeline;
pub use generator::{DEFAULT_LIMIT, RecommendationGenerator, rank_candidates, score_candidates};
pub use profile::build_user_profile;
pub use traits::Filter;
pub use types::{Recommendation, RecommendationSource, UserProfile};
