//! # Server Crate
//!
//! The recommendation service: owns the shared similarity model, answers
//! requests against it and rebuilds it when ratings change.
//!
//! ## Main Components
//!
//! - **config**: `ServiceConfig`, loaded from `RECS_*` environment variables
//! - **state**: `SharedModel`, the atomically swapped model handle
//! - **service**: `RecommendationService`, the entry point for callers

pub mod config;
pub mod service;
pub mod state;

pub use config::{RebuildMode, ServiceConfig};
pub use service::{BusinessRecommendation, RecommendationService};
pub use state::SharedModel;
