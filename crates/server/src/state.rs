//! Process-wide similarity model state.
//!
//! Readers take an `Arc` snapshot and keep using it for the whole request.
//! A rebuild builds its model elsewhere and swaps it in with a single
//! pointer replacement, so nobody ever sees a half-built matrix.

use similarity::SimilarityModel;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug)]
struct Published {
    generation: u64,
    model: Arc<SimilarityModel>,
}

#[derive(Debug)]
struct Inner {
    published: RwLock<Published>,
    next_generation: AtomicU64,
}

/// Atomically swappable handle to the current similarity model.
///
/// Cloning the handle shares the same state. Every rebuild reserves a
/// generation before it reads the ratings; a model is only published if its
/// generation is newer than the one already out, so a slow rebuild can't
/// overwrite a fresher model.
#[derive(Debug, Clone)]
pub struct SharedModel {
    inner: Arc<Inner>,
}

impl SharedModel {
    /// Starts out holding the empty model at generation 0
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                published: RwLock::new(Published {
                    generation: 0,
                    model: Arc::new(SimilarityModel::Empty),
                }),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// The model currently published
    pub fn snapshot(&self) -> Arc<SimilarityModel> {
        self.inner
            .published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .model
            .clone()
    }

    /// Generation of the model currently published
    pub fn generation(&self) -> u64 {
        self.inner
            .published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Reserve the generation number for a rebuild about to start
    pub fn reserve_generation(&self) -> u64 {
        self.inner.next_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Swap in `model` if `generation` is newer than the published one.
    ///
    /// Returns whether the model was published.
    pub fn publish(&self, generation: u64, model: Arc<SimilarityModel>) -> bool {
        let mut published = self
            .inner
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if generation <= published.generation {
            return false;
        }
        *published = Published { generation, model };
        true
    }
}

impl Default for SharedModel {
    fn default() -> Self {
        Self::new()
    }
}
