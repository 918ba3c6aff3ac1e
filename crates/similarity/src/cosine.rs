//! Item × item cosine similarity.

use crate::matrix::UserItemMatrix;
use data_loader::ItemId;
use rayon::prelude::*;
use std::collections::HashMap;

/// Euclidean norm of a vector
pub fn norm(vector: &[f64]) -> f64 {
    vector.iter().map(|value| value * value).sum::<f64>().sqrt()
}

/// Dot product of two equally long vectors
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Cosine similarity of two vectors, `0.0` if either has zero norm.
///
/// Clamped to `[-1, 1]` to absorb rounding on near-parallel vectors.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    similarity_from_parts(dot(a, b), norm(a), norm(b))
}

fn similarity_from_parts(dot: f64, norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Square, symmetric similarity table indexed by item id on both axes.
///
/// Items are stored in ascending id order, the same order as the user-item
/// matrix they were computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSimilarityMatrix {
    items: Vec<ItemId>,
    positions: HashMap<ItemId, usize>,
    /// Row-major, `items.len()²` values
    values: Vec<f64>,
}

impl ItemSimilarityMatrix {
    /// Compare every pair of item columns.
    ///
    /// The diagonal is 1 for items with at least one rating and 0 for an
    /// all-zero column. Rows are computed in parallel; every cell depends only
    /// on its two columns so the result doesn't depend on scheduling.
    pub fn from_user_item(matrix: &UserItemMatrix) -> Self {
        let columns = matrix.columns();
        let norms: Vec<f64> = columns.par_iter().map(|column| norm(column)).collect();
        let size = columns.len();

        let rows: Vec<Vec<f64>> = (0..size)
            .into_par_iter()
            .map(|i| {
                (0..size)
                    .map(|j| {
                        if i == j {
                            if norms[i] > 0.0 { 1.0 } else { 0.0 }
                        } else {
                            similarity_from_parts(dot(&columns[i], &columns[j]), norms[i], norms[j])
                        }
                    })
                    .collect()
            })
            .collect();

        let items = matrix.items().to_vec();
        let positions = items
            .iter()
            .enumerate()
            .map(|(position, id)| (id.clone(), position))
            .collect();

        Self {
            items,
            positions,
            values: rows.into_iter().flatten().collect(),
        }
    }

    /// Similarity of two items, `None` if either is unknown
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = *self.positions.get(a)?;
        let j = *self.positions.get(b)?;
        Some(self.values[i * self.items.len() + j])
    }

    /// Every `(item, similarity)` pair in one item's row, diagonal included
    pub fn row<'a>(&'a self, item_id: &str) -> Option<impl Iterator<Item = (&'a ItemId, f64)> + use<'a>> {
        let i = *self.positions.get(item_id)?;
        let size = self.items.len();
        Some(
            self.items
                .iter()
                .zip(self.values[i * size..(i + 1) * size].iter().copied()),
        )
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.positions.contains_key(item_id)
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Raw row-major values, mostly useful for comparing two builds
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
