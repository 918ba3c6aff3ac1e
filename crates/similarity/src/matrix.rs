//! The dense user × item rating matrix.
//!
//! Rows are users, columns are businesses, both in ascending id order. A cell
//! holds the user's score or `0.0` when the user never rated that business.
//! Scores start at 1, so the zero sentinel can't collide with a real rating.
//!
//! Storage is column-major because the similarity computation only ever
//! reads whole item columns.

use data_loader::{ItemId, Rating, Score, UserId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::warn;

/// Value stored for an unrated cell
pub const UNRATED: f64 = 0.0;

#[derive(Debug, Clone, PartialEq)]
pub struct UserItemMatrix {
    users: Vec<UserId>,
    items: Vec<ItemId>,
    user_positions: HashMap<UserId, usize>,
    item_positions: HashMap<ItemId, usize>,
    /// One vector per item, each `users.len()` long
    columns: Vec<Vec<f64>>,
    /// Ratings dropped because their score was out of range
    skipped: usize,
}

impl UserItemMatrix {
    /// An all-unrated matrix over the given users and items.
    ///
    /// Ids are sorted and deduplicated.
    pub fn new(users: impl IntoIterator<Item = UserId>, items: impl IntoIterator<Item = ItemId>) -> Self {
        let users: Vec<UserId> = users.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let items: Vec<ItemId> = items.into_iter().collect::<BTreeSet<_>>().into_iter().collect();

        let user_positions = users
            .iter()
            .enumerate()
            .map(|(position, id)| (id.clone(), position))
            .collect();
        let item_positions = items
            .iter()
            .enumerate()
            .map(|(position, id)| (id.clone(), position))
            .collect();
        let columns = vec![vec![UNRATED; users.len()]; items.len()];

        Self {
            users,
            items,
            user_positions,
            item_positions,
            columns,
            skipped: 0,
        }
    }

    /// Pivot a rating set into a matrix.
    ///
    /// Ratings with an out-of-range score are skipped (and counted). When the
    /// same (user, item) pair shows up twice the later rating wins.
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        let mut cells: BTreeMap<(&str, &str), Score> = BTreeMap::new();
        let mut skipped = 0;

        for rating in ratings {
            if !rating.has_valid_score() {
                warn!(
                    user_id = %rating.user_id,
                    item_id = %rating.item_id,
                    score = rating.score,
                    "Skipping rating with out-of-range score"
                );
                skipped += 1;
                continue;
            }
            cells.insert((rating.user_id.as_str(), rating.item_id.as_str()), rating.score);
        }

        let mut matrix = Self::new(
            cells.keys().map(|(user, _)| user.to_string()),
            cells.keys().map(|(_, item)| item.to_string()),
        );
        for ((user, item), score) in cells {
            matrix.set(user, item, score);
        }
        matrix.skipped = skipped;
        matrix
    }

    /// Set a cell; returns false if the user or item isn't part of the matrix
    pub fn set(&mut self, user_id: &str, item_id: &str, score: Score) -> bool {
        match (self.user_positions.get(user_id), self.item_positions.get(item_id)) {
            (Some(&row), Some(&column)) => {
                self.columns[column][row] = f64::from(score);
                true
            }
            _ => false,
        }
    }

    /// Score in a cell, `0.0` when unrated, `None` for unknown ids
    pub fn get(&self, user_id: &str, item_id: &str) -> Option<f64> {
        let row = *self.user_positions.get(user_id)?;
        let column = *self.item_positions.get(item_id)?;
        Some(self.columns[column][row])
    }

    /// The vector of scores every user gave one item
    pub fn column(&self, item_id: &str) -> Option<&[f64]> {
        self.item_positions
            .get(item_id)
            .map(|&column| self.columns[column].as_slice())
    }

    pub(crate) fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Number of rated (nonzero) cells
    pub fn rated_cells(&self) -> usize {
        self.columns
            .iter()
            .map(|column| column.iter().filter(|&&value| value != UNRATED).count())
            .sum()
    }

    /// Number of input ratings dropped by `from_ratings`
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// True when there is nothing to compare
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() || self.users.is_empty()
    }
}
