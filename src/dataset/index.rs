use super::store::RatingDataset;
use super::types::{ItemIndex, RatingValue, UserIndex};
use crate::similarity::Axis;

/// (opposite-axis index, rating value)
pub type Entry = (usize, RatingValue);

/// Per-user and per-item rating lists, each sorted by the opposite index
#[derive(Debug, Clone)]
pub struct RatingIndex {
    by_user: Vec<Vec<Entry>>,
    by_item: Vec<Vec<Entry>>,
}

impl RatingIndex {
    pub fn build(data: &RatingDataset) -> Self {
        let mut by_user = vec![Vec::new(); data.n_users()];
        let mut by_item = vec![Vec::new(); data.n_items()];

        for rating in data.ratings() {
            by_user[rating.user].push((rating.item, rating.value));
            by_item[rating.item].push((rating.user, rating.value));
        }

        sort_rows(&mut by_user);
        sort_rows(&mut by_item);

        Self { by_user, by_item }
    }

    /// Rating lists of the entities living on `axis`
    pub fn rows(&self, axis: Axis) -> &[Vec<Entry>] {
        match axis {
            Axis::User => &self.by_user,
            Axis::Item => &self.by_item,
        }
    }

    /// Ratings of one entity on `axis`; empty when the index is out of range
    pub fn entries(&self, axis: Axis, entity: usize) -> &[Entry] {
        self.rows(axis)
            .get(entity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn rating(&self, user: UserIndex, item: ItemIndex) -> Option<RatingValue> {
        lookup(self.entries(Axis::User, user), item)
    }

    /// Average rating of an entity, `None` when it has no ratings
    pub fn mean(&self, axis: Axis, entity: usize) -> Option<RatingValue> {
        let entries = self.entries(axis, entity);
        if entries.is_empty() {
            return None;
        }

        let sum: f64 = entries.iter().map(|&(_, v)| v).sum();
        Some(sum / entries.len() as f64)
    }

    pub fn has_ratings(&self, axis: Axis, entity: usize) -> bool {
        !self.entries(axis, entity).is_empty()
    }
}

/// Binary search a sorted rating list for the opposite-axis index
pub fn lookup(entries: &[Entry], other: usize) -> Option<RatingValue> {
    entries
        .binary_search_by_key(&other, |&(idx, _)| idx)
        .ok()
        .map(|pos| entries[pos].1)
}

fn sort_rows(rows: &mut [Vec<Entry>]) {
    for row in rows.iter_mut() {
        row.sort_unstable_by_key(|&(idx, _)| idx);
    }
}
