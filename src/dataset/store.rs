use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use super::types::{IdMap, ItemIndex, Rating, RatingValue, RawRating, UserIndex};
use crate::errors::{EvalError, EvalResult};

/// Immutable, indexed collection of ratings
///
/// Subsets share the user/item mappings of the dataset they were cut from,
/// so dense indices stay valid across every fold of a cross-validation run.
#[derive(Debug, Clone)]
pub struct RatingDataset {
    ratings: Vec<Rating>,
    users: Arc<IdMap>,
    items: Arc<IdMap>,
}

impl RatingDataset {
    /// Builds a dataset from parsed records, keeping their order
    pub fn load<I>(records: I) -> EvalResult<Self>
    where
        I: IntoIterator<Item = RawRating>,
    {
        let mut users = IdMap::new();
        let mut items = IdMap::new();
        let mut seen_pairs = HashSet::new();
        let mut ratings = Vec::new();

        for (position, record) in records.into_iter().enumerate() {
            let record_no = position + 1;
            let value = parse_rating_value(&record.rating, record_no)?;
            let timestamp = parse_timestamp(record.timestamp.as_deref(), record_no)?;

            let user = users.intern(&record.user);
            let item = items.intern(&record.item);

            if !seen_pairs.insert((user, item)) {
                return Err(EvalError::format(
                    record_no,
                    format!(
                        "duplicate rating for user '{}' and item '{}'",
                        record.user, record.item
                    ),
                ));
            }

            ratings.push(Rating {
                user,
                item,
                value,
                timestamp,
            });
        }

        debug!(
            "Loaded {} ratings ({} users, {} items)",
            ratings.len(),
            users.len(),
            items.len()
        );

        Ok(Self {
            ratings,
            users: Arc::new(users),
            items: Arc::new(items),
        })
    }

    /// Read-only view over the given rating positions, sharing the id mappings
    pub fn subset(&self, indices: &[usize]) -> Self {
        let ratings = indices.iter().map(|&idx| self.ratings[idx]).collect();

        Self {
            ratings,
            users: Arc::clone(&self.users),
            items: Arc::clone(&self.items),
        }
    }

    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Size of the user index space (shared by all subsets)
    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    /// Size of the item index space (shared by all subsets)
    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn user_index(&self, user: &str) -> Option<UserIndex> {
        self.users.index_of(user)
    }

    pub fn item_index(&self, item: &str) -> Option<ItemIndex> {
        self.items.index_of(item)
    }

    pub fn user_id(&self, user: UserIndex) -> Option<&str> {
        self.users.id_of(user)
    }

    pub fn item_id(&self, item: ItemIndex) -> Option<&str> {
        self.items.id_of(item)
    }

    /// Mean of all rating values, `None` for an empty dataset
    pub fn global_mean(&self) -> Option<RatingValue> {
        if self.ratings.is_empty() {
            return None;
        }

        let sum: f64 = self.ratings.iter().map(|r| r.value).sum();
        Some(sum / self.ratings.len() as f64)
    }

    /// Lowest and highest rating value present
    pub fn rating_scale(&self) -> Option<(RatingValue, RatingValue)> {
        self.ratings.iter().map(|r| r.value).fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

fn parse_rating_value(text: &str, record_no: usize) -> EvalResult<RatingValue> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| EvalError::format(record_no, format!("rating '{}' is not a number", text)))?;

    if !value.is_finite() {
        return Err(EvalError::format(
            record_no,
            format!("rating '{}' is not finite", text),
        ));
    }

    Ok(value)
}

fn parse_timestamp(text: Option<&str>, record_no: usize) -> EvalResult<Option<i64>> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            EvalError::format(record_no, format!("timestamp '{}' is not an integer", raw))
        }),
    }
}
