use std::collections::HashMap;

pub type UserIndex = usize;
pub type ItemIndex = usize;
pub type RatingValue = f64;

/// A single observation with dense user/item indices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rating {
    pub user: UserIndex,
    pub item: ItemIndex,
    pub value: RatingValue,
    pub timestamp: Option<i64>,
}

/// Unparsed record as handed over by a loader
#[derive(Debug, Clone, PartialEq)]
pub struct RawRating {
    pub user: String,
    pub item: String,
    pub rating: String,
    pub timestamp: Option<String>,
}

impl RawRating {
    pub fn new(
        user: impl Into<String>,
        item: impl Into<String>,
        rating: impl Into<String>,
        timestamp: Option<String>,
    ) -> Self {
        Self {
            user: user.into(),
            item: item.into(),
            rating: rating.into(),
            timestamp,
        }
    }

    /// Record built from an already numeric rating, without timestamp
    pub fn numeric(user: impl Into<String>, item: impl Into<String>, rating: RatingValue) -> Self {
        Self::new(user, item, rating.to_string(), None)
    }
}

/// Bijection between external identifiers and dense indices [0, len)
#[derive(Debug, Default, Clone)]
pub struct IdMap {
    ids: Vec<String>,
    index: HashMap<String, usize>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the dense index for `id`, assigning the next one on first sight
    pub fn intern(&mut self, id: &str) -> usize {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }

        let idx = self.ids.len();
        self.ids.push(id.to_string());
        self.index.insert(id.to_string(), idx);
        idx
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn id_of(&self, idx: usize) -> Option<&str> {
        self.ids.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
