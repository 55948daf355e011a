use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::errors::EvalError;

/// Which entities are compared: users with users, or items with items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[value(aliases = ["user-based", "user_based"])]
    User,
    #[value(aliases = ["item-based", "item_based"])]
    Item,
}

impl Axis {
    pub fn opposite(self) -> Self {
        match self {
            Axis::User => Axis::Item,
            Axis::Item => Axis::User,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Axis::User => "user",
            Axis::Item => "item",
        }
    }

    /// Label used in reports, e.g. "User-based"
    pub fn label(&self) -> &str {
        match self {
            Axis::User => "User-based",
            Axis::Item => "Item-based",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "user-based" | "user_based" => Ok(Axis::User),
            "item" | "item-based" | "item_based" => Ok(Axis::Item),
            other => Err(EvalError::invalid_config(format!("unknown axis '{}'", other))),
        }
    }
}

/// Similarity measure between two rating vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Cosine,
    Msd,
    Pearson,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Cosine, Metric::Msd, Metric::Pearson];

    pub fn as_str(&self) -> &str {
        match self {
            Metric::Cosine => "cosine",
            Metric::Msd => "msd",
            Metric::Pearson => "pearson",
        }
    }

    /// Inclusive bounds of the values the metric can produce
    pub fn range(&self) -> (f64, f64) {
        match self {
            Metric::Cosine | Metric::Pearson => (-1.0, 1.0),
            Metric::Msd => (0.0, 1.0),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "msd" => Ok(Metric::Msd),
            "pearson" => Ok(Metric::Pearson),
            other => Err(EvalError::invalid_config(format!(
                "unknown similarity metric '{}'",
                other
            ))),
        }
    }
}
