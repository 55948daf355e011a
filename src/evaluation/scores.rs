use serde::{Deserialize, Serialize};

/// Accuracy of one fold's predictions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoldScore {
    pub rmse: f64,
    pub mae: f64,
}

impl FoldScore {
    /// Scores prediction errors (predicted - actual); an empty slice scores zero
    pub fn from_errors(errors: &[f64]) -> Self {
        if errors.is_empty() {
            return Self { rmse: 0.0, mae: 0.0 };
        }

        Self {
            rmse: rmse(errors),
            mae: mae(errors),
        }
    }
}

/// Mean of per-fold scores across a cross-validation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateScore {
    pub rmse: f64,
    pub mae: f64,
}

impl AggregateScore {
    pub fn from_folds(folds: &[FoldScore]) -> Self {
        Self {
            rmse: mean(folds.iter().map(|f| f.rmse)),
            mae: mean(folds.iter().map(|f| f.mae)),
        }
    }
}

/// Population standard deviation of per-fold scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSpread {
    pub rmse: f64,
    pub mae: f64,
}

impl ScoreSpread {
    pub fn from_folds(folds: &[FoldScore], aggregate: &AggregateScore) -> Self {
        Self {
            rmse: std_dev(folds.iter().map(|f| f.rmse), aggregate.rmse),
            mae: std_dev(folds.iter().map(|f| f.mae), aggregate.mae),
        }
    }
}

pub fn rmse(errors: &[f64]) -> f64 {
    mean(errors.iter().map(|e| e * e)).sqrt()
}

pub fn mae(errors: &[f64]) -> f64 {
    mean(errors.iter().map(|e| e.abs()))
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

fn std_dev(values: impl Iterator<Item = f64>, mean_value: f64) -> f64 {
    mean(values.map(|v| (v - mean_value).powi(2))).sqrt()
}
