use crate::similarity::{Axis, Metric};

/// Neighborhood (KNN) predictor settings
#[derive(Debug, Clone, PartialEq)]
pub struct KnnSettings {
    pub k: usize,
    pub metric: Metric,
    pub axis: Axis,
}

impl Default for KnnSettings {
    fn default() -> Self {
        Self {
            k: 40,
            metric: Metric::Msd,
            axis: Axis::User,
        }
    }
}

impl KnnSettings {
    pub fn with_k(&self, k: usize) -> Self {
        Self { k, ..self.clone() }
    }

    pub fn with_axis(&self, axis: Axis) -> Self {
        Self { axis, ..self.clone() }
    }

    pub fn with_metric(&self, metric: Metric) -> Self {
        Self { metric, ..self.clone() }
    }
}

/// Unbiased matrix factorization settings
#[derive(Debug, Clone, PartialEq)]
pub struct FactorSettings {
    pub factors: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub regularization: f64,
    pub init_mean: f64,
    pub init_std: f64,
    pub seed: u64,
}

impl Default for FactorSettings {
    fn default() -> Self {
        Self {
            factors: 100,
            epochs: 20,
            learning_rate: 0.005,
            regularization: 0.02,
            init_mean: 0.0,
            init_std: 0.1,
            seed: 0,
        }
    }
}

/// Cross-validation settings
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSettings {
    pub folds: usize,
    pub seed: u64,
    /// Clip estimates to the training rating scale before scoring
    pub clip_predictions: bool,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            folds: 5,
            seed: 0,
            clip_predictions: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepSettings {
    pub neighborhood_sizes: Vec<usize>,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            neighborhood_sizes: vec![5, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100],
        }
    }
}

/// Layout of a delimited rating file
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderSettings {
    pub separator: char,
    pub skip_lines: usize,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            separator: ',',
            skip_lines: 1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub knn: KnnSettings,
    pub factor: FactorSettings,
    pub evaluation: EvaluationSettings,
    pub sweep: SweepSettings,
    pub loader: LoaderSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
