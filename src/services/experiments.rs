use anyhow::{Context, Result};
use log::info;

use crate::config::settings::AppConfig;
use crate::dataset::RatingDataset;
use crate::evaluation::cross_validate;
use crate::predictor::{Algorithm, NeighborhoodPredictor};
use crate::report::{LabeledScore, Report, SweepSeries};
use crate::similarity::{Axis, Metric};
use crate::sweep::{CancellationToken, sweep_until_cancelled};

const AXES: [Axis; 2] = [Axis::User, Axis::Item];

/// Runs the evaluation experiments over one loaded dataset
pub struct ExperimentService {
    config: AppConfig,
    dataset: RatingDataset,
    cancel: CancellationToken,
}

impl ExperimentService {
    pub fn new(config: AppConfig, dataset: RatingDataset) -> Self {
        Self {
            config,
            dataset,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops a running sweep before its next value
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// PMF against user- and item-based CF with the configured similarity
    pub fn compare_algorithms(&self) -> Result<Report> {
        info!("=== Comparing algorithms ({}-fold CV) ===", self.config.evaluation.folds);

        let algorithms = [
            ("PMF", Algorithm::Factor(self.config.factor.clone())),
            ("UserCF", Algorithm::Knn(self.config.knn.with_axis(Axis::User))),
            ("ItemCF", Algorithm::Knn(self.config.knn.with_axis(Axis::Item))),
        ];

        let mut report = Report::new("compare");
        for (label, algorithm) in &algorithms {
            let score = self.score(label, algorithm)?;
            info!(
                "{} Results: Average MAE {:.4}, Average RMSE {:.4}",
                label, score.score.mae, score.score.rmse
            );
            report.scores.push(score);
        }

        info!("=== Comparison Complete ===");
        Ok(report)
    }

    /// Every similarity metric on both axes
    pub fn compare_similarities(&self) -> Result<Report> {
        info!("=== Comparing similarity measures ===");

        let mut report = Report::new("similarities");
        for metric in Metric::ALL {
            for axis in AXES {
                let label = format!("{} CF ({})", axis.label(), metric);
                let settings = self.config.knn.with_metric(metric).with_axis(axis);
                let score = self.score(&label, &Algorithm::Knn(settings))?;

                info!(
                    "{}: Avg RMSE {:.3}, Avg MAE {:.3}",
                    label, score.score.rmse, score.score.mae
                );
                report.scores.push(score);
            }
        }

        info!("=== Similarity Comparison Complete ===");
        Ok(report)
    }

    /// Neighborhood size sweep for user- and item-based CF
    pub fn sweep_neighborhood_sizes(&self) -> Result<Report> {
        let sizes = &self.config.sweep.neighborhood_sizes;
        info!("=== Sweeping neighborhood sizes {:?} ===", sizes);

        let mut report = Report::new("sweep");
        for axis in AXES {
            let base = self.config.knn.with_axis(axis);
            let outcome = sweep_until_cancelled(
                |k: &usize| NeighborhoodPredictor::new(base.with_k(*k)),
                sizes,
                &self.dataset,
                &self.config.evaluation,
                &self.cancel,
            )
            .with_context(|| format!("{} neighborhood sweep failed", axis.label()))?;

            report.series.push(SweepSeries {
                label: format!("{} CF", axis.label()),
                parameter: "neighbors".to_string(),
                points: outcome.points,
            });

            if outcome.cancelled {
                info!("Sweep cancelled, returning partial results");
                break;
            }
        }

        info!("=== Sweep Complete ===");
        Ok(report)
    }

    fn score(&self, label: &str, algorithm: &Algorithm) -> Result<LabeledScore> {
        info!("Evaluating {}: {}", label, algorithm.describe());

        let cv = cross_validate(algorithm.factory(), &self.dataset, &self.config.evaluation)
            .with_context(|| format!("Cross-validation of {} failed", label))?;

        Ok(LabeledScore::from_cross_validation(label, &cv))
    }
}
