use std::time::Instant;

use log::info;
use rayon::prelude::*;
use serde::Serialize;

use super::scores::{AggregateScore, FoldScore, ScoreSpread};
use crate::config::settings::EvaluationSettings;
use crate::dataset::{Rating, RatingDataset, RatingValue};
use crate::errors::EvalResult;
use crate::predictor::{Fit, Predict};
use crate::split::{Fold, k_fold, validate_fold_count};

/// Outcome of a single fold
#[derive(Debug, Clone, Serialize)]
pub struct FoldReport {
    pub fold: usize,
    pub score: FoldScore,
    pub train_size: usize,
    pub test_size: usize,
    pub fit_secs: f64,
    pub test_secs: f64,
}

/// Full cross-validation result: per-fold detail plus the aggregate
#[derive(Debug, Clone, Serialize)]
pub struct CrossValidation {
    pub folds: Vec<FoldReport>,
    pub aggregate: AggregateScore,
    pub spread: ScoreSpread,
}

impl CrossValidation {
    pub fn fold_scores(&self) -> Vec<FoldScore> {
        self.folds.iter().map(|f| f.score).collect()
    }
}

/// Mean RMSE/MAE over `k` folds, each fold fitted with a fresh predictor
pub fn evaluate<F, P>(factory: F, dataset: &RatingDataset, k: usize, seed: u64) -> EvalResult<AggregateScore>
where
    F: Fn() -> EvalResult<P> + Sync,
    P: Fit,
{
    let settings = EvaluationSettings {
        folds: k,
        seed,
        clip_predictions: false,
    };
    cross_validate(factory, dataset, &settings).map(|cv| cv.aggregate)
}

/// k-fold cross-validation with per-fold reports
///
/// Folds run on the rayon pool and are collected in fold order, so results
/// do not depend on scheduling.
pub fn cross_validate<F, P>(
    factory: F,
    dataset: &RatingDataset,
    settings: &EvaluationSettings,
) -> EvalResult<CrossValidation>
where
    F: Fn() -> EvalResult<P> + Sync,
    P: Fit,
{
    validate_fold_count(settings.folds, dataset.len())?;
    let folds = k_fold(dataset, settings.folds, settings.seed)?;

    let reports = folds
        .par_iter()
        .enumerate()
        .map(|(idx, fold)| run_fold(&factory, dataset, fold, idx, settings.clip_predictions))
        .collect::<EvalResult<Vec<FoldReport>>>()?;

    for report in &reports {
        log_fold(report);
    }

    let scores: Vec<FoldScore> = reports.iter().map(|r| r.score).collect();
    let aggregate = AggregateScore::from_folds(&scores);
    let spread = ScoreSpread::from_folds(&scores, &aggregate);

    info!(
        "  Mean over {} folds: RMSE {:.4} (±{:.4}), MAE {:.4} (±{:.4})",
        reports.len(),
        aggregate.rmse,
        spread.rmse,
        aggregate.mae,
        spread.mae
    );

    Ok(CrossValidation {
        folds: reports,
        aggregate,
        spread,
    })
}

fn run_fold<F, P>(factory: &F, dataset: &RatingDataset, fold: &Fold, idx: usize, clip: bool) -> EvalResult<FoldReport>
where
    F: Fn() -> EvalResult<P>,
    P: Fit,
{
    let train = fold.train_set(dataset);
    let test = fold.test_set(dataset);
    let scale = if clip { train.rating_scale() } else { None };

    let fit_start = Instant::now();
    let model = factory()?.fit(&train);
    let fit_secs = fit_start.elapsed().as_secs_f64();

    let test_start = Instant::now();
    let errors = prediction_errors(&model, test.ratings(), scale);
    let test_secs = test_start.elapsed().as_secs_f64();

    Ok(FoldReport {
        fold: idx + 1,
        score: FoldScore::from_errors(&errors),
        train_size: train.len(),
        test_size: test.len(),
        fit_secs,
        test_secs,
    })
}

/// predicted - actual for every test rating
fn prediction_errors<M: Predict>(
    model: &M,
    test: &[Rating],
    scale: Option<(RatingValue, RatingValue)>,
) -> Vec<f64> {
    test.iter()
        .map(|r| clip(model.predict(r.user, r.item), scale) - r.value)
        .collect()
}

fn clip(estimate: RatingValue, scale: Option<(RatingValue, RatingValue)>) -> RatingValue {
    match scale {
        Some((lo, hi)) => estimate.clamp(lo, hi),
        None => estimate,
    }
}

fn log_fold(report: &FoldReport) {
    info!(
        "  Fold {}: RMSE {:.4}, MAE {:.4} ({} train / {} test, fit {:.2}s, test {:.2}s)",
        report.fold,
        report.score.rmse,
        report.score.mae,
        report.train_size,
        report.test_size,
        report.fit_secs,
        report.test_secs
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{FactorSettings, KnnSettings};
    use crate::dataset::RawRating;
    use crate::errors::EvalError;
    use crate::predictor::{Algorithm, FactorPredictor, NeighborhoodPredictor};
    use crate::similarity::{Axis, Metric};

    fn dense_4x3() -> RatingDataset {
        let grid = [[5.0, 3.0, 4.0], [4.0, 3.0, 5.0], [1.0, 2.0, 1.0], [2.0, 1.0, 2.0]];
        let records = grid.iter().enumerate().flat_map(|(u, row)| {
            row.iter()
                .enumerate()
                .map(move |(i, &r)| RawRating::numeric(format!("u{}", u), format!("i{}", i), r))
        });
        RatingDataset::load(records).unwrap()
    }

    fn larger_dataset() -> RatingDataset {
        let records = (0..12).flat_map(|u| {
            (0..10)
                .filter(move |i| (u * 7 + i * 3) % 4 != 0)
                .map(move |i| {
                    let value = 1.0 + ((u * 5 + i * 2) % 9) as f64 / 2.0;
                    RawRating::numeric(format!("u{}", u), format!("i{}", i), value)
                })
        });
        RatingDataset::load(records).unwrap()
    }

    fn knn(k: usize, metric: Metric, axis: Axis) -> KnnSettings {
        KnnSettings { k, metric, axis }
    }

    #[test]
    fn test_dense_scenario_two_folds_one_neighbor() {
        let data = dense_4x3();
        let settings = knn(1, Metric::Cosine, Axis::User);
        let cv = cross_validate(
            || NeighborhoodPredictor::new(settings.clone()),
            &data,
            &EvaluationSettings {
                folds: 2,
                seed: 3,
                clip_predictions: false,
            },
        )
        .unwrap();

        assert_eq!(cv.folds.len(), 2);
        assert_eq!(cv.folds.iter().map(|f| f.test_size).sum::<usize>(), 12);
        assert!(cv.aggregate.rmse.is_finite());
        assert!(cv.aggregate.rmse >= cv.aggregate.mae);
        assert!(cv.aggregate.mae >= 0.0);
    }

    #[test]
    fn test_dense_scenario_predictions_by_hand() {
        // Train on everything except u0's rating of i2
        let data = dense_4x3();
        let train = data.subset(&(0..12).filter(|&p| p != 2).collect::<Vec<_>>());
        let model = NeighborhoodPredictor::new(knn(1, Metric::Cosine, Axis::User))
            .unwrap()
            .fit(&train);

        // co-rated on i0,i1: cos(u0,u1) = (20+9)/(sqrt(34)*5) ≈ 0.9948,
        // cos(u0,u2) = (5+6)/(sqrt(34)*sqrt(5)) ≈ 0.8437,
        // cos(u0,u3) = (10+3)/(sqrt(34)*sqrt(5)) ≈ 0.9971 -> u3 is the single neighbor
        assert_eq!(model.predict(0, 2), 2.0);

        // every user rated i0 in training, so predicting i0 for u0 uses its best neighbor too
        let estimate = model.predict_details(0, 0);
        assert_eq!(estimate.neighbors, 1);
    }

    #[test]
    fn test_rmse_at_least_mae_for_every_fold() {
        let data = larger_dataset();
        let algorithm = Algorithm::Knn(knn(5, Metric::Msd, Axis::Item));
        let cv = cross_validate(
            algorithm.factory(),
            &data,
            &EvaluationSettings {
                folds: 4,
                seed: 1,
                clip_predictions: false,
            },
        )
        .unwrap();

        for fold in &cv.folds {
            assert!(fold.score.rmse >= fold.score.mae);
            assert!(fold.score.mae >= 0.0);
        }
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let data = larger_dataset();
        let factor = FactorSettings {
            factors: 4,
            epochs: 10,
            seed: 5,
            ..FactorSettings::default()
        };

        let first = evaluate(|| FactorPredictor::new(factor.clone()), &data, 3, 17).unwrap();
        let second = evaluate(|| FactorPredictor::new(factor.clone()), &data, 3, 17).unwrap();
        assert_eq!(first.rmse.to_bits(), second.rmse.to_bits());
        assert_eq!(first.mae.to_bits(), second.mae.to_bits());

        let knn_settings = knn(3, Metric::Pearson, Axis::User);
        let a = evaluate(|| NeighborhoodPredictor::new(knn_settings.clone()), &data, 5, 2).unwrap();
        let b = evaluate(|| NeighborhoodPredictor::new(knn_settings.clone()), &data, 5, 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_fold_count_is_reported_before_fitting() {
        let data = dense_4x3();
        let err = evaluate(
            || -> EvalResult<NeighborhoodPredictor> { panic!("factory must not run") },
            &data,
            13,
            0,
        )
        .unwrap_err();

        assert_eq!(err, EvalError::InvalidFoldCount { folds: 13, ratings: 12 });
    }

    #[test]
    fn test_invalid_configuration_propagates() {
        let data = dense_4x3();
        let err = evaluate(|| NeighborhoodPredictor::new(knn(0, Metric::Msd, Axis::User)), &data, 2, 0)
            .unwrap_err();

        assert!(matches!(err, EvalError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_clipping_never_increases_error() {
        let data = larger_dataset();
        let factor = Algorithm::Factor(FactorSettings {
            factors: 2,
            epochs: 1,
            learning_rate: 0.0,
            ..FactorSettings::default()
        });
        let base = EvaluationSettings {
            folds: 3,
            seed: 8,
            clip_predictions: false,
        };
        let clipped = EvaluationSettings {
            clip_predictions: true,
            ..base.clone()
        };

        let raw = cross_validate(factor.factory(), &data, &base).unwrap();
        let bounded = cross_validate(factor.factory(), &data, &clipped).unwrap();
        assert!(bounded.aggregate.mae <= raw.aggregate.mae);
    }
}
