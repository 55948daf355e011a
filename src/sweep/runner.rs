use std::fmt::Display;

use log::{info, warn};
use serde::Serialize;

use super::cancel::CancellationToken;
use crate::config::settings::EvaluationSettings;
use crate::dataset::RatingDataset;
use crate::errors::EvalResult;
use crate::evaluation::{AggregateScore, cross_validate};
use crate::predictor::Fit;

/// Score obtained for one parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepPoint<V> {
    pub value: V,
    pub score: AggregateScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepOutcome<V> {
    pub points: Vec<SweepPoint<V>>,
    pub cancelled: bool,
}

/// One cross-validation per parameter value, in input order
///
/// `template` turns a parameter value into a fresh predictor; it is called
/// once per fold.
pub fn sweep<V, T, P>(
    template: T,
    values: &[V],
    dataset: &RatingDataset,
    k: usize,
    seed: u64,
) -> EvalResult<Vec<SweepPoint<V>>>
where
    V: Clone + Display + Sync,
    T: Fn(&V) -> EvalResult<P> + Sync,
    P: Fit,
{
    let settings = EvaluationSettings {
        folds: k,
        seed,
        clip_predictions: false,
    };
    let outcome = sweep_until_cancelled(template, values, dataset, &settings, &CancellationToken::new())?;
    Ok(outcome.points)
}

/// Like [`sweep`], checking `token` before each parameter value
///
/// A cancelled sweep keeps the points already computed; a value whose
/// evaluation has started always runs to completion.
pub fn sweep_until_cancelled<V, T, P>(
    template: T,
    values: &[V],
    dataset: &RatingDataset,
    settings: &EvaluationSettings,
    token: &CancellationToken,
) -> EvalResult<SweepOutcome<V>>
where
    V: Clone + Display + Sync,
    T: Fn(&V) -> EvalResult<P> + Sync,
    P: Fit,
{
    let mut points = Vec::with_capacity(values.len());

    for (idx, value) in values.iter().enumerate() {
        if token.is_cancelled() {
            warn!("Sweep cancelled after {}/{} values", idx, values.len());
            return Ok(SweepOutcome {
                points,
                cancelled: true,
            });
        }

        info!("Sweep value {} ({}/{})", value, idx + 1, values.len());
        let cv = cross_validate(|| template(value), dataset, settings)?;

        points.push(SweepPoint {
            value: value.clone(),
            score: cv.aggregate,
        });
    }

    Ok(SweepOutcome {
        points,
        cancelled: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::KnnSettings;
    use crate::dataset::RawRating;
    use crate::evaluation::evaluate;
    use crate::predictor::NeighborhoodPredictor;
    use crate::similarity::{Axis, Metric};

    fn dataset() -> RatingDataset {
        let records = (0..15).flat_map(|u| {
            (0..8)
                .filter(move |i| (u + i) % 3 != 0)
                .map(move |i| {
                    let value = 1.0 + ((u * 3 + i * 5) % 5) as f64;
                    RawRating::numeric(format!("u{}", u), format!("i{}", i), value)
                })
        });
        RatingDataset::load(records).unwrap()
    }

    fn template(k: &usize) -> EvalResult<NeighborhoodPredictor> {
        NeighborhoodPredictor::new(KnnSettings {
            k: *k,
            metric: Metric::Cosine,
            axis: Axis::User,
        })
    }

    #[test]
    fn test_sweep_preserves_order_and_matches_evaluate() {
        let data = dataset();
        let values = [5, 10, 20];

        let points = sweep(template, &values, &data, 3, 4).unwrap();

        assert_eq!(points.len(), 3);
        for (point, value) in points.iter().zip(values) {
            assert_eq!(point.value, value);
            let standalone = evaluate(|| template(&value), &data, 3, 4).unwrap();
            assert_eq!(point.score, standalone);
        }
    }

    #[test]
    fn test_cancelled_sweep_stops_between_values() {
        let data = dataset();
        let token = CancellationToken::new();
        let settings = EvaluationSettings {
            folds: 2,
            seed: 0,
            clip_predictions: false,
        };

        let cancelling_template = |k: &usize| {
            if *k == 2 {
                token.cancel();
            }
            template(k)
        };

        let outcome =
            sweep_until_cancelled(cancelling_template, &[1, 2, 3, 4], &data, &settings, &token).unwrap();

        assert!(outcome.cancelled);
        let values: Vec<usize> = outcome.points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_empty_grid() {
        let data = dataset();
        assert!(sweep(template, &[], &data, 2, 0).unwrap().is_empty());
    }
}
