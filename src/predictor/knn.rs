use log::debug;

use super::traits::{Fit, Predict};
use crate::config::settings::KnnSettings;
use crate::dataset::{ItemIndex, RatingDataset, RatingIndex, RatingValue, UserIndex};
use crate::errors::{EvalError, EvalResult};
use crate::similarity::{Axis, SimilarityMatrix};

/// Collaborative filtering over the k most similar users or items
#[derive(Debug, Clone)]
pub struct NeighborhoodPredictor {
    settings: KnnSettings,
}

impl NeighborhoodPredictor {
    pub fn new(settings: KnnSettings) -> EvalResult<Self> {
        if settings.k == 0 {
            return Err(EvalError::invalid_config(
                "neighborhood size k must be positive",
            ));
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &KnnSettings {
        &self.settings
    }
}

impl Fit for NeighborhoodPredictor {
    type Model = NeighborhoodModel;

    fn fit(self, train: &RatingDataset) -> NeighborhoodModel {
        let axis = self.settings.axis;
        debug!(
            "Fitting {}-based KNN (k={}, {}) on {} ratings",
            axis,
            self.settings.k,
            self.settings.metric,
            train.len()
        );

        let index = RatingIndex::build(train);
        let similarities = SimilarityMatrix::compute(&index, axis, self.settings.metric);
        let averages = entity_averages(&index, axis);

        NeighborhoodModel {
            settings: self.settings,
            index,
            similarities,
            averages,
            global_mean: train.global_mean().unwrap_or_default(),
        }
    }
}

/// Which path produced an estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// User or item never seen during fit
    UnknownEntity,
    /// No usable neighbor weight; the target entity's own average was used
    EntityMean,
}

/// Estimate with the diagnostics of how it was reached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value: RatingValue,
    pub neighbors: usize,
    pub fallback: Option<Fallback>,
}

/// A neighbor candidate: (entity index, similarity to target, its rating)
type Candidate = (usize, f64, RatingValue);

#[derive(Debug, Clone)]
pub struct NeighborhoodModel {
    settings: KnnSettings,
    index: RatingIndex,
    similarities: SimilarityMatrix,
    averages: Vec<Option<RatingValue>>,
    global_mean: RatingValue,
}

impl NeighborhoodModel {
    pub fn similarities(&self) -> &SimilarityMatrix {
        &self.similarities
    }

    pub fn predict_details(&self, user: UserIndex, item: ItemIndex) -> Estimate {
        if !self.is_known(user, item) {
            return self.fallback_to_global(Fallback::UnknownEntity);
        }

        let axis = self.settings.axis;
        let (target, other) = match axis {
            Axis::User => (user, item),
            Axis::Item => (item, user),
        };

        let neighbors = self.nearest_neighbors(target, other);
        match weighted_average(&neighbors) {
            Some((value, used)) => Estimate {
                value,
                neighbors: used,
                fallback: None,
            },
            None => self.fallback_to_entity(target),
        }
    }

    /// Entities that rated `other`, ranked by similarity to `target`
    ///
    /// Ties keep ascending entity index; undefined similarities are skipped.
    fn nearest_neighbors(&self, target: usize, other: usize) -> Vec<Candidate> {
        let axis = self.settings.axis;
        let mut candidates: Vec<Candidate> = self
            .index
            .entries(axis.opposite(), other)
            .iter()
            .filter(|&&(entity, _)| entity != target)
            .filter_map(|&(entity, rating)| {
                self.similarities
                    .get(target, entity)
                    .map(|sim| (entity, sim, rating))
            })
            .collect();

        rank_candidates(&mut candidates);
        candidates.truncate(self.settings.k);
        candidates
    }

    fn is_known(&self, user: UserIndex, item: ItemIndex) -> bool {
        self.index.has_ratings(Axis::User, user) && self.index.has_ratings(Axis::Item, item)
    }

    /// Only reached for known targets, which always have an average
    fn fallback_to_entity(&self, target: usize) -> Estimate {
        let value = self
            .averages
            .get(target)
            .copied()
            .flatten()
            .unwrap_or(self.global_mean);

        Estimate {
            value,
            neighbors: 0,
            fallback: Some(Fallback::EntityMean),
        }
    }

    fn fallback_to_global(&self, reason: Fallback) -> Estimate {
        Estimate {
            value: self.global_mean,
            neighbors: 0,
            fallback: Some(reason),
        }
    }
}

impl Predict for NeighborhoodModel {
    fn predict(&self, user: UserIndex, item: ItemIndex) -> RatingValue {
        self.predict_details(user, item).value
    }

    fn global_mean(&self) -> RatingValue {
        self.global_mean
    }
}

fn entity_averages(index: &RatingIndex, axis: Axis) -> Vec<Option<RatingValue>> {
    (0..index.rows(axis).len())
        .map(|entity| index.mean(axis, entity))
        .collect()
}

/// Similarity descending, then entity index ascending
fn rank_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
}

/// Similarity-weighted mean over positively similar neighbors
///
/// Returns the estimate and the number of contributing neighbors, or `None`
/// when the total weight is zero.
fn weighted_average(neighbors: &[Candidate]) -> Option<(RatingValue, usize)> {
    let mut weight_sum = 0.0;
    let mut weighted_ratings = 0.0;
    let mut used = 0;

    for &(_, sim, rating) in neighbors.iter().filter(|n| n.1 > 0.0) {
        weight_sum += sim;
        weighted_ratings += sim * rating;
        used += 1;
    }

    if weight_sum > 0.0 {
        Some((weighted_ratings / weight_sum, used))
    } else {
        None
    }
}
