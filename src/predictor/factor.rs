use log::debug;
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};

use super::traits::{Fit, Predict};
use crate::config::settings::FactorSettings;
use crate::dataset::{ItemIndex, Rating, RatingDataset, RatingValue, UserIndex};
use crate::errors::{EvalError, EvalResult};

/// Unbiased matrix factorization trained with stochastic gradient descent
#[derive(Debug, Clone)]
pub struct FactorPredictor {
    settings: FactorSettings,
    init: Normal<f64>,
}

impl FactorPredictor {
    pub fn new(settings: FactorSettings) -> EvalResult<Self> {
        validate(&settings)?;

        let init = Normal::new(settings.init_mean, settings.init_std)
            .map_err(|e| EvalError::invalid_config(format!("factor initialisation: {}", e)))?;

        Ok(Self { settings, init })
    }

    pub fn settings(&self) -> &FactorSettings {
        &self.settings
    }
}

fn validate(settings: &FactorSettings) -> EvalResult<()> {
    if settings.factors == 0 {
        return Err(EvalError::invalid_config("factor count must be positive"));
    }
    if settings.epochs == 0 {
        return Err(EvalError::invalid_config("epoch count must be positive"));
    }
    if !(0.0..=1.0).contains(&settings.learning_rate) {
        return Err(EvalError::invalid_config(format!(
            "learning rate {} outside [0, 1]",
            settings.learning_rate
        )));
    }
    if !settings.regularization.is_finite() || settings.regularization < 0.0 {
        return Err(EvalError::invalid_config(format!(
            "regularization {} must be a non-negative number",
            settings.regularization
        )));
    }
    if !settings.init_mean.is_finite() || !settings.init_std.is_finite() || settings.init_std < 0.0 {
        return Err(EvalError::invalid_config(
            "factor initialisation needs a finite mean and non-negative deviation",
        ));
    }
    Ok(())
}

/// User (U x F) and item (I x F) factor matrices
#[derive(Debug, Clone, PartialEq)]
pub struct LatentFactors {
    pub users: Array2<f64>,
    pub items: Array2<f64>,
}

impl LatentFactors {
    fn sample(n_users: usize, n_items: usize, factors: usize, init: &Normal<f64>, rng: &mut StdRng) -> Self {
        let users = Array2::from_shape_fn((n_users, factors), |_| init.sample(&mut *rng));
        let items = Array2::from_shape_fn((n_items, factors), |_| init.sample(&mut *rng));
        Self { users, items }
    }

    pub fn dot(&self, user: UserIndex, item: ItemIndex) -> f64 {
        self.users.row(user).dot(&self.items.row(item))
    }

    /// One SGD step on a single observation, returns the pre-update error
    fn step(&mut self, rating: &Rating, learning_rate: f64, regularization: f64) -> f64 {
        let err = rating.value - self.dot(rating.user, rating.item);

        for f in 0..self.users.ncols() {
            let puf = self.users[[rating.user, f]];
            let qif = self.items[[rating.item, f]];
            self.users[[rating.user, f]] += learning_rate * (err * qif - regularization * puf);
            self.items[[rating.item, f]] += learning_rate * (err * puf - regularization * qif);
        }

        err
    }
}

impl Fit for FactorPredictor {
    type Model = FactorModel;

    fn fit(self, train: &RatingDataset) -> FactorModel {
        let s = &self.settings;
        debug!(
            "Fitting {}-factor model on {} ratings ({} epochs, lr={}, reg={})",
            s.factors,
            train.len(),
            s.epochs,
            s.learning_rate,
            s.regularization
        );

        let mut rng = StdRng::seed_from_u64(s.seed);
        let mut factors =
            LatentFactors::sample(train.n_users(), train.n_items(), s.factors, &self.init, &mut rng);

        run_epochs(&mut factors, train.ratings(), s, &mut rng);

        FactorModel {
            factors,
            user_seen: seen_mask(train.n_users(), train.ratings().iter().map(|r| r.user)),
            item_seen: seen_mask(train.n_items(), train.ratings().iter().map(|r| r.item)),
            global_mean: train.global_mean().unwrap_or_default(),
        }
    }
}

fn run_epochs(factors: &mut LatentFactors, ratings: &[Rating], settings: &FactorSettings, rng: &mut StdRng) {
    let mut order: Vec<usize> = (0..ratings.len()).collect();

    for epoch in 0..settings.epochs {
        order.shuffle(rng);

        let sum_sq_err: f64 = order
            .iter()
            .map(|&pos| {
                factors
                    .step(&ratings[pos], settings.learning_rate, settings.regularization)
                    .powi(2)
            })
            .sum();

        if !ratings.is_empty() {
            debug!(
                "  epoch {}/{}: train RMSE {:.4}",
                epoch + 1,
                settings.epochs,
                (sum_sq_err / ratings.len() as f64).sqrt()
            );
        }
    }
}

fn seen_mask(len: usize, indices: impl Iterator<Item = usize>) -> Vec<bool> {
    let mut seen = vec![false; len];
    for idx in indices {
        seen[idx] = true;
    }
    seen
}

#[derive(Debug, Clone)]
pub struct FactorModel {
    factors: LatentFactors,
    user_seen: Vec<bool>,
    item_seen: Vec<bool>,
    global_mean: RatingValue,
}

impl FactorModel {
    pub fn factors(&self) -> &LatentFactors {
        &self.factors
    }

    fn is_known(&self, user: UserIndex, item: ItemIndex) -> bool {
        self.user_seen.get(user).copied().unwrap_or(false)
            && self.item_seen.get(item).copied().unwrap_or(false)
    }
}

impl Predict for FactorModel {
    fn predict(&self, user: UserIndex, item: ItemIndex) -> RatingValue {
        if self.is_known(user, item) {
            self.factors.dot(user, item)
        } else {
            self.global_mean
        }
    }

    fn global_mean(&self) -> RatingValue {
        self.global_mean
    }
}
