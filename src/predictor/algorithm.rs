use super::factor::{FactorModel, FactorPredictor};
use super::knn::{NeighborhoodModel, NeighborhoodPredictor};
use super::traits::{Fit, Predict};
use crate::config::settings::{FactorSettings, KnnSettings};
use crate::dataset::{ItemIndex, RatingDataset, RatingValue, UserIndex};
use crate::errors::EvalResult;

/// Immutable description of a predictor, buildable once per fold
#[derive(Debug, Clone, PartialEq)]
pub enum Algorithm {
    Knn(KnnSettings),
    Factor(FactorSettings),
}

impl Algorithm {
    /// Fresh, validated, unfitted predictor
    pub fn build(&self) -> EvalResult<AnyPredictor> {
        match self {
            Algorithm::Knn(settings) => {
                NeighborhoodPredictor::new(settings.clone()).map(AnyPredictor::Knn)
            }
            Algorithm::Factor(settings) => {
                FactorPredictor::new(settings.clone()).map(AnyPredictor::Factor)
            }
        }
    }

    /// Factory closure suitable for the evaluator
    pub fn factory(&self) -> impl Fn() -> EvalResult<AnyPredictor> + Sync + '_ {
        move || self.build()
    }

    pub fn describe(&self) -> String {
        match self {
            Algorithm::Knn(s) => format!("{} KNN (k={}, {})", s.axis.label(), s.k, s.metric),
            Algorithm::Factor(s) => format!(
                "PMF (factors={}, epochs={}, lr={}, reg={})",
                s.factors, s.epochs, s.learning_rate, s.regularization
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AnyPredictor {
    Knn(NeighborhoodPredictor),
    Factor(FactorPredictor),
}

impl Fit for AnyPredictor {
    type Model = AnyModel;

    fn fit(self, train: &RatingDataset) -> AnyModel {
        match self {
            AnyPredictor::Knn(p) => AnyModel::Knn(p.fit(train)),
            AnyPredictor::Factor(p) => AnyModel::Factor(p.fit(train)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AnyModel {
    Knn(NeighborhoodModel),
    Factor(FactorModel),
}

impl Predict for AnyModel {
    fn predict(&self, user: UserIndex, item: ItemIndex) -> RatingValue {
        match self {
            AnyModel::Knn(m) => m.predict(user, item),
            AnyModel::Factor(m) => m.predict(user, item),
        }
    }

    fn global_mean(&self) -> RatingValue {
        match self {
            AnyModel::Knn(m) => m.global_mean(),
            AnyModel::Factor(m) => m.global_mean(),
        }
    }
}
