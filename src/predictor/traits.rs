use crate::dataset::{ItemIndex, RatingDataset, RatingValue, UserIndex};

/// An unfitted, validated predictor configuration
///
/// `fit` consumes the configuration, so a model can only exist once it has
/// seen a training set and each fold necessarily gets its own instance.
pub trait Fit {
    type Model: Predict;

    fn fit(self, train: &RatingDataset) -> Self::Model;
}

/// A fitted model able to estimate ratings
pub trait Predict {
    /// Estimate for dense indices; unseen users or items yield the global mean
    fn predict(&self, user: UserIndex, item: ItemIndex) -> RatingValue;

    /// Mean rating of the training set the model was fitted on
    fn global_mean(&self) -> RatingValue;

    /// Estimate for external identifiers resolved through `dataset`'s mappings
    fn predict_ids(&self, dataset: &RatingDataset, user: &str, item: &str) -> RatingValue {
        match (dataset.user_index(user), dataset.item_index(item)) {
            (Some(u), Some(i)) => self.predict(u, i),
            _ => self.global_mean(),
        }
    }
}
