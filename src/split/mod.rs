mod fold;
mod kfold;

pub use fold::Fold;
pub use kfold::{k_fold, validate_fold_count};
