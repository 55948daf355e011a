mod evaluator;
pub mod scores;

pub use evaluator::{CrossValidation, FoldReport, cross_validate, evaluate};
pub use scores::{AggregateScore, FoldScore, ScoreSpread, mae, rmse};
