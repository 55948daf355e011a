mod matrix;
pub mod metrics;
mod types;

pub use matrix::SimilarityMatrix;
pub use metrics::similarity;
pub use types::{Axis, Metric};
