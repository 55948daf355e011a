pub mod algorithm;
pub mod factor;
pub mod knn;
mod traits;

pub use algorithm::{Algorithm, AnyModel, AnyPredictor};
pub use factor::{FactorModel, FactorPredictor, LatentFactors};
pub use knn::{Estimate, Fallback, NeighborhoodModel, NeighborhoodPredictor};
pub use traits::{Fit, Predict};
