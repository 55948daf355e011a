mod index;
pub mod loader;
mod store;
pub mod types;

pub use index::{Entry, RatingIndex, lookup};
pub use loader::{load_ratings_file, parse_ratings};
pub use store::RatingDataset;
pub use types::{IdMap, ItemIndex, Rating, RatingValue, RawRating, UserIndex};
