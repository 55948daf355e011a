mod cancel;
mod runner;

pub use cancel::CancellationToken;
pub use runner::{SweepOutcome, SweepPoint, sweep, sweep_until_cancelled};
