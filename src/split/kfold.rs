use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::fold::Fold;
use crate::dataset::RatingDataset;
use crate::errors::{EvalError, EvalResult};

const MIN_FOLDS: usize = 2;

/// Splits the rating positions into `k` shuffled, nearly equal test blocks
pub fn k_fold(dataset: &RatingDataset, k: usize, seed: u64) -> EvalResult<Vec<Fold>> {
    validate_fold_count(k, dataset.len())?;

    let order = shuffled_positions(dataset.len(), seed);
    let bounds = block_bounds(order.len(), k);

    Ok(bounds
        .iter()
        .map(|&(start, end)| build_fold(&order, start, end))
        .collect())
}

pub fn validate_fold_count(k: usize, ratings: usize) -> EvalResult<()> {
    if k < MIN_FOLDS || k > ratings {
        return Err(EvalError::InvalidFoldCount { folds: k, ratings });
    }
    Ok(())
}

fn shuffled_positions(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut rng);
    order
}

/// Contiguous [start, end) blocks; the first `n % k` blocks hold one extra position
fn block_bounds(n: usize, k: usize) -> Vec<(usize, usize)> {
    let base = n / k;
    let extra = n % k;
    let mut bounds = Vec::with_capacity(k);
    let mut start = 0;

    for block in 0..k {
        let size = base + usize::from(block < extra);
        bounds.push((start, start + size));
        start += size;
    }

    bounds
}

fn build_fold(order: &[usize], start: usize, end: usize) -> Fold {
    let test = order[start..end].to_vec();
    let train = order[..start]
        .iter()
        .chain(&order[end..])
        .copied()
        .collect();

    Fold { train, test }
}
