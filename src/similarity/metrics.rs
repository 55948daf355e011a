use std::cmp::Ordering;

use super::types::Metric;
use crate::dataset::Entry;

const MIN_PEARSON_PAIRS: usize = 2;
const VARIANCE_EPSILON: f64 = 1e-12;

/// Similarity of two sorted rating lists over their co-rated positions
///
/// Returns `None` when the metric is undefined for the pair.
pub fn similarity(metric: Metric, a: &[Entry], b: &[Entry]) -> Option<f64> {
    let value = match metric {
        Metric::Cosine => cosine(a, b),
        Metric::Msd => msd(a, b),
        Metric::Pearson => pearson(a, b),
    }?;

    let (lo, hi) = metric.range();
    Some(value.clamp(lo, hi))
}

pub fn cosine(a: &[Entry], b: &[Entry]) -> Option<f64> {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    let mut pairs = 0;

    for_each_co_rated(a, b, |x, y| {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
        pairs += 1;
    });

    if pairs == 0 || norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

pub fn msd(a: &[Entry], b: &[Entry]) -> Option<f64> {
    let mut sum_sq_diff = 0.0;
    let mut pairs = 0;

    for_each_co_rated(a, b, |x, y| {
        sum_sq_diff += (x - y).powi(2);
        pairs += 1;
    });

    if pairs == 0 {
        return None;
    }

    let mean_sq_diff = sum_sq_diff / pairs as f64;
    Some(1.0 / (1.0 + mean_sq_diff))
}

pub fn pearson(a: &[Entry], b: &[Entry]) -> Option<f64> {
    let (pairs, mean_a, mean_b) = co_rated_means(a, b);
    if pairs < MIN_PEARSON_PAIRS {
        return None;
    }

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;

    for_each_co_rated(a, b, |x, y| {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    });

    if var_a <= VARIANCE_EPSILON || var_b <= VARIANCE_EPSILON {
        return None;
    }

    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}

fn co_rated_means(a: &[Entry], b: &[Entry]) -> (usize, f64, f64) {
    let mut sum_a = 0.0;
    let mut sum_b = 0.0;
    let mut pairs = 0;

    for_each_co_rated(a, b, |x, y| {
        sum_a += x;
        sum_b += y;
        pairs += 1;
    });

    if pairs == 0 {
        return (0, 0.0, 0.0);
    }

    (pairs, sum_a / pairs as f64, sum_b / pairs as f64)
}

/// Merge-walks two lists sorted by opposite-axis index
fn for_each_co_rated<F: FnMut(f64, f64)>(a: &[Entry], b: &[Entry], mut f: F) {
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                f(a[i].1, b[j].1);
                i += 1;
                j += 1;
            }
        }
    }
}
