use log::debug;
use ndarray::Array2;
use rayon::prelude::*;

use super::metrics::similarity;
use super::types::{Axis, Metric};
use crate::dataset::{Entry, RatingIndex};

const UNDEFINED: f64 = f64::NAN;
const SELF_SIMILARITY: f64 = 1.0;

/// Dense symmetric similarity matrix over the dense indices of one axis
///
/// Pairs without a defined similarity hold a NaN sentinel internally and are
/// reported as `None`.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    values: Array2<f64>,
    axis: Axis,
    metric: Metric,
}

impl SimilarityMatrix {
    /// Computes all pairwise similarities for the entities of `axis`
    pub fn compute(index: &RatingIndex, axis: Axis, metric: Metric) -> Self {
        let rows = index.rows(axis);
        let n = rows.len();
        debug!("Computing {}x{} {} similarity matrix ({}-based)", n, n, metric, axis);

        let mut values = compute_upper_triangle(rows, metric);
        mirror_upper_triangle(&mut values);

        Self {
            values,
            axis,
            metric,
        }
    }

    pub fn get(&self, a: usize, b: usize) -> Option<f64> {
        self.values
            .get((a, b))
            .copied()
            .filter(|value| !value.is_nan())
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Number of off-diagonal pairs (a < b) with a defined similarity
    pub fn defined_pairs(&self) -> usize {
        let n = self.len();
        (0..n)
            .map(|a| ((a + 1)..n).filter(|&b| self.get(a, b).is_some()).count())
            .sum()
    }
}

/// Fills the diagonal and the entries above it, one row per rayon task
fn compute_upper_triangle(rows: &[Vec<Entry>], metric: Metric) -> Array2<f64> {
    let n = rows.len();
    let mut values = Array2::from_elem((n, n), UNDEFINED);

    values
        .axis_iter_mut(ndarray::Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(a, mut row)| {
            if !rows[a].is_empty() {
                row[a] = SELF_SIMILARITY;
            }
            for b in (a + 1)..n {
                row[b] = pair_value(&rows[a], &rows[b], metric);
            }
        });

    values
}

fn pair_value(a: &[Entry], b: &[Entry], metric: Metric) -> f64 {
    if a.is_empty() || b.is_empty() {
        return UNDEFINED;
    }
    similarity(metric, a, b).unwrap_or(UNDEFINED)
}

/// Copies the upper triangle into the lower one in place
fn mirror_upper_triangle(values: &mut Array2<f64>) {
    let n = values.nrows();
    for a in 0..n {
        for b in (a + 1)..n {
            values[[b, a]] = values[[a, b]];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{RatingDataset, RawRating};

    fn dense_dataset() -> RatingDataset {
        let grid = [[5.0, 3.0, 4.0], [4.0, 2.0, 5.0], [1.0, 5.0, 2.0], [3.0, 3.0, 1.0]];
        let records = grid.iter().enumerate().flat_map(|(u, row)| {
            row.iter()
                .enumerate()
                .map(move |(i, &r)| RawRating::numeric(format!("u{}", u), format!("i{}", i), r))
        });
        RatingDataset::load(records).unwrap()
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let index = RatingIndex::build(&dense_dataset());

        for axis in [Axis::User, Axis::Item] {
            for metric in Metric::ALL {
                let matrix = SimilarityMatrix::compute(&index, axis, metric);
                for a in 0..matrix.len() {
                    assert_eq!(matrix.get(a, a), Some(1.0));
                    for b in 0..matrix.len() {
                        assert_eq!(matrix.get(a, b), matrix.get(b, a));
                        if let Some(v) = matrix.get(a, b) {
                            let (lo, hi) = metric.range();
                            assert!(v >= lo && v <= hi);
                            assert!(v <= matrix.get(a, a).unwrap());
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_matrix_matches_pairwise_similarity() {
        let records = (0..30).flat_map(|u| {
            (0..12)
                .filter(move |i| (u * 7 + i * 3) % 5 != 0)
                .map(move |i| {
                    let value = 1.0 + ((u + i * 2) % 5) as f64;
                    RawRating::numeric(format!("u{}", u), format!("i{}", i), value)
                })
        });
        let index = RatingIndex::build(&RatingDataset::load(records).unwrap());

        for axis in [Axis::User, Axis::Item] {
            let matrix = SimilarityMatrix::compute(&index, axis, Metric::Pearson);
            let rows = index.rows(axis);
            assert_eq!(matrix.len(), rows.len());

            for a in 0..rows.len() {
                for b in 0..rows.len() {
                    if a == b {
                        continue;
                    }
                    let expected = similarity(Metric::Pearson, &rows[a], &rows[b]);
                    assert_eq!(matrix.get(a, b), expected);
                }
            }
        }
    }

    #[test]
    fn test_entities_without_overlap_are_undefined() {
        let data = RatingDataset::load(vec![
            RawRating::numeric("u0", "i0", 4.0),
            RawRating::numeric("u1", "i1", 2.0),
            RawRating::numeric("u2", "i1", 3.0),
        ])
        .unwrap();
        let index = RatingIndex::build(&data);
        let matrix = SimilarityMatrix::compute(&index, Axis::User, Metric::Cosine);

        assert_eq!(matrix.get(0, 1), None);
        assert_eq!(matrix.get(1, 2), Some(1.0));
        assert_eq!(matrix.defined_pairs(), 1);
        assert_eq!(matrix.get(0, 9), None);
    }

    #[test]
    fn test_unrated_entity_has_undefined_diagonal() {
        let data = RatingDataset::load(vec![
            RawRating::numeric("u0", "i0", 4.0),
            RawRating::numeric("u1", "i1", 2.0),
        ])
        .unwrap();
        let index = RatingIndex::build(&data.subset(&[0]));
        let matrix = SimilarityMatrix::compute(&index, Axis::User, Metric::Msd);

        assert_eq!(matrix.get(0, 0), Some(1.0));
        assert_eq!(matrix.get(1, 1), None);
    }
}
