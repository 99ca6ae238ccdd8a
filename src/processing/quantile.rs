//! Population-wide ranking and quantile bucketing.
//!
//! Both operations need the whole column up front: a single value's bucket depends on every
//! other value in the population.

use std::cmp::Ordering;

/// Number of buckets used for RFM scoring.
pub const QUINTILES: usize = 5;

/// Returned when a column cannot be split into the requested number of non-empty buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegeneratePartition {
    /// Number of distinct values in the column.
    pub distinct: usize,
}

/// Ranks values `1..=n` in ascending order; ties get sequential ranks in order of appearance.
///
/// ```rust
/// use rfm_segmentation::processing::rank_first;
///
/// assert_eq!(rank_first(&[3.0, 1.0, 3.0, 2.0]), vec![3.0, 1.0, 4.0, 2.0]);
/// ```
pub fn rank_first(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    // Stable sort keeps original order among equal values.
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    for (pos, idx) in order.into_iter().enumerate() {
        ranks[idx] = (pos + 1) as f64;
    }
    ranks
}

/// Computes `buckets + 1` bucket edges at evenly spaced quantiles, interpolating linearly
/// between the two nearest sorted values.
///
/// Returns an empty vector for empty input.
pub fn quantile_edges(values: &[f64], buckets: usize) -> Vec<f64> {
    if values.is_empty() || buckets == 0 {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let last = (sorted.len() - 1) as f64;
    let step = 1.0 / buckets as f64;

    (0..=buckets)
        .map(|i| {
            let h = last * (i as f64 * step).min(1.0);
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(sorted.len() - 1);
            lerp(sorted[lo], sorted[hi], h - lo as f64)
        })
        .collect()
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 { b - diff * (1.0 - t) } else { a + diff * t }
}

/// Assigns every value a bucket index in `0..buckets` using population quantile edges.
///
/// Bucket 0 is `[e0, e1]`; bucket `i > 0` is `(e_i, e_{i+1}]`. Fails when the column has fewer
/// distinct values than buckets or when two edges coincide.
pub fn qcut(values: &[f64], buckets: usize) -> Result<Vec<usize>, DegeneratePartition> {
    if values.is_empty() {
        return Ok(Vec::new());
    }

    let distinct = count_distinct(values);
    let edges = quantile_edges(values, buckets);
    let edges_unique = edges
        .windows(2)
        .all(|w| w[0].partial_cmp(&w[1]) == Some(Ordering::Less));
    if distinct < buckets || !edges_unique {
        return Err(DegeneratePartition { distinct });
    }

    let inner = &edges[1..buckets];
    Ok(values
        .iter()
        .map(|v| inner.iter().filter(|&&e| *v > e).count())
        .collect())
}

fn count_distinct(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup_by(|a, b| a.total_cmp(b) == Ordering::Equal);
    sorted.len()
}

#[cfg(test)]
mod tests {
    use super::{qcut, quantile_edges, rank_first, DegeneratePartition, QUINTILES};

    #[test]
    fn rank_first_breaks_ties_by_position() {
        assert_eq!(rank_first(&[1.0, 1.0, 1.0]), vec![1.0, 2.0, 3.0]);
        assert_eq!(rank_first(&[5.0, 2.0, 5.0, 2.0]), vec![3.0, 1.0, 4.0, 2.0]);
        assert!(rank_first(&[]).is_empty());
    }

    #[test]
    fn edges_interpolate_linearly() {
        let edges = quantile_edges(&[1.0, 2.0, 3.0, 4.0], QUINTILES);
        let expected = [1.0, 1.6, 2.2, 2.8, 3.4, 4.0];
        for (got, want) in edges.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "{got} != {want}");
        }
    }

    #[test]
    fn qcut_ten_values_two_per_bucket() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let buckets = qcut(&values, QUINTILES).unwrap();
        assert_eq!(buckets, vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn qcut_lowest_value_lands_in_first_bucket() {
        let buckets = qcut(&[10.0, 20.0, 30.0, 40.0, 50.0], QUINTILES).unwrap();
        assert_eq!(buckets, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn qcut_preserves_input_order() {
        let buckets = qcut(&[50.0, 10.0, 40.0, 20.0, 30.0], QUINTILES).unwrap();
        assert_eq!(buckets, vec![4, 0, 3, 1, 2]);
    }

    #[test]
    fn qcut_rejects_too_few_distinct_values() {
        let err = qcut(&[1.0, 2.0, 3.0, 4.0, 4.0, 4.0], QUINTILES).unwrap_err();
        assert_eq!(err, DegeneratePartition { distinct: 4 });
    }

    #[test]
    fn qcut_rejects_duplicate_edges() {
        // Five distinct values, but the heavy tie collapses the middle edges.
        let mut values = vec![7.0; 20];
        values.extend([1.0, 2.0, 3.0, 4.0]);
        let err = qcut(&values, QUINTILES).unwrap_err();
        assert_eq!(err.distinct, 5);
    }

    #[test]
    fn qcut_empty_is_empty() {
        assert_eq!(qcut(&[], QUINTILES), Ok(Vec::new()));
    }
}
