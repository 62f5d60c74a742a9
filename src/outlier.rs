//! Outlier removal: a density-based local outlier factor filter over the
//! feature matrix, and a range-based interquartile filter over one attribute.
//!
//! Both filters return the indices of the rows to keep, in input order. The
//! caller applies the same indices to the record table so that points and
//! records stay in lockstep.

use ndarray::Array2;

use crate::error::{Result, SegmentationError};
use crate::model::row_distance;

/// Indices of the points that survive the density filter.
///
/// Scores every point with a local outlier factor over its `n_neighbors`
/// nearest neighbors, then flags the `ceil(contamination * N)` highest
/// scores. Ties at the contamination boundary are broken by original index
/// so the result is reproducible. Runs once, over the full matrix.
pub fn density_keep_indices(
    features: &Array2<f64>,
    n_neighbors: usize,
    contamination: f64,
) -> Result<Vec<usize>> {
    if !(0.0..1.0).contains(&contamination) {
        return Err(SegmentationError::InvalidParameter(format!(
            "contamination {contamination} is outside [0, 1)"
        )));
    }

    if n_neighbors == 0 {
        return Err(SegmentationError::InvalidParameter(
            "neighborhood size must be at least 1".to_string(),
        ));
    }

    let n = features.nrows();
    if n <= n_neighbors {
        return Err(SegmentationError::InsufficientData {
            have: n,
            need: n_neighbors,
        });
    }

    let scores = local_outlier_factors(features, n_neighbors);

    let n_outliers = (contamination * n as f64).ceil() as usize;
    if n_outliers == 0 {
        return Ok((0..n).collect());
    }

    // Highest score first, original index as the total-order tie break.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

    let mut flagged = vec![false; n];
    for &i in &order[..n_outliers] {
        flagged[i] = true;
    }

    Ok((0..n).filter(|&i| !flagged[i]).collect())
}

/// Local outlier factor per point: the ratio between the average local
/// reachability density of a point's neighbors and its own. Scores near 1
/// mean the point sits in a neighborhood as dense as its neighbors'; higher
/// scores mean it is comparatively isolated.
pub fn local_outlier_factors(features: &Array2<f64>, n_neighbors: usize) -> Vec<f64> {
    let n = features.nrows();

    // Neighbor lists sorted by (distance, index) so ordering is total.
    let mut neighbors: Vec<Vec<(f64, usize)>> = Vec::with_capacity(n);
    for i in 0..n {
        let mut dists: Vec<(f64, usize)> = (0..n)
            .filter(|&j| j != i)
            .map(|j| (row_distance(features, i, j), j))
            .collect();
        dists.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
        dists.truncate(n_neighbors);
        neighbors.push(dists);
    }

    let k_distance: Vec<f64> = neighbors.iter().map(|ns| ns[ns.len() - 1].0).collect();

    // The epsilon keeps densities finite for blocks of exact duplicates,
    // where every reachability distance is zero. An infinite density here
    // would leak into the score of every point whose neighborhood touches
    // the block and scramble the ranking.
    let reachability_density: Vec<f64> = (0..n)
        .map(|i| {
            let total: f64 = neighbors[i]
                .iter()
                .map(|&(dist, j)| dist.max(k_distance[j]))
                .sum();
            n_neighbors as f64 / total.max(1e-10)
        })
        .collect();

    (0..n)
        .map(|i| {
            let neighbor_mean: f64 = neighbors[i]
                .iter()
                .map(|&(_, j)| reachability_density[j])
                .sum::<f64>()
                / n_neighbors as f64;
            neighbor_mean / reachability_density[i]
        })
        .collect()
}

/// Indices of the values that fall inside the interquartile bounds
/// `[Q1 - multiplier * IQR, Q3 + multiplier * IQR]`, bounds inclusive.
///
/// A constant attribute has IQR = 0 and the bounds collapse to `[Q1, Q3]`.
/// When the filter is applied over several attributes in sequence, each pass
/// must run on the output of the previous one; returning indices into the
/// current record set enforces that.
pub fn range_keep_indices(
    values: &[f64],
    lower_quantile: f64,
    upper_quantile: f64,
    multiplier: f64,
) -> Result<Vec<usize>> {
    if values.is_empty() {
        return Err(SegmentationError::EmptyResult);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, lower_quantile);
    let q3 = quantile(&sorted, upper_quantile);
    let iqr = q3 - q1;
    let lower = q1 - multiplier * iqr;
    let upper = q3 + multiplier * iqr;

    let keep: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v >= lower && v <= upper)
        .map(|(i, _)| i)
        .collect();

    if keep.is_empty() {
        return Err(SegmentationError::EmptyResult);
    }
    Ok(keep)
}

/// Linearly interpolated quantile of already-sorted values, `q` in [0, 1].
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let low = position.floor() as usize;
    let high = position.ceil() as usize;
    if low == high {
        sorted[low]
    } else {
        sorted[low] + (position - low as f64) * (sorted[high] - sorted[low])
    }
}
