//! Clustering quality metrics: WCSS cross-check and mean silhouette.

use ndarray::{Array1, Array2};

use crate::error::{Result, SegmentationError};
use crate::model::{compute_inertia, row_distance};

/// Quality metrics for one clustering.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    /// Within-cluster sum of squared distances. Matches the value the
    /// clusterer reports for the same partition, which makes it a cheap
    /// cross-check between the two components.
    pub wcss: f64,
    /// Mean silhouette coefficient over all points, in [-1, 1].
    pub silhouette: f64,
    /// Silhouette rescaled to a 0-100 percentage.
    pub quality: f64,
}

/// Rescale a silhouette coefficient to a 0-100 quality percentage.
pub fn quality_percentage(silhouette: f64) -> f64 {
    (silhouette + 1.0) * 50.0
}

/// Score a clustering over the feature matrix it was fitted on.
///
/// The silhouette is undefined for a single cluster and for one cluster per
/// point, both rejected as degenerate. Points that are alone in their
/// cluster contribute a coefficient of 0.
pub fn evaluate_clustering(
    features: &Array2<f64>,
    labels: &Array1<usize>,
    centroids: &Array2<f64>,
) -> Result<Evaluation> {
    let n = features.nrows();
    let k = centroids.nrows();
    if k < 2 || k >= n {
        return Err(SegmentationError::DegenerateClustering { k, n });
    }

    let wcss = compute_inertia(features, labels, centroids);

    let mut counts = vec![0usize; k];
    for &label in labels.iter() {
        if label < k {
            counts[label] += 1;
        }
    }

    let mut total = 0.0;
    for i in 0..n {
        let own = labels[i];

        let mut distance_sums = vec![0.0; k];
        for j in 0..n {
            if i != j && labels[j] < k {
                distance_sums[labels[j]] += row_distance(features, i, j);
            }
        }

        // a(i): mean distance to the rest of its own cluster.
        // b(i): smallest mean distance to any other cluster.
        // Out-of-range labels are skipped, as in the inertia sum.
        let coefficient = if own >= k || counts[own] <= 1 {
            0.0
        } else {
            let a = distance_sums[own] / (counts[own] - 1) as f64;
            let b = (0..k)
                .filter(|&c| c != own && counts[c] > 0)
                .map(|c| distance_sums[c] / counts[c] as f64)
                .fold(f64::INFINITY, f64::min);

            if !b.is_finite() || (a == 0.0 && b == 0.0) {
                0.0
            } else {
                (b - a) / a.max(b)
            }
        };

        total += coefficient;
    }

    let silhouette = total / n as f64;
    Ok(Evaluation {
        wcss,
        silhouette,
        quality: quality_percentage(silhouette),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{fit_kmeans, FitOptions};
    use approx::assert_abs_diff_eq;

    fn two_group_features() -> Array2<f64> {
        Array2::from_shape_vec(
            (8, 2),
            vec![
                0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, //
                50.0, 50.0, 51.0, 50.0, 50.0, 51.0, 51.0, 51.0,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_quality_percentage_scale() {
        assert_abs_diff_eq!(quality_percentage(0.0), 50.0);
        assert_abs_diff_eq!(quality_percentage(1.0), 100.0);
        assert_abs_diff_eq!(quality_percentage(-1.0), 0.0);
    }

    #[test]
    fn test_well_separated_groups_score_high() {
        let features = two_group_features();
        let model = fit_kmeans(&features, 2, &FitOptions::default()).unwrap();
        let eval = evaluate_clustering(&features, &model.labels, &model.centroids).unwrap();

        assert!(eval.silhouette > 0.9);
        assert!(eval.quality > 95.0 && eval.quality <= 100.0);

        // Evaluator WCSS agrees with the clusterer's inertia.
        assert_abs_diff_eq!(eval.wcss, model.inertia, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_single_cluster() {
        let features = two_group_features();
        let model = fit_kmeans(&features, 1, &FitOptions::default()).unwrap();
        assert!(matches!(
            evaluate_clustering(&features, &model.labels, &model.centroids),
            Err(SegmentationError::DegenerateClustering { k: 1, n: 8 })
        ));
    }

    #[test]
    fn test_degenerate_one_cluster_per_point() {
        let features = two_group_features();
        let labels = Array1::from_iter(0..8usize);
        // Every point is its own centroid.
        assert!(matches!(
            evaluate_clustering(&features, &labels, &features.clone()),
            Err(SegmentationError::DegenerateClustering { k: 8, n: 8 })
        ));
    }

    #[test]
    fn test_out_of_range_labels_are_skipped() {
        // Labels beyond the centroid count come only from external callers;
        // they contribute nothing instead of panicking.
        let features = two_group_features();
        let labels = Array1::from(vec![0usize, 0, 0, 0, 1, 1, 1, 7]);
        let centroids =
            Array2::from_shape_vec((2, 2), vec![0.5, 0.5, 50.5, 50.5]).unwrap();

        let eval = evaluate_clustering(&features, &labels, &centroids).unwrap();
        assert!(eval.silhouette.is_finite());
        assert!(eval.quality >= 0.0 && eval.quality <= 100.0);
    }

    #[test]
    fn test_singleton_cluster_scores_zero_for_its_point() {
        // Two points far apart plus a pair: the isolated point is a
        // singleton cluster and contributes a coefficient of 0.
        let features = Array2::from_shape_vec(
            (3, 2),
            vec![0.0, 0.0, 0.0, 1.0, 100.0, 100.0],
        )
        .unwrap();
        let labels = Array1::from(vec![0usize, 0, 1]);
        let centroids = Array2::from_shape_vec((2, 2), vec![0.0, 0.5, 100.0, 100.0]).unwrap();

        let eval = evaluate_clustering(&features, &labels, &centroids).unwrap();
        assert!(eval.silhouette > 0.6); // two strong points, one zero
        assert!(eval.quality <= 100.0);
    }
}
