//! Seeded K-Means fitting and elbow-based cluster count selection.

use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use crate::error::{Result, SegmentationError};

/// A fitted K-Means partition.
#[derive(Debug)]
pub struct KMeansModel {
    /// Number of clusters.
    pub n_clusters: usize,
    /// Cluster assignment per input row.
    pub labels: Array1<usize>,
    /// Cluster centroids, one row per cluster index.
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
}

impl KMeansModel {
    /// Member count per cluster index.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_clusters];
        for &label in self.labels.iter() {
            if label < self.n_clusters {
                sizes[label] += 1;
            }
        }
        sizes
    }
}

/// Knobs shared by every K-Means invocation in one pipeline run.
///
/// The seed drives centroid initialization for all restarts, so identical
/// input, cluster count and options reproduce the partition bit for bit.
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    /// Seed for the centroid initialization sampling.
    pub seed: u64,
    /// Restarts per fit; the lowest-inertia run wins.
    pub restarts: usize,
    /// Iteration bound per restart.
    pub max_iters: u64,
    /// Convergence tolerance on centroid movement.
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            seed: 0,
            restarts: 10,
            max_iters: 300,
            tolerance: 1e-4,
        }
    }
}

/// Fit K-Means for a fixed cluster count.
pub fn fit_kmeans(features: &Array2<f64>, k: usize, opts: &FitOptions) -> Result<KMeansModel> {
    let n = features.nrows();
    if k < 1 || k > n {
        return Err(SegmentationError::InvalidClusterCount { k, max: n });
    }

    let dataset = Dataset::new(features.clone(), Array1::<usize>::zeros(n));
    let rng = Xoshiro256Plus::seed_from_u64(opts.seed);

    let model = KMeans::params_with(k, rng, L2Dist)
        .n_runs(opts.restarts)
        .max_n_iterations(opts.max_iters)
        .tolerance(opts.tolerance)
        .fit(&dataset)?;

    let labels = model.predict(&dataset);
    let centroids = model.centroids().clone();
    let inertia = compute_inertia(features, &labels, &centroids);

    Ok(KMeansModel {
        n_clusters: k,
        labels,
        centroids,
        inertia,
    })
}

/// The WCSS curve over candidate cluster counts and the count the elbow
/// heuristic picked.
#[derive(Debug)]
pub struct ElbowCurve {
    /// Selected cluster count, in `[1, max_k - 1]`.
    pub chosen: usize,
    /// `wcss[i]` is the inertia for count `i + 1`.
    pub wcss: Vec<f64>,
}

/// Pick a cluster count by clustering for every k in `1..=max_k` and taking
/// the count at the sharpest bend of the WCSS curve: the k whose drop into it
/// most exceeds the drop out of it.
///
/// Known limitation: when the curve decreases smoothly there is no sharp
/// bend and the pick can be poor, as it can be when `max_k` is too small to
/// contain the true elbow. Validate the choice against the silhouette-based
/// quality score when in doubt.
pub fn select_cluster_count(
    features: &Array2<f64>,
    max_k: usize,
    opts: &FitOptions,
) -> Result<ElbowCurve> {
    if max_k < 2 {
        return Err(SegmentationError::InvalidClusterCount {
            k: max_k,
            max: features.nrows(),
        });
    }

    let mut wcss = Vec::with_capacity(max_k);
    for k in 1..=max_k {
        wcss.push(fit_kmeans(features, k, opts)?.inertia);
    }

    let chosen = if max_k == 2 {
        1
    } else {
        // wcss[mid] belongs to count mid + 1; compare the drop into that
        // count against the drop out of it. Ties go to the smaller count.
        let mut best_k = 2;
        let mut best_bend = f64::NEG_INFINITY;
        for mid in 1..max_k - 1 {
            let bend = wcss[mid - 1] - 2.0 * wcss[mid] + wcss[mid + 1];
            if bend > best_bend {
                best_bend = bend;
                best_k = mid + 1;
            }
        }
        best_k
    };

    Ok(ElbowCurve { chosen, wcss })
}

/// Within-cluster sum of squared distances between points and their centroid.
pub fn compute_inertia(
    features: &Array2<f64>,
    labels: &Array1<usize>,
    centroids: &Array2<f64>,
) -> f64 {
    let mut inertia = 0.0;
    for (i, &cluster) in labels.iter().enumerate() {
        if cluster < centroids.nrows() {
            let distance = row_distance_to(features, i, centroids, cluster);
            inertia += distance * distance;
        }
    }
    inertia
}

/// Euclidean distance between two rows of the same matrix.
pub(crate) fn row_distance(features: &Array2<f64>, i: usize, j: usize) -> f64 {
    features
        .row(i)
        .iter()
        .zip(features.row(j).iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn row_distance_to(features: &Array2<f64>, i: usize, centroids: &Array2<f64>, c: usize) -> f64 {
    features
        .row(i)
        .iter()
        .zip(centroids.row(c).iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Two tight groups of four points each.
    fn two_group_features() -> Array2<f64> {
        Array2::from_shape_vec(
            (8, 2),
            vec![
                0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, // around (0.5, 0.5)
                50.0, 50.0, 51.0, 50.0, 50.0, 51.0, 51.0, 51.0, // around (50.5, 50.5)
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_fit_kmeans_two_groups() {
        let features = two_group_features();
        let model = fit_kmeans(&features, 2, &FitOptions::default()).unwrap();

        assert_eq!(model.n_clusters, 2);
        assert_eq!(model.labels.len(), 8);
        assert_eq!(model.centroids.shape(), &[2, 2]);
        assert_eq!(model.cluster_sizes(), vec![4, 4]);

        // Each group lands in one cluster.
        for i in 1..4 {
            assert_eq!(model.labels[i], model.labels[0]);
            assert_eq!(model.labels[4 + i], model.labels[4]);
        }
        assert_ne!(model.labels[0], model.labels[4]);

        // Four unit-square corners per group: WCSS = 2 * 4 * 0.5
        assert_abs_diff_eq!(model.inertia, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fit_kmeans_invalid_cluster_count() {
        let features = two_group_features();
        assert!(matches!(
            fit_kmeans(&features, 0, &FitOptions::default()),
            Err(SegmentationError::InvalidClusterCount { k: 0, max: 8 })
        ));
        assert!(matches!(
            fit_kmeans(&features, 9, &FitOptions::default()),
            Err(SegmentationError::InvalidClusterCount { k: 9, max: 8 })
        ));
    }

    #[test]
    fn test_fit_kmeans_is_reproducible() {
        let features = two_group_features();
        let opts = FitOptions {
            seed: 42,
            ..FitOptions::default()
        };

        let first = fit_kmeans(&features, 2, &opts).unwrap();
        let second = fit_kmeans(&features, 2, &opts).unwrap();

        assert_eq!(first.labels, second.labels);
        assert_eq!(first.centroids, second.centroids);
        assert_eq!(first.inertia.to_bits(), second.inertia.to_bits());
    }

    #[test]
    fn test_wcss_is_non_increasing() {
        let features = two_group_features();
        let curve = select_cluster_count(&features, 4, &FitOptions::default()).unwrap();

        for pair in curve.wcss.windows(2) {
            assert!(pair[0] >= pair[1] - 1e-9);
        }
    }

    #[test]
    fn test_selector_bounds_and_determinism() {
        let features = two_group_features();
        let opts = FitOptions::default();

        let first = select_cluster_count(&features, 4, &opts).unwrap();
        assert!(first.chosen >= 1 && first.chosen <= 3);

        let second = select_cluster_count(&features, 4, &opts).unwrap();
        assert_eq!(first.chosen, second.chosen);
        assert_eq!(first.wcss, second.wcss);
    }

    #[test]
    fn test_selector_rejects_small_max_k() {
        let features = two_group_features();
        assert!(matches!(
            select_cluster_count(&features, 1, &FitOptions::default()),
            Err(SegmentationError::InvalidClusterCount { k: 1, .. })
        ));
    }
}
