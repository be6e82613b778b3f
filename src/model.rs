//! K-Means segmentation engine

use std::collections::HashSet;

use linfa::prelude::*;
use linfa_clustering::KMeans;
use linfa_nn::distance::L2Dist;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use crate::error::PipelineError;

/// Valid operator-supplied cluster counts
pub const MIN_CLUSTERS: usize = 2;
pub const MAX_CLUSTERS: usize = 6;

/// Number of independent K-Means restarts; the lowest-inertia run wins
const N_RESTARTS: usize = 10;

/// Tuning knobs for a segmentation run
#[derive(Debug, Clone, Copy)]
pub struct SegmentationOptions {
    /// RNG seed for centroid initialization; same seed + same input gives
    /// the same assignment
    pub seed: u64,
    pub max_iters: u64,
    pub tolerance: f64,
}

impl Default for SegmentationOptions {
    fn default() -> Self {
        SegmentationOptions {
            seed: 42,
            max_iters: 300,
            tolerance: 1e-4,
        }
    }
}

/// Fitted segmentation model with per-record cluster assignments
#[derive(Debug)]
pub struct SegmentationModel {
    /// Fitted K-Means model from linfa
    pub model: KMeans<f64, L2Dist>,
    /// Number of clusters
    pub k: usize,
    /// Cluster id in `[0, k)` for each input row
    pub labels: Array1<usize>,
    /// Cluster centroids in scaled feature space
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squares of the kept run
    pub inertia: f64,
}

impl SegmentationModel {
    /// Member count per cluster id
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k];
        for &label in self.labels.iter() {
            if label < self.k {
                sizes[label] += 1;
            }
        }
        sizes
    }

    /// Mean silhouette coefficient over at most `sample_size` points, as a
    /// quick separation diagnostic
    pub fn silhouette_sample(&self, features: &Array2<f64>, sample_size: usize) -> f64 {
        let n = features.nrows().min(sample_size);
        if n < 2 {
            return 0.0;
        }

        let mut total = 0.0;
        for i in 0..n {
            let own = self.labels[i];
            let mut same = Vec::new();
            let mut others: Vec<Vec<f64>> = vec![Vec::new(); self.k];

            for j in 0..n {
                if i == j {
                    continue;
                }
                let d = euclidean(&features.row(i), &features.row(j));
                if self.labels[j] == own {
                    same.push(d);
                } else {
                    others[self.labels[j]].push(d);
                }
            }

            let a = mean_or_zero(&same);
            let b = others
                .iter()
                .filter(|ds| !ds.is_empty())
                .map(|ds| ds.iter().sum::<f64>() / ds.len() as f64)
                .fold(f64::INFINITY, f64::min);

            if b.is_finite() && (a != 0.0 || b != 0.0) {
                total += (b - a) / a.max(b);
            }
        }

        total / n as f64
    }
}

/// Fit K-Means on scaled features.
///
/// Runs `N_RESTARTS` independent initializations from a fixed seed and keeps
/// the lowest-inertia result, so repeated runs over the same input are
/// deterministic.
pub fn fit_segmentation(
    scaled: &Array2<f64>,
    k: usize,
    opts: SegmentationOptions,
) -> crate::Result<SegmentationModel> {
    if !(MIN_CLUSTERS..=MAX_CLUSTERS).contains(&k) {
        return Err(PipelineError::InvalidParameter(format!(
            "cluster count must be between {MIN_CLUSTERS} and {MAX_CLUSTERS}, got {k}"
        ))
        .into());
    }

    let distinct = distinct_rows(scaled);
    if k > distinct {
        return Err(PipelineError::InvalidParameter(format!(
            "cluster count ({k}) exceeds the number of distinct data points ({distinct})"
        ))
        .into());
    }

    let n_samples = scaled.nrows();
    let targets: Array1<usize> = Array1::zeros(n_samples);
    let dataset = Dataset::new(scaled.clone(), targets);

    let rng = Xoshiro256Plus::seed_from_u64(opts.seed);
    let model = KMeans::params_with(k, rng, L2Dist)
        .n_runs(N_RESTARTS)
        .max_n_iterations(opts.max_iters)
        .tolerance(opts.tolerance)
        .fit(&dataset)
        .map_err(|e| anyhow::anyhow!("k-means fit failed: {e}"))?;

    let labels = model.predict(&dataset);
    let centroids = model.centroids().clone();
    let inertia = compute_inertia(scaled, &labels, &centroids);

    log::debug!("k-means fitted: k={k}, inertia={inertia:.4}");

    Ok(SegmentationModel {
        model,
        k,
        labels,
        centroids,
        inertia,
    })
}

/// Count distinct rows by bit pattern
fn distinct_rows(features: &Array2<f64>) -> usize {
    let mut seen = HashSet::new();
    for row in features.outer_iter() {
        let key: Vec<u64> = row.iter().map(|v| v.to_bits()).collect();
        seen.insert(key);
    }
    seen.len()
}

/// Within-cluster sum of squares
fn compute_inertia(features: &Array2<f64>, labels: &Array1<usize>, centroids: &Array2<f64>) -> f64 {
    let mut inertia = 0.0;
    for (i, &cluster) in labels.iter().enumerate() {
        if cluster < centroids.nrows() {
            let point = features.row(i);
            let centroid = centroids.row(cluster);
            inertia += point
                .iter()
                .zip(centroid.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>();
        }
    }
    inertia
}

fn euclidean(a: &ndarray::ArrayView1<f64>, b: &ndarray::ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn mean_or_zero(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Three well-separated blobs of four points each
    fn blob_features() -> Array2<f64> {
        let mut rows = Vec::new();
        for center in [-5.0, 0.0, 5.0] {
            for offset in [-0.1, 0.0, 0.1, 0.2] {
                rows.extend_from_slice(&[center + offset, center - offset]);
            }
        }
        Array2::from_shape_vec((12, 2), rows).unwrap()
    }

    #[test]
    fn test_every_record_assigned_and_k_clusters_used() {
        let features = blob_features();
        let model = fit_segmentation(&features, 3, SegmentationOptions::default()).unwrap();

        assert_eq!(model.labels.len(), 12);
        let used: HashSet<usize> = model.labels.iter().copied().collect();
        assert_eq!(used.len(), 3);
        assert!(used.iter().all(|&c| c < 3));
        assert_eq!(model.cluster_sizes().iter().sum::<usize>(), 12);
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let features = blob_features();
        let opts = SegmentationOptions::default();

        let first = fit_segmentation(&features, 3, opts).unwrap();
        let second = fit_segmentation(&features, 3, opts).unwrap();

        assert_eq!(first.labels, second.labels);
        assert!((first.inertia - second.inertia).abs() < 1e-12);
    }

    #[test]
    fn test_k_out_of_range_is_invalid_parameter() {
        let features = blob_features();

        for k in [0, 1, 7] {
            let err = fit_segmentation(&features, k, SegmentationOptions::default()).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<PipelineError>(),
                Some(PipelineError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_k_above_distinct_points_is_invalid_parameter() {
        // Two distinct points repeated
        let features =
            Array2::from_shape_vec((4, 2), vec![1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 2.0, 2.0]).unwrap();

        let err = fit_segmentation(&features, 3, SegmentationOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_k_equal_to_distinct_points_fits() {
        // Boundary: k == distinct rows is a valid parameter and must fit,
        // not be rejected
        let features =
            Array2::from_shape_vec((3, 2), vec![0.0, 0.0, 5.0, 5.0, -5.0, 5.0]).unwrap();
        let model = fit_segmentation(&features, 3, SegmentationOptions::default()).unwrap();
        assert_eq!(model.cluster_sizes(), vec![1, 1, 1]);
    }

    #[test]
    fn test_inertia_is_finite_and_nonnegative() {
        let features = blob_features();
        let model = fit_segmentation(&features, 2, SegmentationOptions::default()).unwrap();
        assert!(model.inertia.is_finite());
        assert!(model.inertia >= 0.0);
    }
}
