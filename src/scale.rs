//! Per-column feature standardization

use ndarray::{Array1, Array2, Axis};

/// Standard scaler fitted on the full input set: per column, subtract the
/// mean and divide by the population standard deviation.
///
/// A zero-variance column is mapped to an all-zero column instead of
/// producing a division error, so uninformative features pass through the
/// pipeline without breaking it.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl StandardScaler {
    /// Fit column means and standard deviations (ddof = 0)
    pub fn fit(features: &Array2<f64>) -> Self {
        let means = features
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(features.ncols()));
        let stds = features.std_axis(Axis(0), 0.0);

        StandardScaler { means, stds }
    }

    /// Transform with the fitted parameters; shape is preserved
    pub fn transform(&self, features: &Array2<f64>) -> Array2<f64> {
        let mut scaled = features.clone();
        for (j, mut column) in scaled.columns_mut().into_iter().enumerate() {
            let mean = self.means[j];
            let std = self.stds[j];
            if std == 0.0 {
                column.fill(0.0);
            } else {
                column.mapv_inplace(|v| (v - mean) / std);
            }
        }
        scaled
    }

    /// Fit on `features` and transform it in one step
    pub fn fit_transform(features: &Array2<f64>) -> (Self, Array2<f64>) {
        let scaler = Self::fit(features);
        let scaled = scaler.transform(features);
        (scaler, scaled)
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn stds(&self) -> &Array1<f64> {
        &self.stds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_scaled_columns_have_zero_mean_unit_variance() {
        let features = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0]];
        let (_, scaled) = StandardScaler::fit_transform(&features);

        for column in scaled.columns() {
            let mean: f64 = column.iter().sum::<f64>() / column.len() as f64;
            let var: f64 =
                column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / column.len() as f64;
            assert!(mean.abs() < 1e-9);
            assert!((var - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_variance_column_scales_to_zeros() {
        let features = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let (_, scaled) = StandardScaler::fit_transform(&features);

        for &v in scaled.column(0).iter() {
            assert_eq!(v, 0.0);
        }
        // The informative column is still scaled normally
        assert!(scaled.column(1).iter().any(|&v| v != 0.0));
    }

    #[test]
    fn test_transform_reuses_fitted_parameters() {
        let train = array![[0.0], [10.0]];
        let scaler = StandardScaler::fit(&train);

        // mean 5, std 5: 15 scales to 2
        let scaled = scaler.transform(&array![[15.0]]);
        assert!((scaled[[0, 0]] - 2.0).abs() < 1e-9);
    }
}
