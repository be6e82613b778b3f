//! 2D projection of scaled features for visualization

use linfa::prelude::*;
use linfa_reduction::Pca;
use ndarray::{Array1, Array2};

/// Per-record coordinates on the top-2 principal components.
///
/// Purely presentational; nothing downstream depends on it.
#[derive(Debug, Clone)]
pub struct Projection {
    /// Shape (n_records, 2)
    pub coords: Array2<f64>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.coords.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.nrows() == 0
    }
}

/// Project scaled features onto their top-2 principal components
pub fn project_2d(scaled: &Array2<f64>) -> crate::Result<Projection> {
    let n_samples = scaled.nrows();
    let targets: Array1<usize> = Array1::zeros(n_samples);
    let dataset = Dataset::new(scaled.clone(), targets);

    let pca = Pca::params(2)
        .fit(&dataset)
        .map_err(|e| anyhow::anyhow!("pca fit failed: {e}"))?;
    let coords = pca.predict(scaled);

    Ok(Projection { coords })
}
