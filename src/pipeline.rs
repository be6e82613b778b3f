//! Pipeline orchestration and dataset memoization
//!
//! The pipeline is a linear batch: load -> scale -> cluster -> profile ->
//! project -> aggregate. Load and scale results are memoized per source so
//! that re-clustering with a new `k` never re-fetches or re-scales.

use std::collections::HashMap;
use std::sync::Arc;

use ndarray::Array2;

use crate::channel::{attribution_table, channel_summaries, AttributionTable, ChannelSummary};
use crate::data::{load_customer_data, CustomerData};
use crate::model::{fit_segmentation, SegmentationModel, SegmentationOptions};
use crate::profile::{profile_clusters, ClusterProfile};
use crate::project::{project_2d, Projection};
use crate::scale::StandardScaler;

/// A loaded dataset with its fitted scaler and scaled feature matrix
#[derive(Debug)]
pub struct PreparedDataset {
    pub data: CustomerData,
    pub scaler: StandardScaler,
    pub scaled: Array2<f64>,
}

/// Load a dataset and standardize its behavioral features
pub fn prepare(source: &str) -> crate::Result<PreparedDataset> {
    let data = load_customer_data(source)?;
    let (scaler, scaled) = StandardScaler::fit_transform(&data.raw_features);

    Ok(PreparedDataset {
        data,
        scaler,
        scaled,
    })
}

/// Explicit memoization of load + scale, keyed by source identifier.
///
/// Entries are invalidated only by explicit operator action, never
/// implicitly.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<String, Arc<PreparedDataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `source`, loading and scaling it on
    /// first access
    pub fn get_or_load(&mut self, source: &str) -> crate::Result<Arc<PreparedDataset>> {
        if let Some(prepared) = self.entries.get(source) {
            log::debug!("dataset cache hit for {source}");
            return Ok(Arc::clone(prepared));
        }

        let prepared = Arc::new(prepare(source)?);
        self.entries
            .insert(source.to_string(), Arc::clone(&prepared));
        Ok(prepared)
    }

    /// Drop the cached entry for `source`, forcing a reload on next access
    pub fn invalidate(&mut self, source: &str) {
        self.entries.remove(source);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything one segmentation run produces for presentation
#[derive(Debug)]
pub struct SegmentationReport {
    pub model: SegmentationModel,
    pub profiles: Vec<ClusterProfile>,
    pub projection: Projection,
    pub channels: Vec<ChannelSummary>,
    pub attribution: AttributionTable,
}

/// Run the full pipeline downstream of a prepared dataset.
///
/// Each stage completes before the next begins; a failed clustering stage
/// stops profiling and aggregation from running.
pub fn run_segmentation(
    prepared: &PreparedDataset,
    k: usize,
    opts: SegmentationOptions,
) -> crate::Result<SegmentationReport> {
    let model = fit_segmentation(&prepared.scaled, k, opts)?;
    let profiles = profile_clusters(&prepared.data, &model.labels, k);
    let projection = project_2d(&prepared.scaled)?;
    let channels = channel_summaries(&prepared.data)?;
    let attribution = attribution_table(&prepared.data, &model.labels, &profiles);

    log::info!(
        "segmentation complete: {} records, {} clusters, {} channels",
        prepared.data.len(),
        k,
        channels.len()
    );

    Ok(SegmentationReport {
        model,
        profiles,
        projection,
        channels,
        attribution,
    })
}
