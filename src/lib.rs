//! ChannelLens: customer segmentation and marketing channel efficiency analysis
//!
//! This library clusters customers by behavioral features using K-Means,
//! profiles each cluster into a human-readable persona, and reports
//! per-channel conversion efficiency and persona attribution.

pub mod channel;
pub mod cli;
pub mod data;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod profile;
pub mod project;
pub mod scale;
pub mod viz;

// Re-export public items for easier access
pub use channel::{attribution_table, channel_summaries, AttributionTable, ChannelSummary};
pub use cli::Args;
pub use data::{load_customer_data, CustomerData, FEATURE_COLUMNS};
pub use error::PipelineError;
pub use model::{fit_segmentation, SegmentationModel, SegmentationOptions};
pub use pipeline::{run_segmentation, DatasetCache, PreparedDataset, SegmentationReport};
pub use profile::{classify_persona, profile_clusters, ClusterProfile, Persona};
pub use project::{project_2d, Projection};
pub use scale::StandardScaler;

/// Common result type used throughout the application
pub type Result<T> = anyhow::Result<T>;
