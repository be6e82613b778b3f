//! Pipeline error taxonomy

use thiserror::Error;

/// Failures that terminate a pipeline run.
///
/// Everything downstream of a failed stage is skipped: a load failure halts
/// the run before any computation, and an invalid clustering parameter stops
/// profiling and aggregation from running.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source unreachable or unparsable. Reported once, never retried.
    #[error("failed to load dataset from '{uri}': {reason}")]
    DataLoad { uri: String, reason: String },

    /// Operator-supplied parameter outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl PipelineError {
    pub fn data_load(uri: impl Into<String>, reason: impl ToString) -> Self {
        PipelineError::DataLoad {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }
}
