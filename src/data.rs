//! Customer dataset loading and feature extraction using Polars

use std::io::Cursor;
use std::path::Path;

use ndarray::Array2;
use polars::prelude::*;

use crate::error::PipelineError;

/// Behavioral feature columns, in the fixed order used by scaling,
/// clustering, and projection.
pub const FEATURE_COLUMNS: [&str; 4] = ["clicks", "page_views", "time_spent", "add_to_cart"];

/// Loaded customer dataset with columns extracted for the pipeline
#[derive(Debug, Clone)]
pub struct CustomerData {
    /// Full dataset as loaded
    pub df: DataFrame,
    /// Unique user identifiers, one per row
    pub user_ids: Vec<String>,
    /// Acquisition channel (`referral_source`), one per row
    pub channels: Vec<String>,
    /// Binary conversion labels as 0.0/1.0, one per row
    pub conversions: Vec<f64>,
    /// Raw behavioral features, shape (n_customers, 4), column order per
    /// `FEATURE_COLUMNS`
    pub raw_features: Array2<f64>,
}

impl CustomerData {
    /// Number of customer records
    pub fn len(&self) -> usize {
        self.user_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }

    /// First `n` rows of the raw dataset, for operator preview
    pub fn preview(&self, n: usize) -> DataFrame {
        self.df.head(Some(n))
    }
}

/// Load the customer dataset from a local path or an http(s) URL.
///
/// A single failed load halts the pipeline: any fetch, parse, or
/// missing-column problem is reported as `PipelineError::DataLoad` and is
/// never retried.
pub fn load_customer_data(source: &str) -> crate::Result<CustomerData> {
    let df = read_dataframe(source)?;

    if df.height() == 0 {
        return Err(PipelineError::data_load(source, "dataset contains no rows").into());
    }

    log::info!(
        "loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        source
    );

    extract_columns(source, df)
}

fn read_dataframe(source: &str) -> crate::Result<DataFrame> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let body = reqwest::blocking::get(source)
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(|e| PipelineError::data_load(source, e))?;

        CsvReader::new(Cursor::new(body))
            .has_header(true)
            .finish()
            .map_err(|e| PipelineError::data_load(source, e).into())
    } else {
        if !Path::new(source).exists() {
            return Err(PipelineError::data_load(source, "file not found").into());
        }

        CsvReader::from_path(source)
            .and_then(|reader| reader.has_header(true).finish())
            .map_err(|e| PipelineError::data_load(source, e).into())
    }
}

/// Pull the expected columns out of the frame. The schema is assumed fixed;
/// only column existence is checked.
fn extract_columns(source: &str, df: DataFrame) -> crate::Result<CustomerData> {
    let user_ids = string_column(&df, "user_id")
        .map_err(|e| PipelineError::data_load(source, e))?;
    let channels = string_column(&df, "referral_source")
        .map_err(|e| PipelineError::data_load(source, e))?;
    let conversions = numeric_column(&df, "conversion_label")
        .map_err(|e| PipelineError::data_load(source, e))?;

    let n_samples = user_ids.len();
    let mut feature_cols = Vec::with_capacity(FEATURE_COLUMNS.len());
    for name in FEATURE_COLUMNS {
        let values =
            numeric_column(&df, name).map_err(|e| PipelineError::data_load(source, e))?;
        feature_cols.push(values);
    }

    // Row-major feature matrix in the fixed column order
    let mut raw = Vec::with_capacity(n_samples * FEATURE_COLUMNS.len());
    for i in 0..n_samples {
        for col in &feature_cols {
            raw.push(col[i]);
        }
    }
    let raw_features = Array2::from_shape_vec((n_samples, FEATURE_COLUMNS.len()), raw)?;

    Ok(CustomerData {
        df,
        user_ids,
        channels,
        conversions,
        raw_features,
    })
}

fn numeric_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    reject_nulls(&column, name)?;
    Ok(column.f64()?.into_no_null_iter().collect())
}

fn string_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let column = df.column(name)?.cast(&DataType::Utf8)?;
    reject_nulls(&column, name)?;
    Ok(column
        .utf8()?
        .into_no_null_iter()
        .map(str::to_string)
        .collect())
}

/// Empty or unparsable cells come back from the CSV reader as nulls; they
/// must fail the load rather than flow into the pipeline as zeros.
fn reject_nulls(column: &Series, name: &str) -> PolarsResult<()> {
    let nulls = column.null_count();
    if nulls > 0 {
        return Err(PolarsError::ComputeError(
            format!("column '{name}' has {nulls} missing or unparsable value(s)").into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "user_id,clicks,page_views,time_spent,add_to_cart,conversion_label,referral_source"
        )
        .unwrap();
        writeln!(file, "u1,3,10,120,0,0,google").unwrap();
        writeln!(file, "u2,8,25,450,1,1,instagram").unwrap();
        writeln!(file, "u3,1,4,60,0,0,ads").unwrap();
        writeln!(file, "u4,6,18,200,0,0,google").unwrap();
        file
    }

    #[test]
    fn test_load_customer_data() {
        let file = create_test_csv();
        let data = load_customer_data(file.path().to_str().unwrap()).unwrap();

        assert_eq!(data.len(), 4);
        assert_eq!(data.raw_features.shape(), &[4, 4]);
        assert_eq!(data.channels[1], "instagram");
        assert_eq!(data.conversions, vec![0.0, 1.0, 0.0, 0.0]);
        // time_spent is the third feature column
        assert_eq!(data.raw_features[[1, 2]], 450.0);
    }

    #[test]
    fn test_missing_file_is_data_load_error() {
        let err = load_customer_data("/no/such/file.csv").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::DataLoad { .. })
        ));
    }

    #[test]
    fn test_missing_column_is_data_load_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "user_id,clicks").unwrap();
        writeln!(file, "u1,3").unwrap();

        let err = load_customer_data(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::DataLoad { .. })
        ));
    }

    #[test]
    fn test_empty_numeric_cell_is_data_load_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "user_id,clicks,page_views,time_spent,add_to_cart,conversion_label,referral_source"
        )
        .unwrap();
        writeln!(file, "u1,3,10,120,0,0,google").unwrap();
        // Missing clicks value must not be read back as 0.0
        writeln!(file, "u2,,25,450,1,1,instagram").unwrap();

        let err = load_customer_data(file.path().to_str().unwrap()).unwrap_err();
        let pipeline_err = err.downcast_ref::<PipelineError>();
        assert!(matches!(
            pipeline_err,
            Some(PipelineError::DataLoad { .. })
        ));
        assert!(err.to_string().contains("clicks"));
    }

    #[test]
    fn test_missing_channel_cell_is_data_load_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "user_id,clicks,page_views,time_spent,add_to_cart,conversion_label,referral_source"
        )
        .unwrap();
        writeln!(file, "u1,3,10,120,0,0,").unwrap();

        let err = load_customer_data(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::DataLoad { .. })
        ));
    }

    #[test]
    fn test_preview_limits_rows() {
        let file = create_test_csv();
        let data = load_customer_data(file.path().to_str().unwrap()).unwrap();
        assert_eq!(data.preview(2).height(), 2);
    }
}
