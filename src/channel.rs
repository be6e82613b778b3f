//! Marketing channel aggregation: efficiency summary and persona attribution

use std::collections::BTreeMap;

use ndarray::Array1;
use polars::prelude::*;

use crate::data::CustomerData;
use crate::profile::ClusterProfile;

/// Efficiency metrics for one acquisition channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSummary {
    pub channel: String,
    /// Mean conversion rate as a percentage in [0, 100]
    pub conversion_rate: f64,
    pub avg_time_spent: f64,
    pub traffic_volume: usize,
}

/// Row-normalized channel x persona distribution.
///
/// Columns are indexed by cluster id and carry that cluster's persona label;
/// duplicate labels across columns are kept as-is. Each row of shares sums
/// to 100.
#[derive(Debug, Clone)]
pub struct AttributionTable {
    /// Persona label per cluster id column
    pub persona_columns: Vec<String>,
    pub rows: Vec<AttributionRow>,
}

#[derive(Debug, Clone)]
pub struct AttributionRow {
    pub channel: String,
    /// Percentage of the channel's traffic per cluster id
    pub shares: Vec<f64>,
}

/// Group records by `referral_source` and compute mean conversion rate,
/// mean time spent, and traffic volume per channel.
///
/// Every distinct channel present in the data is reported; output is sorted
/// by channel name.
pub fn channel_summaries(data: &CustomerData) -> crate::Result<Vec<ChannelSummary>> {
    let summary = data
        .df
        .clone()
        .lazy()
        .group_by([col("referral_source")])
        .agg([
            (col("conversion_label").mean() * lit(100.0)).alias("conversion_rate"),
            col("time_spent").mean().alias("avg_time_spent"),
            col("user_id").count().alias("traffic_volume"),
        ])
        .sort("referral_source", Default::default())
        .collect()?;

    let channels: Vec<String> = summary
        .column("referral_source")?
        .cast(&DataType::Utf8)?
        .utf8()?
        .into_no_null_iter()
        .map(str::to_string)
        .collect();
    let conversion: Vec<f64> = float_column(&summary, "conversion_rate")?;
    let time_spent: Vec<f64> = float_column(&summary, "avg_time_spent")?;
    let traffic: Vec<f64> = float_column(&summary, "traffic_volume")?;

    Ok(channels
        .into_iter()
        .enumerate()
        .map(|(i, channel)| ChannelSummary {
            channel,
            conversion_rate: conversion[i],
            avg_time_spent: time_spent[i],
            traffic_volume: traffic[i] as usize,
        })
        .collect())
}

fn float_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    Ok(df
        .column(name)?
        .cast(&DataType::Float64)?
        .f64()?
        .into_no_null_iter()
        .collect())
}

/// Cross-tabulate channel against cluster id, normalized per channel row so
/// shares sum to 100, with columns relabeled by each cluster's persona.
pub fn attribution_table(
    data: &CustomerData,
    labels: &Array1<usize>,
    profiles: &[ClusterProfile],
) -> AttributionTable {
    let k = profiles.len();
    let mut counts: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

    for (i, &cluster) in labels.iter().enumerate() {
        let row = counts
            .entry(data.channels[i].as_str())
            .or_insert_with(|| vec![0; k]);
        if cluster < k {
            row[cluster] += 1;
        }
    }

    let rows = counts
        .into_iter()
        .map(|(channel, cluster_counts)| {
            let total: usize = cluster_counts.iter().sum();
            let shares = cluster_counts
                .iter()
                .map(|&c| c as f64 / total.max(1) as f64 * 100.0)
                .collect();
            AttributionRow {
                channel: channel.to_string(),
                shares,
            }
        })
        .collect();

    AttributionTable {
        persona_columns: profiles.iter().map(|p| p.persona.label().to_string()).collect(),
        rows,
    }
}
