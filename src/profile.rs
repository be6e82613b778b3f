//! Cluster profiling and persona classification

use std::fmt;

use ndarray::Array1;

use crate::data::CustomerData;

/// Mean behavioral features of a cluster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BehaviorMeans {
    pub clicks: f64,
    pub page_views: f64,
    pub time_spent: f64,
    pub add_to_cart: f64,
}

/// Human-readable label for a cluster's dominant behavior.
///
/// Labels are not unique across clusters: two clusters can independently
/// satisfy the same rule and carry the same persona. That is accepted
/// behavior, not deduplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Persona {
    ReadyToBuy,
    DeepResearcher,
    WindowShopper,
    LowEngagement,
}

impl Persona {
    pub fn label(&self) -> &'static str {
        match self {
            Persona::ReadyToBuy => "Ready-to-Buy",
            Persona::DeepResearcher => "Deep Researcher",
            Persona::WindowShopper => "Window Shopper",
            Persona::LowEngagement => "Low Engagement",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn rule_ready_to_buy(m: &BehaviorMeans) -> bool {
    m.add_to_cart > 0.8
}

fn rule_deep_researcher(m: &BehaviorMeans) -> bool {
    m.time_spent > 300.0
}

fn rule_window_shopper(m: &BehaviorMeans) -> bool {
    m.clicks > 5.0 && m.add_to_cart < 0.2
}

/// Ordered persona rules, evaluated top-down; the first matching predicate
/// wins regardless of cluster id ordering.
pub const PERSONA_RULES: [(fn(&BehaviorMeans) -> bool, Persona); 3] = [
    (rule_ready_to_buy, Persona::ReadyToBuy),
    (rule_deep_researcher, Persona::DeepResearcher),
    (rule_window_shopper, Persona::WindowShopper),
];

/// Classify a cluster's aggregate profile into a persona
pub fn classify_persona(means: &BehaviorMeans) -> Persona {
    for (predicate, persona) in PERSONA_RULES {
        if predicate(means) {
            return persona;
        }
    }
    Persona::LowEngagement
}

/// Aggregate statistics and persona for one cluster
#[derive(Debug, Clone)]
pub struct ClusterProfile {
    pub cluster: usize,
    pub means: BehaviorMeans,
    pub member_count: usize,
    /// Mean conversion rate as a percentage in [0, 100]
    pub conversion_rate: f64,
    pub persona: Persona,
}

/// Profile every cluster: raw-feature means, member count, conversion rate,
/// and persona. Returns one profile per cluster id in `0..k`; an empty
/// cluster yields a zeroed profile.
pub fn profile_clusters(
    data: &CustomerData,
    labels: &Array1<usize>,
    k: usize,
) -> Vec<ClusterProfile> {
    let n_features = data.raw_features.ncols();
    let mut sums = vec![vec![0.0; n_features]; k];
    let mut conversion_sums = vec![0.0; k];
    let mut counts = vec![0usize; k];

    for (i, &cluster) in labels.iter().enumerate() {
        if cluster >= k {
            continue;
        }
        counts[cluster] += 1;
        conversion_sums[cluster] += data.conversions[i];
        for (j, sum) in sums[cluster].iter_mut().enumerate() {
            *sum += data.raw_features[[i, j]];
        }
    }

    (0..k)
        .map(|cluster| {
            let count = counts[cluster];
            let denom = count.max(1) as f64;
            let means = BehaviorMeans {
                clicks: sums[cluster][0] / denom,
                page_views: sums[cluster][1] / denom,
                time_spent: sums[cluster][2] / denom,
                add_to_cart: sums[cluster][3] / denom,
            };

            ClusterProfile {
                cluster,
                persona: classify_persona(&means),
                means,
                member_count: count,
                conversion_rate: conversion_sums[cluster] / denom * 100.0,
            }
        })
        .collect()
}

/// Action-plan note for a Deep Researcher cluster, when one exists.
///
/// Absence of a matching persona is a no-op, not an error.
pub fn researcher_highlight(profiles: &[ClusterProfile]) -> Option<String> {
    profiles
        .iter()
        .find(|p| p.persona == Persona::DeepResearcher)
        .map(|p| {
            format!(
                "Deep Researchers spend {:.0}s on average; serve them detailed \
                 content, comparison charts, and social proof to push checkout.",
                p.means.time_spent
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use polars::prelude::DataFrame;

    fn means(clicks: f64, page_views: f64, time_spent: f64, add_to_cart: f64) -> BehaviorMeans {
        BehaviorMeans {
            clicks,
            page_views,
            time_spent,
            add_to_cart,
        }
    }

    #[test]
    fn test_persona_rule_fixtures() {
        assert_eq!(
            classify_persona(&means(2.0, 0.0, 100.0, 0.9)),
            Persona::ReadyToBuy
        );
        assert_eq!(
            classify_persona(&means(1.0, 0.0, 400.0, 0.1)),
            Persona::DeepResearcher
        );
        assert_eq!(
            classify_persona(&means(8.0, 0.0, 50.0, 0.05)),
            Persona::WindowShopper
        );
        assert_eq!(
            classify_persona(&means(2.0, 0.0, 50.0, 0.3)),
            Persona::LowEngagement
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // Satisfies both the cart rule and the time rule; cart rule is first
        let m = means(1.0, 0.0, 500.0, 0.9);
        assert_eq!(classify_persona(&m), Persona::ReadyToBuy);
    }

    fn test_data(raw_features: Array2<f64>, conversions: Vec<f64>) -> CustomerData {
        let n = conversions.len();
        CustomerData {
            df: DataFrame::empty(),
            user_ids: (0..n).map(|i| format!("u{i}")).collect(),
            channels: vec!["google".to_string(); n],
            conversions,
            raw_features,
        }
    }

    #[test]
    fn test_profile_clusters_aggregates() {
        // Cluster 0: heavy cart use, converts; cluster 1: passive
        let raw = array![
            [2.0, 5.0, 100.0, 1.0],
            [4.0, 7.0, 120.0, 0.9],
            [1.0, 2.0, 40.0, 0.0],
            [1.0, 2.0, 60.0, 0.0],
        ];
        let data = test_data(raw, vec![1.0, 1.0, 0.0, 0.0]);
        let labels = array![0, 0, 1, 1];

        let profiles = profile_clusters(&data, &labels, 2);

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].member_count, 2);
        assert_eq!(profiles[0].persona, Persona::ReadyToBuy);
        assert!((profiles[0].conversion_rate - 100.0).abs() < 1e-9);
        assert!((profiles[0].means.time_spent - 110.0).abs() < 1e-9);

        assert_eq!(profiles[1].persona, Persona::LowEngagement);
        assert_eq!(profiles[1].conversion_rate, 0.0);
    }

    #[test]
    fn test_conversion_rate_within_percent_range() {
        let raw = array![[1.0, 1.0, 10.0, 0.0], [2.0, 2.0, 20.0, 0.0]];
        let data = test_data(raw, vec![1.0, 0.0]);
        let labels = array![0, 0];

        let profiles = profile_clusters(&data, &labels, 1);
        assert!(profiles[0].conversion_rate >= 0.0);
        assert!(profiles[0].conversion_rate <= 100.0);
        assert!((profiles[0].conversion_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_personas_are_preserved() {
        // Both clusters are low engagement
        let raw = array![
            [1.0, 1.0, 10.0, 0.0],
            [1.0, 1.0, 12.0, 0.0],
            [2.0, 2.0, 20.0, 0.3],
            [2.0, 2.0, 22.0, 0.3],
        ];
        let data = test_data(raw, vec![0.0, 0.0, 0.0, 0.0]);
        let labels = array![0, 0, 1, 1];

        let profiles = profile_clusters(&data, &labels, 2);
        assert_eq!(profiles[0].persona, Persona::LowEngagement);
        assert_eq!(profiles[1].persona, Persona::LowEngagement);
    }

    #[test]
    fn test_researcher_highlight_absent_is_none() {
        let raw = array![[1.0, 1.0, 10.0, 0.0]];
        let data = test_data(raw, vec![0.0]);
        let profiles = profile_clusters(&data, &array![0], 1);
        assert!(researcher_highlight(&profiles).is_none());
    }

    #[test]
    fn test_researcher_highlight_present() {
        let raw = array![[1.0, 1.0, 400.0, 0.1], [1.0, 1.0, 420.0, 0.1]];
        let data = test_data(raw, vec![0.0, 1.0]);
        let profiles = profile_clusters(&data, &array![0, 0], 1);

        let note = researcher_highlight(&profiles).unwrap();
        assert!(note.contains("410"));
    }
}
