//! Chart-ready shaping of `/insights` aggregates.

use crate::api::{Insights, ModelInsight};
use serde::Serialize;

/// Count buckets in display order: wire field name and accessor.
pub const COUNT_BUCKETS: [(&str, fn(&ModelInsight) -> u64); 5] = [
    ("count_0_5", |i: &ModelInsight| i.count_0_5),
    ("count_5_25", |i: &ModelInsight| i.count_5_25),
    ("count_25_50", |i: &ModelInsight| i.count_25_50),
    ("count_50_100", |i: &ModelInsight| i.count_50_100),
    ("count_100_plus", |i: &ModelInsight| i.count_100_plus),
];

/// One slice of the model-usage pie chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageSlice {
    pub id: usize,
    pub label: String,
    pub value: u64,
}

/// One bar series: a count bucket across all models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketSeries {
    pub label: &'static str,
    pub data: Vec<u64>,
}

/// Grouped bar chart: one x-axis entry per model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketChart {
    pub x_axis: Vec<String>,
    pub series: Vec<BucketSeries>,
}

/// Usage count per named model. Unnamed models are skipped; when a name
/// repeats, the later entry wins but keeps the first entry's position.
pub fn usage_slices(insights: &Insights) -> Vec<UsageSlice> {
    let mut slices: Vec<UsageSlice> = Vec::new();
    for insight in &insights.data {
        let Some(name) = insight.model_name.as_deref() else {
            continue;
        };
        match slices.iter_mut().find(|s| s.label == name) {
            Some(existing) => existing.value = insight.model_usage_count,
            None => slices.push(UsageSlice {
                id: slices.len(),
                label: name.to_string(),
                value: insight.model_usage_count,
            }),
        }
    }
    slices
}

/// Count-bucket distribution per model. Unnamed models appear as `unknown`.
pub fn bucket_chart(insights: &Insights) -> BucketChart {
    let x_axis = insights
        .data
        .iter()
        .map(|i| i.model_name.clone().unwrap_or_else(|| "unknown".to_string()))
        .collect();
    let series = COUNT_BUCKETS
        .iter()
        .map(|&(label, value)| BucketSeries {
            label,
            data: insights.data.iter().map(value).collect(),
        })
        .collect();
    BucketChart { x_axis, series }
}
