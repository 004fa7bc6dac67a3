//! Per-category aggregation of trend records within one window
//!
//! Groups records by category and computes view, like and comment totals,
//! video counts, the platforms a category appeared on and its most frequent
//! hashtags.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::models::{Platform, TrendRecord};

/// Number of hashtags kept in [`CategoryMetrics::top_hashtags`]
pub const TOP_HASHTAGS: usize = 5;

/// Aggregate statistics for one category within one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMetrics {
    pub category: String,
    pub total_views: u64,

    /// `total_views / video_count`, 0 when there are no videos
    pub avg_views: f64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub video_count: u64,

    /// Filled in by the growth calculator, 0 until then
    pub growth_rate_percent: f64,

    /// Distinct platforms the category appeared on
    pub platforms: BTreeSet<Platform>,

    /// Most frequent normalized hashtags (descending count, ties lexicographic)
    pub top_hashtags: Vec<String>,
}

impl CategoryMetrics {
    /// Create empty metrics for a category
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            total_views: 0,
            avg_views: 0.0,
            total_likes: 0,
            total_comments: 0,
            video_count: 0,
            growth_rate_percent: 0.0,
            platforms: BTreeSet::new(),
            top_hashtags: Vec::new(),
        }
    }

    fn record(&mut self, record: &TrendRecord) {
        self.total_views = self.total_views.saturating_add(record.views.unwrap_or(0));
        self.total_likes = self.total_likes.saturating_add(record.likes.unwrap_or(0));
        self.total_comments = self
            .total_comments
            .saturating_add(record.comments.unwrap_or(0));
        self.video_count += 1;
        self.platforms.insert(record.platform);
    }

    fn finish(&mut self, hashtag_counts: HashMap<String, u64>) {
        self.avg_views = if self.video_count == 0 {
            0.0
        } else {
            self.total_views as f64 / self.video_count as f64
        };
        self.top_hashtags = top_by_count(hashtag_counts, TOP_HASHTAGS);
    }
}

/// Aggregate records into per-category metrics
///
/// Missing or blank categories are grouped under `"Other"`. Absent counters
/// count as zero. An empty input yields an empty map.
#[must_use]
pub fn aggregate(records: &[TrendRecord]) -> HashMap<String, CategoryMetrics> {
    let mut metrics: HashMap<String, CategoryMetrics> = HashMap::new();
    let mut hashtags: HashMap<String, HashMap<String, u64>> = HashMap::new();

    for record in records {
        let category = record.category_name();
        metrics
            .entry(category.to_string())
            .or_insert_with(|| CategoryMetrics::new(category))
            .record(record);

        let counts = hashtags.entry(category.to_string()).or_default();
        for tag in record.normalized_hashtags() {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }

    for (category, entry) in &mut metrics {
        entry.finish(hashtags.remove(category).unwrap_or_default());
    }

    tracing::debug!(
        records = records.len(),
        categories = metrics.len(),
        "Aggregated category metrics"
    );

    metrics
}

/// Metrics sorted by total views descending, ties broken by category name
#[must_use]
pub fn ranked(metrics: HashMap<String, CategoryMetrics>) -> Vec<CategoryMetrics> {
    let mut ranked: Vec<_> = metrics.into_values().collect();
    ranked.sort_by(|a, b| {
        b.total_views
            .cmp(&a.total_views)
            .then_with(|| a.category.cmp(&b.category))
    });
    ranked
}

/// Keys sorted by descending count, ties lexicographic, truncated to `limit`
pub(crate) fn top_by_count(counts: HashMap<String, u64>, limit: usize) -> Vec<String> {
    let mut entries: Vec<_> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(limit);
    entries.into_iter().map(|(key, _)| key).collect()
}
