//! Category correlation over shared hashtag vocabulary
//!
//! This module provides functionality for:
//! - Building the distinct hashtag vocabulary of each category in a window
//! - Scoring every unordered category pair with Jaccard similarity
//! - Sampling the hashtags two categories have in common

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::models::TrendRecord;

/// Maximum number of shared hashtags reported per pair
pub const MAX_COMMON_HASHTAGS: usize = 3;

/// Similarity between two distinct categories within one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationEntry {
    /// Lexicographically smaller category of the pair
    pub category_a: String,

    /// Lexicographically larger category of the pair
    pub category_b: String,

    /// Jaccard similarity in `[0.0, 1.0]`
    pub score: f64,

    /// Up to three shared hashtags, most frequent first
    pub common_hashtags: Vec<String>,
}

/// Hashtag occurrence counts per category, keyed in sorted category order
type Vocabulary = BTreeMap<String, HashMap<String, u64>>;

fn build_vocabulary(records: &[TrendRecord]) -> Vocabulary {
    let mut vocabulary: Vocabulary = BTreeMap::new();
    for record in records {
        let counts = vocabulary
            .entry(record.category_name().to_string())
            .or_default();
        for tag in record.normalized_hashtags() {
            *counts.entry(tag).or_insert(0) += 1;
        }
    }
    vocabulary
}

/// Jaccard similarity of two hashtag vocabularies; two empty sets score 0
fn jaccard(a: &HashMap<String, u64>, b: &HashMap<String, u64>) -> (f64, Vec<String>) {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut shared: Vec<(&String, u64)> = small
        .iter()
        .filter_map(|(tag, count)| large.get(tag).map(|other| (tag, count + other)))
        .collect();

    let intersection = shared.len();
    let union = a.len() + b.len() - intersection;
    let score = if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    };

    shared.sort_by(|x, y| y.1.cmp(&x.1).then_with(|| x.0.cmp(y.0)));
    let common = shared
        .into_iter()
        .take(MAX_COMMON_HASHTAGS)
        .map(|(tag, _)| tag.clone())
        .collect();

    (score, common)
}

/// Correlate every unordered pair of categories observed in `records`
///
/// Entries are returned with `category_a < category_b`, ordered by the pair.
/// A window with fewer than two categories yields no entries.
#[must_use]
pub fn correlate(records: &[TrendRecord]) -> Vec<CorrelationEntry> {
    let vocabulary = build_vocabulary(records);
    let categories: Vec<_> = vocabulary.iter().collect();
    let mut entries = Vec::with_capacity(categories.len() * categories.len().saturating_sub(1) / 2);

    for i in 0..categories.len() {
        for j in (i + 1)..categories.len() {
            let (name_a, tags_a) = categories[i];
            let (name_b, tags_b) = categories[j];
            let (score, common_hashtags) = jaccard(tags_a, tags_b);

            entries.push(CorrelationEntry {
                category_a: name_a.clone(),
                category_b: name_b.clone(),
                score,
                common_hashtags,
            });
        }
    }

    tracing::debug!(
        records = records.len(),
        categories = categories.len(),
        pairs = entries.len(),
        "Computed category correlations"
    );

    entries
}
