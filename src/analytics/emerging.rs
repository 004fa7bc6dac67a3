//! Detection of newly appearing and rapidly growing categories
//!
//! Compares a recent window against an older, non-overlapping window of the
//! same length. Two independent rules produce candidates:
//!
//! - **novel**: the category appears in the recent window only, with enough videos
//! - **rapid growth**: total views grew by more than the growth threshold
//!
//! Each candidate carries a bounded confidence score and the evidence behind it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use super::error::AnalysisResult;
use super::metrics::{aggregate, CategoryMetrics};
use crate::models::{Platform, TrendRecord, Window};

/// Upper bound for every confidence score
pub const MAX_CONFIDENCE: f64 = 0.9;

/// Number of hashtags quoted in novel-category evidence
const HASHTAG_SAMPLE: usize = 3;

/// Kind of evidence supporting an emerging flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    Hashtag,
    TitlePattern,
    GrowthRate,
}

/// One piece of supporting evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(rename = "type")]
    pub evidence_type: EvidenceType,
    pub value: String,
    pub description: String,
}

impl Evidence {
    fn new(evidence_type: EvidenceType, value: String, description: String) -> Self {
        Self {
            evidence_type,
            value,
            description,
        }
    }
}

/// Rule that flagged an emerging category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergingRule {
    Novel,
    RapidGrowth,
}

/// A category flagged as new or fast-growing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergingCategory {
    /// Display name; rapid-growth entries carry a " (rapid growth)" suffix
    pub name: String,

    /// Underlying category
    pub category: String,
    pub rule: EmergingRule,

    /// Heuristic score in `[0.0, 0.9]`
    pub confidence: f64,
    pub evidence: Vec<Evidence>,

    /// Total views in the recent window
    pub estimated_size: u64,
    pub platforms: BTreeSet<Platform>,

    /// Earliest record of the category in the recent window
    pub first_detected_at: Option<DateTime<Utc>>,
}

/// Tuning knobs for emerging detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmergingParams {
    /// Minimum recent videos for a novel category
    pub min_video_count: u64,

    /// Growth ratio (e.g. 2.0 = +200%) a category must exceed
    pub growth_threshold: f64,

    /// Maximum number of results
    pub top_n: usize,
}

impl Default for EmergingParams {
    fn default() -> Self {
        Self {
            min_video_count: 3,
            growth_threshold: 2.0,
            top_n: 10,
        }
    }
}

/// Per-category facts from the recent window that aggregation does not keep
#[derive(Default)]
struct RecentFacts {
    platforms: BTreeSet<Platform>,
    hashtags: BTreeSet<String>,
    first_seen: Option<DateTime<Utc>>,
}

fn collect_recent_facts(recent: &[TrendRecord]) -> HashMap<&str, RecentFacts> {
    let mut facts: HashMap<&str, RecentFacts> = HashMap::new();
    for record in recent {
        let entry = facts.entry(record.category_name()).or_default();
        entry.platforms.insert(record.platform);
        entry.hashtags.extend(record.normalized_hashtags());
        entry.first_seen = Some(match entry.first_seen {
            Some(seen) if seen <= record.timestamp => seen,
            _ => record.timestamp,
        });
    }
    facts
}

/// Clamp a score into `[0.0, MAX_CONFIDENCE]`
fn bounded(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, MAX_CONFIDENCE)
    }
}

fn novel_confidence(metrics: &CategoryMetrics, evidence_count: usize) -> f64 {
    let volume = (metrics.video_count as f64 * 0.05).min(0.3);
    let reach = (metrics.total_views as f64 / 1_000_000.0 * 0.1).min(0.2);
    let support = (evidence_count as f64 * 0.05).min(0.2);
    bounded(0.3 + volume + reach + support)
}

fn novel_category(metrics: &CategoryMetrics, facts: Option<&RecentFacts>) -> EmergingCategory {
    let mut evidence = Vec::new();

    if let Some(facts) = facts.filter(|f| !f.hashtags.is_empty()) {
        let sample: Vec<String> = facts
            .hashtags
            .iter()
            .take(HASHTAG_SAMPLE)
            .map(|tag| format!("#{tag}"))
            .collect();
        evidence.push(Evidence::new(
            EvidenceType::Hashtag,
            sample.join(", "),
            format!(
                "{} distinct hashtags used across {} videos",
                facts.hashtags.len(),
                metrics.video_count
            ),
        ));
    }

    evidence.push(Evidence::new(
        EvidenceType::GrowthRate,
        metrics.total_views.to_string(),
        format!(
            "Initial traction: {} views across {} videos in a category not seen before",
            metrics.total_views, metrics.video_count
        ),
    ));

    EmergingCategory {
        name: metrics.category.clone(),
        category: metrics.category.clone(),
        rule: EmergingRule::Novel,
        confidence: novel_confidence(metrics, evidence.len()),
        evidence,
        estimated_size: metrics.total_views,
        platforms: facts.map(|f| f.platforms.clone()).unwrap_or_default(),
        first_detected_at: facts.and_then(|f| f.first_seen),
    }
}

fn rapid_growth_category(
    recent: &CategoryMetrics,
    older: &CategoryMetrics,
    growth: f64,
    facts: Option<&RecentFacts>,
) -> EmergingCategory {
    let evidence = vec![
        Evidence::new(
            EvidenceType::GrowthRate,
            format!("{:.0}%", growth * 100.0),
            format!(
                "Views grew from {} to {}",
                older.total_views, recent.total_views
            ),
        ),
        Evidence::new(
            EvidenceType::TitlePattern,
            format!("{} vs {} videos", older.video_count, recent.video_count),
            format!(
                "Video count changed by {}",
                recent.video_count as i128 - older.video_count as i128
            ),
        ),
    ];

    EmergingCategory {
        name: format!("{} (rapid growth)", recent.category),
        category: recent.category.clone(),
        rule: EmergingRule::RapidGrowth,
        confidence: bounded(0.5 + growth * 0.2),
        evidence,
        estimated_size: recent.total_views,
        platforms: facts.map(|f| f.platforms.clone()).unwrap_or_default(),
        first_detected_at: facts.and_then(|f| f.first_seen),
    }
}

/// Detect emerging categories between an older and a recent window
///
/// Both rules run independently, so a category may appear twice (once per
/// rule). Results are sorted by confidence descending, ties by name, and
/// truncated to `params.top_n`.
#[must_use]
pub fn detect_emerging(
    recent: &[TrendRecord],
    older: &[TrendRecord],
    params: &EmergingParams,
) -> Vec<EmergingCategory> {
    let recent_metrics = aggregate(recent);
    let older_metrics = aggregate(older);
    let facts = collect_recent_facts(recent);

    let mut found = Vec::new();

    for (category, metrics) in &recent_metrics {
        let category_facts = facts.get(category.as_str());
        match older_metrics.get(category) {
            None => {
                if metrics.video_count >= params.min_video_count {
                    found.push(novel_category(metrics, category_facts));
                }
            }
            Some(previous) => {
                if previous.total_views == 0 {
                    continue;
                }
                let base = previous.total_views as f64;
                let growth = (metrics.total_views as f64 - base) / base;
                if growth > params.growth_threshold {
                    found.push(rapid_growth_category(
                        metrics,
                        previous,
                        growth,
                        category_facts,
                    ));
                }
            }
        }
    }

    found.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    found.truncate(params.top_n);

    tracing::debug!(
        recent_categories = recent_metrics.len(),
        older_categories = older_metrics.len(),
        emerging = found.len(),
        "Detected emerging categories"
    );

    found
}

/// Window-checked variant of [`detect_emerging`]
///
/// `older_window` must be the same kind as `recent_window` and strictly
/// precede it.
pub fn detect_emerging_windows(
    recent_window: Window,
    recent: &[TrendRecord],
    older_window: Window,
    older: &[TrendRecord],
    params: &EmergingParams,
) -> AnalysisResult<Vec<EmergingCategory>> {
    recent_window.ensure_precedes(&older_window)?;
    Ok(detect_emerging(recent, older, params))
}
