//! Serializable context handed to narrators, and the fallback templates
//! used when no narration is available

use serde::{Deserialize, Serialize};

use crate::analytics::{CategoryMetrics, Cluster, CorrelationEntry, EmergingCategory};
use crate::models::{Platform, Window};

/// Structured analysis result passed across the narration boundary
///
/// Built only from analysis outputs; it carries no database or HTTP handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuredSummary {
    /// One category's metrics for a window
    CategoryInsight {
        platform: Option<Platform>,
        window: Window,
        metrics: CategoryMetrics,
        related_categories: Vec<String>,
    },

    /// Correlation matrix and clusters over a span of windows
    Relations {
        platform: Option<Platform>,
        window: Window,
        correlations: Vec<CorrelationEntry>,
        clusters: Vec<Cluster>,
    },

    /// Emerging categories between two windows
    Emerging {
        platform: Option<Platform>,
        window: Window,
        emerging: Vec<EmergingCategory>,
    },
}

impl StructuredSummary {
    #[must_use]
    pub fn window(&self) -> Window {
        match self {
            Self::CategoryInsight { window, .. }
            | Self::Relations { window, .. }
            | Self::Emerging { window, .. } => *window,
        }
    }

    #[must_use]
    pub fn platform(&self) -> Option<Platform> {
        match self {
            Self::CategoryInsight { platform, .. }
            | Self::Relations { platform, .. }
            | Self::Emerging { platform, .. } => *platform,
        }
    }

    /// Deterministic description derived only from the structured data
    #[must_use]
    pub fn fallback_text(&self) -> String {
        let scope = match self.platform() {
            Some(p) => format!("{} on {p}", self.window()),
            None => self.window().to_string(),
        };

        match self {
            Self::CategoryInsight {
                metrics,
                related_categories,
                window,
                ..
            } => {
                let mut text = format!(
                    "{} had {} items totaling {} views in {scope} ({:+.1}% vs the previous {}).",
                    metrics.category,
                    metrics.video_count,
                    metrics.total_views,
                    metrics.growth_rate_percent,
                    window.kind()
                );
                if !related_categories.is_empty() {
                    text.push_str(&format!(
                        " Closely related: {}.",
                        related_categories.join(", ")
                    ));
                }
                text
            }
            Self::Relations {
                correlations,
                clusters,
                ..
            } => match clusters.first() {
                None => format!(
                    "No category clusters found across {} category pairs in {scope}.",
                    correlations.len()
                ),
                Some(top) => format!(
                    "Found {} category cluster(s) in {scope}; the largest groups {} (average correlation {:.2}).",
                    clusters.len(),
                    top.categories.iter().cloned().collect::<Vec<_>>().join(", "),
                    top.avg_correlation
                ),
            },
            Self::Emerging { emerging, .. } => match emerging.first() {
                None => format!("No emerging categories detected in {scope}."),
                Some(top) => format!(
                    "{} emerging categor{} detected in {scope}; strongest signal: {} (confidence {:.2}, {} views).",
                    emerging.len(),
                    if emerging.len() == 1 { "y" } else { "ies" },
                    top.name,
                    top.confidence,
                    top.estimated_size
                ),
            },
        }
    }
}
