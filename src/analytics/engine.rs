//! Analysis entry points
//!
//! [`CategoryAnalyzer`] fetches the windows it needs from a
//! [`TrendRecordSource`], runs the pure algorithms of this module on them and
//! optionally asks an [`InsightNarrator`] to phrase the results. Narration is
//! time-boxed per call and never fails an analysis.

use futures::future::{join_all, try_join_all};
use serde::Serialize;
use std::sync::Arc;

use super::clustering::{cluster, Cluster};
use super::correlation::{correlate, CorrelationEntry};
use super::emerging::{detect_emerging_windows, EmergingCategory};
use super::error::AnalysisError;
use super::growth::{apply_growth, WindowedMetrics};
use super::metrics::{ranked, CategoryMetrics};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::llm::{
    narrate_or_fallback, parse_category_narration, Insight, InsightNarrator, StructuredSummary,
};
use crate::models::{Platform, TrendRecord, Window};
use crate::source::TrendRecordSource;

/// One category's analysis for a window
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAnalysisReport {
    /// Metrics with growth against the previous window filled in
    pub metrics: CategoryMetrics,

    /// Cluster the category belongs to, if any
    pub cluster: Option<Cluster>,

    /// Other members of that cluster
    pub related_categories: Vec<String>,

    pub subcategories: Vec<String>,

    pub insight: Insight,
}

/// Correlation matrix and clusters over the lookback span
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRelations {
    pub matrix: Vec<CorrelationEntry>,
    pub clusters: Vec<Cluster>,

    /// `None` when fewer than two categories exist, so there is nothing to relate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<Insight>,
}

/// Category analytics over a record source
pub struct CategoryAnalyzer {
    source: Arc<dyn TrendRecordSource>,
    narrator: Option<Arc<dyn InsightNarrator>>,
    config: AnalysisConfig,
}

impl CategoryAnalyzer {
    /// Create an analyzer without a narrator; every insight uses the fallback text
    pub fn new(source: Arc<dyn TrendRecordSource>, config: AnalysisConfig) -> Self {
        Self {
            source,
            narrator: None,
            config,
        }
    }

    /// Attach a narrator
    #[must_use]
    pub fn with_narrator(mut self, narrator: Arc<dyn InsightNarrator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    fn narrator(&self) -> Option<&dyn InsightNarrator> {
        self.narrator.as_deref()
    }

    /// Fetch several windows concurrently, in the order given
    async fn fetch_windows(
        &self,
        platform: Option<Platform>,
        windows: &[Window],
    ) -> Result<Vec<Vec<TrendRecord>>> {
        let fetches = windows
            .iter()
            .map(|window| self.source.fetch_records(platform, *window));
        Ok(try_join_all(fetches).await?)
    }

    fn relations_of(&self, records: &[TrendRecord]) -> Result<(Vec<CorrelationEntry>, Vec<Cluster>)> {
        let matrix = correlate(records);
        let clusters = cluster(&matrix, self.config.correlation_threshold)?;
        Ok((matrix, clusters))
    }

    /// Per-category metrics, growth, clusters and insights for `window`
    ///
    /// Reports are ranked by total views. Fails with `DataUnavailable` when
    /// the window holds no records.
    pub async fn analyze_categories(
        &self,
        platform: Option<Platform>,
        window: Window,
    ) -> Result<Vec<CategoryAnalysisReport>> {
        tracing::info!(
            source = self.source.name(),
            platform = ?platform,
            window = %window,
            "Analyzing categories"
        );

        // Oldest first; the last two windows are `previous` and `window`
        let lookback = self.config.relation_lookback_windows.max(2);
        let windows = window.trailing(lookback);
        let mut fetched = self.fetch_windows(platform, &windows).await?;

        let current_records = fetched.pop().unwrap_or_default();
        if current_records.is_empty() {
            return Err(AnalysisError::DataUnavailable { window, platform }.into());
        }
        let previous_records = fetched.last().cloned().unwrap_or_default();

        let mut current = WindowedMetrics::from_records(window, &current_records);
        let previous = WindowedMetrics::from_records(window.previous(), &previous_records);
        apply_growth(&mut current, &previous)?;

        let relation_span = self.config.relation_lookback_windows.max(1);
        let mut relation_records: Vec<TrendRecord> = fetched
            .into_iter()
            .rev()
            .take(relation_span - 1)
            .flatten()
            .collect();
        relation_records.extend(current_records);
        let (_, clusters) = self.relations_of(&relation_records)?;

        let reports = ranked(current.metrics)
            .into_iter()
            .map(|metrics| {
                let cluster = clusters.iter().find(|c| c.contains(&metrics.category)).cloned();
                self.category_report(platform, window, metrics, cluster)
            });
        let reports = join_all(reports).await;

        tracing::info!(
            window = %window,
            categories = reports.len(),
            narrated = reports.iter().filter(|r| !r.insight.is_fallback()).count(),
            "Category analysis complete"
        );

        Ok(reports)
    }

    async fn category_report(
        &self,
        platform: Option<Platform>,
        window: Window,
        metrics: CategoryMetrics,
        cluster: Option<Cluster>,
    ) -> CategoryAnalysisReport {
        let related_categories = cluster
            .as_ref()
            .map(|c| c.neighbors_of(&metrics.category))
            .unwrap_or_default();

        let summary = StructuredSummary::CategoryInsight {
            platform,
            window,
            metrics: metrics.clone(),
            related_categories: related_categories.clone(),
        };

        let narrated =
            narrate_or_fallback(self.narrator(), &summary, self.config.narration_timeout()).await;

        let (insight, mut subcategories) = if narrated.is_fallback() {
            (narrated, Vec::new())
        } else {
            let parsed = parse_category_narration(&narrated.text);
            let insight = match parsed.insight {
                Some(text) => Insight::narrated(text),
                None => Insight::fallback(&summary),
            };
            (insight, parsed.subcategories)
        };

        if subcategories.is_empty() {
            subcategories = metrics.top_hashtags.clone();
        }
        subcategories.truncate(self.config.max_subcategories);

        CategoryAnalysisReport {
            metrics,
            cluster,
            related_categories,
            subcategories,
            insight,
        }
    }

    /// Categories that appeared or grew sharply in `window` relative to the
    /// window before it
    pub async fn detect_emerging_categories(
        &self,
        platform: Option<Platform>,
        window: Window,
    ) -> Result<Vec<EmergingCategory>> {
        tracing::info!(
            source = self.source.name(),
            platform = ?platform,
            window = %window,
            "Detecting emerging categories"
        );

        let older_window = window.previous();
        let (recent, older) = tokio::try_join!(
            self.source.fetch_records(platform, window),
            self.source.fetch_records(platform, older_window),
        )?;

        if recent.is_empty() {
            return Err(AnalysisError::DataUnavailable { window, platform }.into());
        }

        let emerging = detect_emerging_windows(
            window,
            &recent,
            older_window,
            &older,
            &self.config.emerging_params(),
        )?;

        tracing::info!(window = %window, emerging = emerging.len(), "Emerging detection complete");

        Ok(emerging)
    }

    /// Narrated (or template) description of an emerging-category result
    pub async fn narrate_emerging(
        &self,
        platform: Option<Platform>,
        window: Window,
        emerging: &[EmergingCategory],
    ) -> Insight {
        let summary = StructuredSummary::Emerging {
            platform,
            window,
            emerging: emerging.to_vec(),
        };
        narrate_or_fallback(self.narrator(), &summary, self.config.narration_timeout()).await
    }

    /// Correlation matrix and clusters over the lookback span ending at `window`
    pub async fn analyze_category_relations(
        &self,
        platform: Option<Platform>,
        window: Window,
    ) -> Result<CategoryRelations> {
        let windows = window.trailing(self.config.relation_lookback_windows.max(1));

        tracing::info!(
            source = self.source.name(),
            platform = ?platform,
            from = %windows[0],
            to = %window,
            "Analyzing category relations"
        );

        let records: Vec<TrendRecord> = self
            .fetch_windows(platform, &windows)
            .await?
            .into_iter()
            .flatten()
            .collect();

        if records.is_empty() {
            return Err(AnalysisError::DataUnavailable { window, platform }.into());
        }

        let (matrix, clusters) = self.relations_of(&records)?;

        let insight = if matrix.is_empty() {
            None
        } else {
            let summary = StructuredSummary::Relations {
                platform,
                window,
                correlations: matrix.clone(),
                clusters: clusters.clone(),
            };
            Some(narrate_or_fallback(self.narrator(), &summary, self.config.narration_timeout()).await)
        };

        tracing::info!(
            window = %window,
            pairs = matrix.len(),
            clusters = clusters.len(),
            "Relation analysis complete"
        );

        Ok(CategoryRelations {
            matrix,
            clusters,
            insight,
        })
    }
}
