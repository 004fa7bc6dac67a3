//! Growth rates between two comparable windows

use serde::Serialize;
use std::collections::HashMap;

use super::error::AnalysisResult;
use super::metrics::{aggregate, CategoryMetrics};
use crate::models::{TrendRecord, Window};

/// Percent change in total views from `previous` to `current`
///
/// Returns 0 when there is no previous aggregate or it had no views.
#[must_use]
pub fn growth_rate(current: &CategoryMetrics, previous: Option<&CategoryMetrics>) -> f64 {
    match previous {
        Some(prev) if prev.total_views > 0 => {
            let base = prev.total_views as f64;
            (current.total_views as f64 - base) / base * 100.0
        }
        _ => 0.0,
    }
}

/// Category metrics tagged with the window they were aggregated from
#[derive(Debug, Clone, Serialize)]
pub struct WindowedMetrics {
    pub window: Window,
    pub metrics: HashMap<String, CategoryMetrics>,
}

impl WindowedMetrics {
    #[must_use]
    pub fn new(window: Window, metrics: HashMap<String, CategoryMetrics>) -> Self {
        Self { window, metrics }
    }

    /// Aggregate the records of a window
    #[must_use]
    pub fn from_records(window: Window, records: &[TrendRecord]) -> Self {
        Self::new(window, aggregate(records))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// Fill `growth_rate_percent` on every category of `current`
///
/// `previous` must be the same window kind and strictly earlier; otherwise
/// the comparison is rejected with `WindowMismatch`.
pub fn apply_growth(
    current: &mut WindowedMetrics,
    previous: &WindowedMetrics,
) -> AnalysisResult<()> {
    current.window.ensure_precedes(&previous.window)?;

    for (category, metrics) in &mut current.metrics {
        metrics.growth_rate_percent = growth_rate(metrics, previous.metrics.get(category));
    }

    tracing::debug!(
        current = %current.window,
        previous = %previous.window,
        categories = current.metrics.len(),
        "Applied growth rates"
    );

    Ok(())
}
