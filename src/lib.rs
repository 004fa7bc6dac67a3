//! trendscope - Category analytics for short-form video trends
//!
//! Aggregates trend records into per-category metrics, scores how related
//! categories are, groups them into clusters and flags emerging categories.
//! A text generator can optionally phrase the results.
//!
//! # Architecture
//!
//! - [`models`] - Trend records, platforms and time windows
//! - [`analytics`] - Aggregation, growth, correlation, clustering, emerging detection
//! - [`source`] - Record sources the analyzer reads from
//! - [`llm`] - Narration boundary and the Ollama narrator
//! - [`config`] - Configuration management and settings
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use trendscope::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let source = JsonFileTrendSource::load("records.json").await?;
//!     let analyzer = CategoryAnalyzer::new(Arc::new(source), config.analysis);
//!
//!     let reports = analyzer
//!         .analyze_categories(None, Window::week(15, 2024)?)
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&reports)?);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod source;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analytics::{
        CategoryAnalysisReport, CategoryAnalyzer, CategoryMetrics, CategoryRelations, Cluster,
        CorrelationEntry, EmergingCategory,
    };
    pub use crate::config::{AnalysisConfig, Config};
    pub use crate::error::{Error, ErrorCategory, Result, TrendscopeErrorTrait};
    pub use crate::llm::{Insight, InsightNarrator, OllamaNarrator};
    pub use crate::models::{Platform, TrendRecord, Window, WindowKind};
    pub use crate::source::{InMemoryTrendSource, JsonFileTrendSource, TrendRecordSource};
}

// Direct re-exports for convenience
pub use error::{Error, Result};
pub use models::{Platform, TrendRecord, Window, WindowKind};
