//! Category analytics: aggregation, growth, correlation, clustering and
//! emerging-category detection
//!
//! Every algorithm in this module is a pure function of its input records.
//! [`engine::CategoryAnalyzer`] wires them to a record source and an optional
//! narrator.

pub mod clustering;
pub mod correlation;
pub mod emerging;
pub mod engine;
pub mod error;
pub mod growth;
pub mod metrics;

pub use clustering::{cluster, Cluster, DEFAULT_CORRELATION_THRESHOLD};
pub use correlation::{correlate, CorrelationEntry};
pub use emerging::{
    detect_emerging, detect_emerging_windows, EmergingCategory, EmergingParams, EmergingRule,
    Evidence, EvidenceType,
};
pub use engine::{CategoryAnalysisReport, CategoryAnalyzer, CategoryRelations};
pub use error::{AnalysisError, AnalysisResult};
pub use growth::{apply_growth, growth_rate, WindowedMetrics};
pub use metrics::{aggregate, ranked, CategoryMetrics};
