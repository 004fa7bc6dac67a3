//! Error types for the analytics engine

use thiserror::Error;

use crate::models::{Platform, Window, WindowKind};

/// Result type for analytics operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors that can occur during category analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The record source returned nothing for the requested window
    #[error("No trend data for {window}{}", platform_suffix(.platform))]
    DataUnavailable {
        window: Window,
        platform: Option<Platform>,
    },

    /// Two windows of different kinds, or in the wrong order, were compared
    #[error("Window mismatch: cannot compare {current} against {previous}")]
    WindowMismatch { current: Window, previous: Window },

    #[error("Invalid threshold: {0} (must be within 0.0..=1.0)")]
    InvalidThreshold(f64),

    #[error("Invalid {kind} window {number} for {year}: must be within 1..={max}")]
    InvalidWindow {
        kind: WindowKind,
        number: u32,
        year: i32,
        max: u32,
    },
}

fn platform_suffix(platform: &Option<Platform>) -> String {
    platform.map(|p| format!(" on {p}")).unwrap_or_default()
}

impl AnalysisError {
    /// "No data" is an expected state rather than an engine failure
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. })
    }
}
