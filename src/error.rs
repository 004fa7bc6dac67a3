//! Unified error handling for the trendscope crate
//!
//! Each module keeps its own error enum. [`Error`] wraps them so the engine's
//! entry points can return one type across module boundaries.
//!
//! # Architecture
//!
//! - [`TrendscopeErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use trendscope::error::{Error, TrendscopeErrorTrait};
//!
//! fn report(err: &Error) {
//!     if err.is_recoverable() {
//!         println!("{}", err.user_message());
//!     } else {
//!         eprintln!("Fatal error: {err}");
//!     }
//! }
//! ```

use thiserror::Error;

pub use crate::analytics::AnalysisError;
pub use crate::llm::NarrationError;
pub use crate::source::SourceError;

/// Common interface for trendscope errors
pub trait TrendscopeErrorTrait: std::error::Error {
    /// Whether a caller can reasonably retry or ask for a different window
    fn is_recoverable(&self) -> bool;

    /// Short message suitable for end users
    fn user_message(&self) -> String;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The requested window holds no records
    NoData,
    /// Invalid or incompatible window descriptors and thresholds
    Window,
    /// Record source failures
    Source,
    /// Narrator failures
    Narration,
    /// Configuration and validation errors
    Config,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoData => "no_data",
            Self::Window => "window",
            Self::Source => "source",
            Self::Narration => "narration",
            Self::Config => "config",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the trendscope crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Narration error: {0}")]
    Narration(#[from] NarrationError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors raised by anyhow-based layers, with their context chain
    #[error("{0:#}")]
    Other(#[from] anyhow::Error),
}

impl TrendscopeErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Analysis(e) => e.is_no_data(),
            Self::Narration(_) => true,
            Self::Source(SourceError::Backend(_)) => true,
            Self::Source(_) => false,
            Self::Json(_) | Self::Config(_) | Self::Other(_) => false,
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::Analysis(AnalysisError::DataUnavailable { window, .. }) => {
                format!("No data is available for {window}. Try another period.")
            }
            Self::Analysis(e) => format!("Invalid request: {e}"),
            Self::Narration(_) => "Insight text is temporarily unavailable.".to_string(),
            Self::Source(e) => format!("Could not load trend data: {e}"),
            Self::Config(msg) => format!("Configuration problem: {msg}"),
            Self::Json(e) => format!("Invalid JSON: {e}"),
            Self::Other(e) => format!("{e:#}"),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Analysis(e) if e.is_no_data() => ErrorCategory::NoData,
            Self::Analysis(_) => ErrorCategory::Window,
            Self::Narration(_) => ErrorCategory::Narration,
            Self::Source(_) | Self::Json(_) => ErrorCategory::Source,
            Self::Config(_) => ErrorCategory::Config,
            Self::Other(_) => ErrorCategory::Other,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error means "no records in the requested window"
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::Analysis(e) if e.is_no_data())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
