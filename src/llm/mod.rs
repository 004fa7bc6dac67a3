//! Narration boundary between the analytics engine and a text generator
//!
//! The engine never talks to a language model directly. It builds a
//! [`StructuredSummary`] and hands it to an [`InsightNarrator`]. Narration is
//! an enrichment: any failure, timeout or empty answer degrades to a
//! deterministic template built from the same summary.

pub mod extract;
pub mod ollama;
pub mod summary;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub use extract::{extract_json, parse_category_narration, CategoryNarration};
pub use ollama::OllamaNarrator;
pub use summary::StructuredSummary;

/// Result type for narration
pub type NarrationResult<T> = Result<T, NarrationError>;

/// Reasons a narrator could not produce text
#[derive(Debug, Error)]
pub enum NarrationError {
    #[error("Narration timed out after {0:?}")]
    Timeout(Duration),

    /// Service down, quota exhausted or not configured
    #[error("Narrator unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed narrator response: {0}")]
    Malformed(String),

    #[error("Narrator HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Text generator that phrases structured analysis results
#[async_trait]
pub trait InsightNarrator: Send + Sync {
    /// Narrator name for logs
    fn name(&self) -> &str;

    /// Turn a structured summary into prose
    async fn narrate(&self, summary: &StructuredSummary) -> NarrationResult<String>;
}

/// Narrator that is never available
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNarrator;

#[async_trait]
impl InsightNarrator for NullNarrator {
    fn name(&self) -> &str {
        "null"
    }

    async fn narrate(&self, _summary: &StructuredSummary) -> NarrationResult<String> {
        Err(NarrationError::Unavailable("no narrator configured".to_string()))
    }
}

/// Where an insight's text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSource {
    Narrated,
    Fallback,
}

/// Human-readable insight attached to an analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub text: String,
    pub source: InsightSource,
}

impl Insight {
    #[must_use]
    pub fn narrated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: InsightSource::Narrated,
        }
    }

    /// Deterministic template text for a summary
    #[must_use]
    pub fn fallback(summary: &StructuredSummary) -> Self {
        Self {
            text: summary.fallback_text(),
            source: InsightSource::Fallback,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == InsightSource::Fallback
    }
}

/// Ask `narrator` for text within `timeout`, falling back to the template
///
/// On timeout the narration future is dropped, which cancels the request.
pub async fn narrate_or_fallback(
    narrator: Option<&dyn InsightNarrator>,
    summary: &StructuredSummary,
    timeout: Duration,
) -> Insight {
    let Some(narrator) = narrator else {
        return Insight::fallback(summary);
    };

    match tokio::time::timeout(timeout, narrator.narrate(summary)).await {
        Ok(Ok(text)) if !text.trim().is_empty() => Insight::narrated(text.trim()),
        Ok(Ok(_)) => {
            tracing::warn!(narrator = narrator.name(), "Narrator returned empty text, using fallback");
            Insight::fallback(summary)
        }
        Ok(Err(e)) => {
            tracing::warn!(narrator = narrator.name(), error = %e, "Narration failed, using fallback");
            Insight::fallback(summary)
        }
        Err(_) => {
            tracing::warn!(
                narrator = narrator.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Narration timed out, using fallback"
            );
            Insight::fallback(summary)
        }
    }
}
