//! Read-only record sources
//!
//! The analytics engine never queries storage itself. It asks a
//! [`TrendRecordSource`] for the immutable records of one window, which keeps
//! the engine independent of the persistence layer:
//!
//! ```text
//! ┌──────────────────────────────┐
//! │       CategoryAnalyzer       │
//! └──────────────────────────────┘
//!                │ fetch_records(platform, window)
//!                ▼
//! ┌──────────────────────────────┐
//! │      TrendRecordSource       │
//! └──────────────────────────────┘
//!        │                │
//!        ▼                ▼
//! ┌─────────────┐  ┌─────────────┐
//! │  In-memory  │  │  JSON file  │   (database-backed sources live outside the crate)
//! └─────────────┘  └─────────────┘
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{Platform, TrendRecord, Window};

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors raised by record sources
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read records from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode records: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend-specific failure (database, remote API)
    #[error("Record source failed: {0}")]
    Backend(String),
}

/// Query surface returning trend records for a window
///
/// Implementations return an empty vector, not an error, for a window
/// without data.
#[async_trait]
pub trait TrendRecordSource: Send + Sync {
    /// Source name for logs
    fn name(&self) -> &str;

    /// Fetch records of `window`, restricted to `platform` when given
    async fn fetch_records(
        &self,
        platform: Option<Platform>,
        window: Window,
    ) -> SourceResult<Vec<TrendRecord>>;
}

/// Source over an owned vector of records
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrendSource {
    records: Vec<TrendRecord>,
}

impl InMemoryTrendSource {
    #[must_use]
    pub fn new(records: Vec<TrendRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn select(&self, platform: Option<Platform>, window: Window) -> Vec<TrendRecord> {
        self.records
            .iter()
            .filter(|r| platform.map_or(true, |p| r.platform == p))
            .filter(|r| window.contains(r))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TrendRecordSource for InMemoryTrendSource {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn fetch_records(
        &self,
        platform: Option<Platform>,
        window: Window,
    ) -> SourceResult<Vec<TrendRecord>> {
        Ok(self.select(platform, window))
    }
}

/// Source backed by a JSON array of records on disk, loaded once
#[derive(Debug, Clone)]
pub struct JsonFileTrendSource {
    path: PathBuf,
    inner: InMemoryTrendSource,
}

impl JsonFileTrendSource {
    /// Load all records from `path`
    pub async fn load(path: impl AsRef<Path>) -> SourceResult<Self> {
        let path = path.as_ref().to_path_buf();
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| SourceError::Io {
                path: path.clone(),
                source,
            })?;
        let records: Vec<TrendRecord> = serde_json::from_str(&content)?;

        tracing::info!(path = %path.display(), records = records.len(), "Loaded trend records");

        Ok(Self {
            path,
            inner: InMemoryTrendSource::new(records),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl TrendRecordSource for JsonFileTrendSource {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn fetch_records(
        &self,
        platform: Option<Platform>,
        window: Window,
    ) -> SourceResult<Vec<TrendRecord>> {
        self.inner.fetch_records(platform, window).await
    }
}
