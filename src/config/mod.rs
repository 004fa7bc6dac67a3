//! Configuration management for trendscope
//!
//! Settings come from environment variables, a TOML file, or defaults. The
//! analytics core never reads them itself: callers pass [`AnalysisConfig`]
//! explicitly.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::analytics::EmergingParams;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Analysis knobs
    pub analysis: AnalysisConfig,

    /// Narrator configuration
    pub narrator: NarratorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Knobs of the analytics engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum Jaccard score for two categories to share a cluster
    pub correlation_threshold: f64,

    /// Minimum recent items for a novel category to be reported
    pub min_video_count: u64,

    /// Growth ratio a known category must exceed (2.0 = +200%)
    pub growth_threshold: f64,

    /// Maximum number of emerging categories returned
    pub emerging_top_n: usize,

    /// Per-call narration deadline in seconds
    pub narration_timeout_secs: u64,

    /// Windows (ending at the requested one) fed to relation analysis
    pub relation_lookback_windows: usize,

    /// Maximum subcategories attached to a category report
    pub max_subcategories: usize,
}

/// Text narrator (Ollama) configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarratorConfig {
    /// Use the narrator at all
    pub enabled: bool,

    /// Ollama base URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Maximum generated tokens
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl AnalysisConfig {
    #[must_use]
    pub fn narration_timeout(&self) -> Duration {
        Duration::from_secs(self.narration_timeout_secs)
    }

    /// Parameters for emerging detection
    #[must_use]
    pub fn emerging_params(&self) -> EmergingParams {
        EmergingParams {
            min_video_count: self.min_video_count,
            growth_threshold: self.growth_threshold,
            top_n: self.emerging_top_n,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let emerging = EmergingParams::default();
        Self {
            correlation_threshold: crate::analytics::DEFAULT_CORRELATION_THRESHOLD,
            min_video_count: emerging.min_video_count,
            growth_threshold: emerging.growth_threshold,
            emerging_top_n: emerging.top_n,
            narration_timeout_secs: 10,
            relation_lookback_windows: 4,
            max_subcategories: 5,
        }
    }
}

impl Default for NarratorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::from("http://localhost:11434"),
            model: String::from("llama3.2"),
            timeout_secs: 30,
            max_tokens: 512,
            temperature: 0.3,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn parsed_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self::from_lookup(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from a key lookup; unset or unparsable keys keep
    /// their defaults
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let a = defaults.analysis;
        let n = defaults.narrator;

        let analysis = AnalysisConfig {
            correlation_threshold: parsed_or(
                &lookup,
                "TRENDSCOPE_CORRELATION_THRESHOLD",
                a.correlation_threshold,
            ),
            min_video_count: parsed_or(&lookup, "TRENDSCOPE_MIN_VIDEO_COUNT", a.min_video_count),
            growth_threshold: parsed_or(&lookup, "TRENDSCOPE_GROWTH_THRESHOLD", a.growth_threshold),
            emerging_top_n: parsed_or(&lookup, "TRENDSCOPE_EMERGING_TOP_N", a.emerging_top_n),
            narration_timeout_secs: parsed_or(
                &lookup,
                "TRENDSCOPE_NARRATION_TIMEOUT",
                a.narration_timeout_secs,
            ),
            relation_lookback_windows: parsed_or(
                &lookup,
                "TRENDSCOPE_RELATION_LOOKBACK",
                a.relation_lookback_windows,
            ),
            max_subcategories: parsed_or(
                &lookup,
                "TRENDSCOPE_MAX_SUBCATEGORIES",
                a.max_subcategories,
            ),
        };

        let narrator = NarratorConfig {
            enabled: parsed_or(&lookup, "TRENDSCOPE_NARRATOR_ENABLED", n.enabled),
            endpoint: lookup("OLLAMA_ENDPOINT")
                .or_else(|| lookup("OLLAMA_HOST"))
                .unwrap_or(n.endpoint),
            model: lookup("OLLAMA_MODEL").unwrap_or(n.model),
            timeout_secs: parsed_or(&lookup, "OLLAMA_TIMEOUT", n.timeout_secs),
            max_tokens: parsed_or(&lookup, "OLLAMA_MAX_TOKENS", n.max_tokens),
            temperature: parsed_or(&lookup, "OLLAMA_TEMPERATURE", n.temperature),
        };

        let logging = LoggingConfig {
            level: lookup("TRENDSCOPE_LOG_LEVEL").unwrap_or(defaults.logging.level),
            format: lookup("TRENDSCOPE_LOG_FORMAT").unwrap_or(defaults.logging.format),
        };

        Self {
            analysis,
            narrator,
            logging,
        }
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let a = &self.analysis;

        if !(0.0..=1.0).contains(&a.correlation_threshold) {
            anyhow::bail!(
                "correlation_threshold must be within [0, 1], got {}",
                a.correlation_threshold
            );
        }

        if !a.growth_threshold.is_finite() || a.growth_threshold < 0.0 {
            anyhow::bail!("growth_threshold must be a non-negative number");
        }

        if a.emerging_top_n == 0 {
            anyhow::bail!("emerging_top_n must be greater than 0");
        }

        if a.narration_timeout_secs == 0 {
            anyhow::bail!("narration_timeout_secs must be greater than 0");
        }

        if a.relation_lookback_windows == 0 {
            anyhow::bail!("relation_lookback_windows must be greater than 0");
        }

        if self.narrator.enabled && self.narrator.endpoint.trim().is_empty() {
            anyhow::bail!("narrator endpoint must be set when the narrator is enabled");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("log format must be 'text' or 'json', got '{}'", self.logging.format);
        }

        Ok(())
    }
}
