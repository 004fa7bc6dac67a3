//! Error scenario integration tests
//!
//! Tests how failures surface to callers:
//! 1. Empty windows report "no data" rather than an engine failure
//! 2. Record source failures
//! 3. Invalid configuration reaching the analyzer
//! 4. Unreadable record files

use std::io::Write;
use std::sync::Arc;

use trendscope::analytics::{AnalysisError, CategoryAnalyzer};
use trendscope::config::AnalysisConfig;
use trendscope::error::{Error, ErrorCategory, TrendscopeErrorTrait};
use trendscope::source::{InMemoryTrendSource, JsonFileTrendSource, SourceError};
use trendscope::{Platform, Window};

use crate::common::{cooking_and_ai_tools, week_window, FailingSource};

fn analyzer() -> CategoryAnalyzer {
    CategoryAnalyzer::new(
        Arc::new(InMemoryTrendSource::new(cooking_and_ai_tools())),
        AnalysisConfig::default(),
    )
}

// ============================================================================
// No Data
// ============================================================================

#[tokio::test]
async fn test_empty_window_is_no_data() {
    let window = Window::week(40, 2024).unwrap();

    for result in [
        analyzer().analyze_categories(None, window).await.map(|_| ()),
        analyzer().detect_emerging_categories(None, window).await.map(|_| ()),
        analyzer().analyze_category_relations(None, window).await.map(|_| ()),
    ] {
        let err = result.unwrap_err();
        assert!(err.is_no_data());
        assert_eq!(err.category(), ErrorCategory::NoData);
        assert!(err.is_recoverable());
    }
}

#[tokio::test]
async fn test_no_data_names_platform() {
    let err = analyzer()
        .analyze_categories(Some(Platform::Instagram), week_window())
        .await
        .unwrap_err();

    match err {
        Error::Analysis(AnalysisError::DataUnavailable { platform, window }) => {
            assert_eq!(platform, Some(Platform::Instagram));
            assert_eq!(window, week_window());
        }
        other => panic!("Expected DataUnavailable, got: {other:?}"),
    }
}

// ============================================================================
// Source Failures
// ============================================================================

#[tokio::test]
async fn test_source_failure_propagates() {
    let analyzer = CategoryAnalyzer::new(Arc::new(FailingSource), AnalysisConfig::default());

    let err = analyzer
        .analyze_categories(None, week_window())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Source(SourceError::Backend(_))));
    assert_eq!(err.category(), ErrorCategory::Source);
    assert!(!err.is_no_data());
}

#[tokio::test]
async fn test_missing_records_file() {
    let err = JsonFileTrendSource::load("/nonexistent/trendscope.json")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/trendscope.json"));
}

#[tokio::test]
async fn test_records_with_unknown_platform() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"[{"id": "1", "platform": "MYSPACE", "timestamp": "2024-04-09T12:00:00Z", "weekNumber": 15, "monthNumber": 4, "year": 2024}]"#,
    )
    .unwrap();

    let err: Error = JsonFileTrendSource::load(file.path())
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.category(), ErrorCategory::Source);
}

// ============================================================================
// Invalid Configuration
// ============================================================================

#[tokio::test]
async fn test_invalid_threshold_rejected() {
    let analyzer = CategoryAnalyzer::new(
        Arc::new(InMemoryTrendSource::new(cooking_and_ai_tools())),
        AnalysisConfig {
            correlation_threshold: -0.1,
            ..AnalysisConfig::default()
        },
    );

    let err = analyzer
        .analyze_categories(None, week_window())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Analysis(AnalysisError::InvalidThreshold(_))
    ));
    assert_eq!(err.category(), ErrorCategory::Window);
    assert!(!err.is_recoverable());
}

#[test]
fn test_invalid_window_rejected() {
    assert!(matches!(
        Window::week(54, 2024),
        Err(AnalysisError::InvalidWindow { .. })
    ));
    assert!(Window::month(0, 2024).is_err());
}

// ============================================================================
// Crate-level Result
// ============================================================================

fn load(path: &std::path::Path, week: u32) -> trendscope::Result<(trendscope::config::Config, Window)> {
    let config = trendscope::config::Config::from_file(path)?;
    let window = Window::week(week, 2024)?;
    Ok((config, window))
}

#[test]
fn test_crate_result_carries_config_and_window_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[analysis]\ncorrelation_threshold = 1.5\n").unwrap();

    let err: trendscope::Error = load(file.path(), 15).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Other);
    assert!(err.to_string().contains("correlation_threshold"));

    let valid = tempfile::NamedTempFile::new().unwrap();
    let err = load(valid.path(), 54).unwrap_err();
    assert!(matches!(err, Error::Analysis(AnalysisError::InvalidWindow { .. })));
    assert!(load(valid.path(), 15).is_ok());
}
