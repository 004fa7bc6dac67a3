//! Analyzer end-to-end tests
//!
//! Exercises the full fetch → aggregate → relate → narrate path:
//! 1. Category reports with growth and clusters
//! 2. Emerging detection across two weeks
//! 3. Relation analysis over the lookback span
//! 4. Narration that never answers

use chrono::{Duration, TimeZone, Utc};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use trendscope::analytics::{CategoryAnalyzer, EmergingRule};
use trendscope::config::AnalysisConfig;
use trendscope::source::{InMemoryTrendSource, JsonFileTrendSource};
use trendscope::{Platform, TrendRecord, Window};

use crate::common::{
    cooking_and_ai_tools, create_batch, create_record, last_week, this_week, week_window,
    StalledNarrator,
};

fn analyzer(records: Vec<TrendRecord>) -> CategoryAnalyzer {
    CategoryAnalyzer::new(
        Arc::new(InMemoryTrendSource::new(records)),
        AnalysisConfig::default(),
    )
}

/// A–B and B–C share 4 of 6 tags, A–C only 2 of 6
fn transitive_records() -> Vec<TrendRecord> {
    let mut records = create_batch("a", this_week(), "A", 1, 100, &["t1", "t2", "t3", "t4"]);
    records.extend(create_batch(
        "b",
        this_week(),
        "B",
        1,
        200,
        &["t1", "t2", "t3", "t4", "t5", "t6"],
    ));
    records.extend(create_batch("c", this_week(), "C", 1, 300, &["t3", "t4", "t5", "t6"]));
    records
}

// ============================================================================
// Category Reports
// ============================================================================

#[tokio::test]
async fn test_reports_ranked_by_views() {
    let reports = analyzer(cooking_and_ai_tools())
        .analyze_categories(None, week_window())
        .await
        .unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].metrics.category, "AI Tools");
    assert_eq!(reports[0].metrics.total_views, 10_000);
    assert_eq!(reports[1].metrics.category, "Cooking");
    assert_eq!(reports[1].metrics.growth_rate_percent, 0.0);

    // No previous AI Tools data, so no growth
    assert_eq!(reports[0].metrics.growth_rate_percent, 0.0);
    assert_eq!(reports[0].subcategories, vec!["ai", "chatgpt"]);
}

#[tokio::test]
async fn test_reports_carry_transitive_clusters() {
    let reports = analyzer(transitive_records())
        .analyze_categories(None, week_window())
        .await
        .unwrap();

    for report in &reports {
        let cluster = report.cluster.as_ref().expect("every category is clustered");
        assert_eq!(cluster.len(), 3);
        assert_eq!(report.related_categories.len(), 2);
        assert!(!report.related_categories.contains(&report.metrics.category));
    }
}

#[tokio::test]
async fn test_platform_filter() {
    let mut records = cooking_and_ai_tools();
    records.push(
        TrendRecord::new("tt-1", Platform::Tiktok, this_week())
            .with_category("Dance")
            .with_views(50_000),
    );

    let tiktok = analyzer(records.clone())
        .analyze_categories(Some(Platform::Tiktok), week_window())
        .await
        .unwrap();
    assert_eq!(tiktok.len(), 1);
    assert_eq!(tiktok[0].metrics.category, "Dance");

    let all = analyzer(records)
        .analyze_categories(None, week_window())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_stalled_narrator_never_fails_analysis() {
    let config = AnalysisConfig {
        narration_timeout_secs: 1,
        ..AnalysisConfig::default()
    };
    let analyzer = CategoryAnalyzer::new(
        Arc::new(InMemoryTrendSource::new(cooking_and_ai_tools())),
        config,
    )
    .with_narrator(Arc::new(StalledNarrator));

    let started = Instant::now();
    let reports = analyzer
        .analyze_categories(None, week_window())
        .await
        .expect("analysis succeeds without narration");

    // Narrations run concurrently, so the total wait is one timeout, not two
    assert!(started.elapsed().as_secs_f64() < 5.0);
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r.insight.is_fallback()));
    assert!(reports[0].insight.text.contains("AI Tools had 5 items"));
}

#[tokio::test]
async fn test_json_file_source_end_to_end() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let json = serde_json::to_string(&cooking_and_ai_tools()).unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let source = JsonFileTrendSource::load(file.path()).await.unwrap();
    let analyzer = CategoryAnalyzer::new(Arc::new(source), AnalysisConfig::default());
    let reports = analyzer.analyze_categories(None, week_window()).await.unwrap();

    let value = serde_json::to_value(&reports).unwrap();
    assert_eq!(value[0]["metrics"]["category"], "AI Tools");
    assert_eq!(value[0]["metrics"]["videoCount"], 5);
    assert_eq!(value[0]["insight"]["source"], "fallback");
}

// ============================================================================
// Emerging Detection
// ============================================================================

#[tokio::test]
async fn test_novel_category_detected() {
    let emerging = analyzer(cooking_and_ai_tools())
        .detect_emerging_categories(None, week_window())
        .await
        .unwrap();

    assert_eq!(emerging.len(), 1);
    let ai = &emerging[0];
    assert_eq!(ai.name, "AI Tools");
    assert_eq!(ai.rule, EmergingRule::Novel);
    assert_eq!(ai.estimated_size, 10_000);
    assert!(ai.confidence > 0.3 && ai.confidence <= 0.9);
    assert_eq!(ai.first_detected_at, Some(this_week()));
}

#[tokio::test]
async fn test_rapid_growth_detected() {
    let records = vec![
        create_record("f-old", last_week(), "Fitness", 1_000),
        create_record("f-new", this_week(), "Fitness", 3_500),
    ];

    let emerging = analyzer(records)
        .detect_emerging_categories(None, week_window())
        .await
        .unwrap();

    assert_eq!(emerging.len(), 1);
    assert_eq!(emerging[0].name, "Fitness (rapid growth)");
    assert_eq!(emerging[0].rule, EmergingRule::RapidGrowth);
    assert!(emerging[0].confidence >= 0.5);
}

#[tokio::test]
async fn test_emerging_insight_fallback() {
    let analyzer = analyzer(cooking_and_ai_tools());
    let emerging = analyzer
        .detect_emerging_categories(None, week_window())
        .await
        .unwrap();
    let insight = analyzer.narrate_emerging(None, week_window(), &emerging).await;

    assert!(insight.is_fallback());
    assert!(insight.text.starts_with("1 emerging category detected in 2024-W15"));
}

#[tokio::test]
async fn test_emerging_top_n() {
    let mut records = Vec::new();
    for name in ["A", "B", "C", "D"] {
        records.extend(create_batch(name, this_week(), name, 3, 1_000, &[]));
    }
    let config = AnalysisConfig {
        emerging_top_n: 2,
        ..AnalysisConfig::default()
    };
    let analyzer = CategoryAnalyzer::new(Arc::new(InMemoryTrendSource::new(records)), config);

    let emerging = analyzer
        .detect_emerging_categories(None, week_window())
        .await
        .unwrap();
    assert_eq!(emerging.len(), 2);
}

// ============================================================================
// Relations
// ============================================================================

#[tokio::test]
async fn test_relations_single_linkage() {
    let relations = analyzer(transitive_records())
        .analyze_category_relations(None, week_window())
        .await
        .unwrap();

    assert_eq!(relations.matrix.len(), 3);
    assert_eq!(relations.clusters.len(), 1);

    let cluster = &relations.clusters[0];
    assert_eq!(cluster.len(), 3);
    let expected = (4.0 / 6.0 + 4.0 / 6.0 + 2.0 / 6.0) / 3.0;
    assert!((cluster.avg_correlation - expected).abs() < 1e-9);

    let ac = relations
        .matrix
        .iter()
        .find(|e| e.category_a == "A" && e.category_b == "C")
        .unwrap();
    assert!(ac.score < 0.6);
}

#[tokio::test]
async fn test_relations_span_lookback_windows() {
    // Travel only appears three weeks back, still inside the default span of four
    let three_weeks_ago = this_week() - Duration::days(21);
    let mut records = create_batch("t", three_weeks_ago, "Travel", 1, 100, &["trip", "beach"]);
    records.extend(create_batch("s", this_week(), "Surf", 1, 100, &["beach", "trip"]));

    let relations = analyzer(records.clone())
        .analyze_category_relations(None, week_window())
        .await
        .unwrap();
    assert_eq!(relations.matrix.len(), 1);
    assert_eq!(relations.matrix[0].score, 1.0);
    assert_eq!(relations.clusters.len(), 1);

    let narrow = CategoryAnalyzer::new(
        Arc::new(InMemoryTrendSource::new(records)),
        AnalysisConfig {
            relation_lookback_windows: 1,
            ..AnalysisConfig::default()
        },
    );
    let relations = narrow
        .analyze_category_relations(None, week_window())
        .await
        .unwrap();
    assert!(relations.matrix.is_empty());
    assert!(relations.insight.is_none());
}

#[tokio::test]
async fn test_month_windows() {
    let march = Window::month(3, 2024).unwrap();
    let records = vec![
        TrendRecord::new("m1", Platform::X, Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap())
            .with_category("News")
            .with_views(400),
        TrendRecord::new("m2", Platform::X, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap())
            .with_category("News")
            .with_views(1_000),
    ];

    let reports = analyzer(records).analyze_categories(None, march).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].metrics.growth_rate_percent, 150.0);
}

#[tokio::test]
async fn test_new_year_week_is_not_merged_with_january() {
    let at = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
    let records = vec![
        create_record("jan", at(2024, 1, 2), "Holidays", 400),
        create_record("xmas", at(2024, 12, 23), "Holidays", 1_000),
        create_record("nye", at(2024, 12, 31), "Holidays", 1_000),
    ];
    let analyzer = analyzer(records);

    let first_2024 = Window::week(1, 2024).unwrap();
    let reports = analyzer.analyze_categories(None, first_2024).await.unwrap();
    assert_eq!(reports[0].metrics.video_count, 1);
    assert_eq!(reports[0].metrics.total_views, 400);

    // 2024-12-31 is ISO 2025-W01; 2024-12-23 is the week before it
    let first_2025 = Window::week(1, 2025).unwrap();
    let reports = analyzer.analyze_categories(None, first_2025).await.unwrap();
    assert_eq!(reports[0].metrics.video_count, 1);
    assert_eq!(reports[0].metrics.total_views, 1_000);
    assert_eq!(reports[0].metrics.growth_rate_percent, 0.0);

    let emerging = analyzer
        .detect_emerging_categories(None, first_2025)
        .await
        .unwrap();
    assert!(emerging.is_empty());
}
