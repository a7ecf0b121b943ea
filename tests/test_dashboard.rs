//! Integration tests for dashboard assembly and export

use churnscope::pipeline::{
    build_dashboard, Chart, ChartBody, DatasetFormat, FilterSelection, IngestOptions,
    InsightKind, Section, Session, TARGET_COLUMN,
};
use churnscope::report::{export_dashboard, metric_lines, ExportParams};
use tempfile::TempDir;

mod common;

use common::{create_churn_dataframe, create_temp_csv};

#[test]
fn test_full_schema_draws_every_chart() {
    let df = create_churn_dataframe();

    let dashboard = build_dashboard(&df, TARGET_COLUMN).unwrap();

    assert_eq!(dashboard.charts.len(), Chart::ALL.len());
    assert!(dashboard.skipped.is_empty());
    assert_eq!(dashboard.charts_in(Section::Demographics).count(), 3);
    assert_eq!(dashboard.charts_in(Section::Behavior).count(), 2);
    assert_eq!(metric_lines(&dashboard.metrics).len(), 6);
}

#[test]
fn test_insights_name_riskiest_groups() {
    let df = create_churn_dataframe();

    let dashboard = build_dashboard(&df, TARGET_COLUMN).unwrap();
    let text_of = |kind: InsightKind| {
        dashboard
            .insights
            .iter()
            .find(|i| i.kind == kind)
            .map(|i| i.text.clone())
            .unwrap()
    };

    assert!(text_of(InsightKind::Demographic).contains("identified as M"));
    assert!(text_of(InsightKind::EarlyWarning).contains("0-6m"));
    assert!(text_of(InsightKind::Retention).starts_with(
        "Highest churn risk at 100.0% comes from Spender customers with High income level."
    ));
    assert!(text_of(InsightKind::Behavioral).starts_with("Avg spend per customer is $"));
}

#[test]
fn test_missing_columns_skip_charts_and_insights() {
    let df = create_churn_dataframe().drop_many(["tenuregroup", "utilizationrate"]);

    let dashboard = build_dashboard(&df, TARGET_COLUMN).unwrap();

    assert_eq!(
        dashboard.skipped,
        vec![Chart::SpendVsUtilization, Chart::ChurnByTenure]
    );
    assert!(dashboard.chart(Chart::ChurnByTenure).is_none());
    assert!(dashboard
        .insights
        .iter()
        .all(|i| i.kind != InsightKind::EarlyWarning));
    assert_eq!(dashboard.metrics.avg_utilization_pct, None);
}

#[test]
fn test_transaction_chart_uses_buckets() {
    let df = create_churn_dataframe();

    let dashboard = build_dashboard(&df, TARGET_COLUMN).unwrap();
    let chart = dashboard.chart(Chart::ChurnByTransactionLevel).unwrap();

    let summary = chart.rates().unwrap();
    assert_eq!(summary.groups[0].label(), "Low");
}

#[test]
fn test_scatter_points_keep_outcome() {
    let df = create_churn_dataframe();

    let dashboard = build_dashboard(&df, TARGET_COLUMN).unwrap();
    let chart = dashboard.chart(Chart::SpendVsUtilization).unwrap();

    match &chart.body {
        ChartBody::Scatter { points } => {
            assert_eq!(points.len(), 8);
            assert_eq!(points.iter().filter(|p| p.churned).count(), 3);
        }
        ChartBody::Rates(_) => panic!("expected scatter data"),
    }
}

#[test]
fn test_empty_filter_result_builds_empty_dashboard() {
    let df = create_churn_dataframe();
    let mut selection = FilterSelection::all(&df).unwrap();
    selection.set("gender", Vec::new()).unwrap();
    let filtered = selection.apply(&df).unwrap();

    let dashboard = build_dashboard(&filtered, TARGET_COLUMN).unwrap();

    assert_eq!(dashboard.metrics.total_customers, 0);
    assert_eq!(dashboard.metrics.attrition_rate_pct, None);
    assert!(dashboard
        .charts
        .iter()
        .filter_map(|c| c.rates())
        .all(|s| s.is_empty()));
    assert!(dashboard.insights.is_empty());
}

#[test]
fn test_session_dashboard_applies_filters() {
    let mut df = create_churn_dataframe();
    let (_dir, path) = create_temp_csv(&mut df);
    let bytes = std::fs::read(&path).unwrap();
    let session = Session::from_bytes(
        bytes,
        DatasetFormat::Csv,
        TARGET_COLUMN,
        &IngestOptions::default(),
    )
    .unwrap();

    let mut selection = session.default_filters().unwrap();
    selection.set("persona", vec!["Spender".to_string()]).unwrap();
    let dashboard = session.dashboard(&selection).unwrap();

    assert_eq!(dashboard.metrics.total_customers, 3);
    assert_eq!(dashboard.metrics.attrition_rate_pct, Some(100.0));
    assert_eq!(session.table().height(), 8);
}

#[test]
fn test_export_writes_metadata_and_charts() {
    let df = create_churn_dataframe();
    let selection = FilterSelection::all(&df).unwrap();
    let dashboard = build_dashboard(&df, TARGET_COLUMN).unwrap();
    let temp_dir = TempDir::new().unwrap();
    let out = temp_dir.path().join("dashboard.json");

    export_dashboard(
        &dashboard,
        &out,
        &ExportParams {
            input_file: "customers.csv",
            target_column: TARGET_COLUMN,
            filters: &selection,
        },
    )
    .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["metadata"]["target_column"], "attritionflag");
    assert_eq!(json["metadata"]["filtered_rows"], 8);
    assert_eq!(json["filters"].as_array().unwrap().len(), 5);
    assert_eq!(json["charts"].as_array().unwrap().len(), 7);
    assert_eq!(json["metrics"]["total_customers"], 8);
    assert_eq!(json["charts"][3]["body"]["type"], "scatter");
}
