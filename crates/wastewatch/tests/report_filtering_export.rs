//! Filter, export, and analytics behavior over the built-in sample set.

use wastewatch::workflows::reports::export::{to_csv, EXPORT_COLUMNS};
use wastewatch::workflows::reports::{
    sample, ExportFormat, ReportAnalytics, ReportQuery, ReportStatus, SearchState, WasteReport,
};

fn ids(reports: &[WasteReport]) -> Vec<String> {
    reports.iter().map(|report| report.id.0.clone()).collect()
}

fn filtered(query: ReportQuery) -> Vec<WasteReport> {
    query
        .filter()
        .expect("valid filter")
        .apply(sample::reports())
}

#[test]
fn status_filters_union_to_the_full_collection() {
    let mut union: Vec<String> = ReportStatus::ALL
        .into_iter()
        .flat_map(|status| {
            let matched = filtered(ReportQuery {
                status: Some(status.label().to_string()),
                ..ReportQuery::default()
            });
            assert!(matched.iter().all(|report| report.status == status));
            ids(&matched)
        })
        .collect();
    union.sort();

    let mut all = ids(&sample::reports());
    all.sort();
    assert_eq!(union, all);
}

#[test]
fn severity_threshold_is_inclusive() {
    for threshold in ["4.0", "5.5", "6.2", "9.1", "10"] {
        let value: f32 = threshold.parse().expect("numeric threshold");
        let matched = filtered(ReportQuery {
            severity: Some(threshold.to_string()),
            ..ReportQuery::default()
        });
        let expected: Vec<String> = sample::reports()
            .into_iter()
            .filter(|report| report.severity >= value)
            .map(|report| report.id.0)
            .collect();
        assert_eq!(ids(&matched), expected, "threshold {threshold}");
    }
}

#[test]
fn combined_filters_match_the_assigned_scenario() {
    let included = filtered(ReportQuery {
        status: Some("Assigned".to_string()),
        severity: Some("6.0".to_string()),
        ..ReportQuery::default()
    });
    assert_eq!(ids(&included), vec!["2".to_string()]);

    let excluded = filtered(ReportQuery {
        severity: Some("8.0".to_string()),
        ..ReportQuery::default()
    });
    assert!(!ids(&excluded).contains(&"2".to_string()));
}

#[test]
fn phone_search_finds_exactly_one_report() {
    let query = ReportQuery {
        search: Some("+91-9876543210".to_string()),
        ..ReportQuery::default()
    };
    assert_eq!(ids(&filtered(query.clone())), vec!["1".to_string()]);
    assert_eq!(
        query.filter().expect("valid filter").search_state(),
        SearchState::Active
    );
}

#[test]
fn csv_export_round_trips_through_a_reader() {
    let csv_text = to_csv(&sample::reports()).expect("csv renders");
    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .expect("header row")
        .iter()
        .map(str::to_string)
        .collect();
    assert_eq!(headers, EXPORT_COLUMNS.map(str::to_string).to_vec());

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .expect("records parse");
    assert_eq!(rows.len(), 6);
    let glass = rows
        .iter()
        .find(|row| row.get(0) == Some("3"))
        .expect("glass report exported");
    assert_eq!(glass.get(4), Some("Station Road \"Old Market\" corner"));
    assert_eq!(glass.get(1), Some("In Progress"));
}

#[test]
fn html_export_is_a_standalone_document() {
    let html = ExportFormat::Html
        .render(&sample::reports())
        .expect("html renders");
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.trim_end().ends_with("</html>"));
    assert!(html.contains("E-Waste"));
}

#[test]
fn analytics_count_unzoned_reports_separately() {
    let summary = ReportAnalytics::summarize(&sample::reports());
    let unzoned = summary
        .by_zone
        .iter()
        .find(|count| count.label == "Unzoned")
        .map(|count| count.count);
    assert_eq!(unzoned, Some(1));
    assert_eq!(summary.total, 6);
    let months: Vec<&str> = summary
        .monthly_trend
        .iter()
        .map(|point| point.month.as_str())
        .collect();
    assert_eq!(months, vec!["2025-01", "2025-02", "2025-03"]);
}
