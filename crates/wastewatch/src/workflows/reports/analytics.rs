use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{ReportStatus, WasteReport, WasteType, Zone};

pub const UNZONED_LABEL: &str = "Unzoned";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledCount {
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrendPoint {
    pub month: String,
    pub created: usize,
    pub resolved: usize,
}

/// Aggregate view recomputed from the report collection on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportAnalytics {
    pub total: usize,
    pub by_status: Vec<LabeledCount>,
    pub by_type: Vec<LabeledCount>,
    pub by_zone: Vec<LabeledCount>,
    pub monthly_trend: Vec<MonthlyTrendPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_severity: Option<f32>,
}

impl ReportAnalytics {
    pub fn summarize(reports: &[WasteReport]) -> Self {
        let by_status = ReportStatus::ALL
            .into_iter()
            .map(|status| LabeledCount {
                label: status.label(),
                count: reports.iter().filter(|r| r.status == status).count(),
            })
            .collect();

        let by_type = WasteType::ALL
            .into_iter()
            .map(|kind| LabeledCount {
                label: kind.label(),
                count: reports.iter().filter(|r| r.waste_type == kind).count(),
            })
            .collect();

        let mut by_zone: Vec<LabeledCount> = Zone::ALL
            .into_iter()
            .map(|zone| LabeledCount {
                label: zone.label(),
                count: reports
                    .iter()
                    .filter(|r| r.location.zone == Some(zone))
                    .count(),
            })
            .collect();
        let unzoned = reports.iter().filter(|r| r.location.zone.is_none()).count();
        if unzoned > 0 {
            by_zone.push(LabeledCount {
                label: UNZONED_LABEL,
                count: unzoned,
            });
        }

        // Resolution is the last mutation a report sees, so updated_at marks it.
        let mut months: BTreeMap<String, MonthlyTrendPoint> = BTreeMap::new();
        for report in reports {
            let created_key = report.created_at.format("%Y-%m").to_string();
            month_entry(&mut months, created_key).created += 1;
            if report.status == ReportStatus::Resolved {
                let resolved_key = report.updated_at.format("%Y-%m").to_string();
                month_entry(&mut months, resolved_key).resolved += 1;
            }
        }

        let average_severity = if reports.is_empty() {
            None
        } else {
            let sum: f32 = reports.iter().map(|r| r.severity).sum();
            Some(sum / reports.len() as f32)
        };

        Self {
            total: reports.len(),
            by_status,
            by_type,
            by_zone,
            monthly_trend: months.into_values().collect(),
            average_severity,
        }
    }
}

fn month_entry(
    months: &mut BTreeMap<String, MonthlyTrendPoint>,
    key: String,
) -> &mut MonthlyTrendPoint {
    months
        .entry(key.clone())
        .or_insert_with(|| MonthlyTrendPoint {
            month: key,
            created: 0,
            resolved: 0,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::reports::sample;

    fn count(entries: &[LabeledCount], label: &str) -> Option<usize> {
        entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.count)
    }

    #[test]
    fn summarizes_sample_set() {
        let analytics = ReportAnalytics::summarize(&sample::reports());

        assert_eq!(analytics.total, 6);
        assert_eq!(count(&analytics.by_status, "Pending"), Some(2));
        assert_eq!(count(&analytics.by_status, "In Progress"), Some(1));
        assert_eq!(count(&analytics.by_type, "E-Waste"), Some(1));
        assert_eq!(count(&analytics.by_type, "Metal"), Some(0));
        assert_eq!(count(&analytics.by_zone, "North"), Some(2));
        assert_eq!(count(&analytics.by_zone, UNZONED_LABEL), Some(1));

        let months: Vec<(&str, usize, usize)> = analytics
            .monthly_trend
            .iter()
            .map(|point| (point.month.as_str(), point.created, point.resolved))
            .collect();
        assert_eq!(
            months,
            vec![("2025-01", 2, 0), ("2025-02", 2, 1), ("2025-03", 2, 0)]
        );

        let average = analytics.average_severity.expect("non-empty set");
        assert!((average - 6.783_333).abs() < 1e-3);
    }

    #[test]
    fn empty_collection_has_zero_counts() {
        let analytics = ReportAnalytics::summarize(&[]);
        assert_eq!(analytics.total, 0);
        assert!(analytics.monthly_trend.is_empty());
        assert!(analytics.average_severity.is_none());
        assert_eq!(count(&analytics.by_zone, UNZONED_LABEL), None);
        assert!(analytics.by_status.iter().all(|entry| entry.count == 0));
    }
}
