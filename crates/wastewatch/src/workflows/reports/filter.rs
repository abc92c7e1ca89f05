use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{ReportStatus, WasteReport, WasteType};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ReportStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WasteTypeFilter {
    #[default]
    All,
    Only(WasteType),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SeverityFilter {
    #[default]
    All,
    AtLeast(f32),
}

/// Idle means nobody searched; `Term("")` is an explicit blank search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchQuery {
    #[default]
    Idle,
    Term(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    Idle,
    Blank,
    Active,
}

fn is_all(raw: &str) -> bool {
    let raw = raw.trim();
    raw.is_empty() || raw.eq_ignore_ascii_case("all")
}

impl FromStr for StatusFilter {
    type Err = FilterError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if is_all(raw) {
            return Ok(Self::All);
        }
        ReportStatus::from_label(raw)
            .map(Self::Only)
            .ok_or_else(|| FilterError::UnknownStatus(raw.to_string()))
    }
}

impl FromStr for WasteTypeFilter {
    type Err = FilterError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if is_all(raw) {
            return Ok(Self::All);
        }
        WasteType::from_label(raw)
            .map(Self::Only)
            .ok_or_else(|| FilterError::UnknownWasteType(raw.to_string()))
    }
}

impl FromStr for SeverityFilter {
    type Err = FilterError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if is_all(raw) {
            return Ok(Self::All);
        }
        match raw.trim().parse::<f32>() {
            Ok(threshold) if threshold.is_finite() && (0.0..=10.0).contains(&threshold) => {
                Ok(Self::AtLeast(threshold))
            }
            _ => Err(FilterError::InvalidSeverity(raw.to_string())),
        }
    }
}

/// Predicate set combined with logical AND. Output keeps input order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportFilter {
    pub status: StatusFilter,
    pub waste_type: WasteTypeFilter,
    pub severity: SeverityFilter,
    pub search: SearchQuery,
}

impl ReportFilter {
    pub fn matches(&self, report: &WasteReport) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => report.status == status,
        };
        let type_ok = match self.waste_type {
            WasteTypeFilter::All => true,
            WasteTypeFilter::Only(kind) => report.waste_type == kind,
        };
        let severity_ok = match self.severity {
            SeverityFilter::All => true,
            SeverityFilter::AtLeast(threshold) => report.severity >= threshold,
        };
        let search_ok = match &self.search {
            SearchQuery::Idle => true,
            SearchQuery::Term(term) => {
                let needle = term.trim().to_lowercase();
                !needle.is_empty()
                    && (report.id.0.to_lowercase().contains(&needle)
                        || report.reporter.phone.to_lowercase().contains(&needle))
            }
        };

        status_ok && type_ok && severity_ok && search_ok
    }

    pub fn apply(&self, reports: Vec<WasteReport>) -> Vec<WasteReport> {
        reports
            .into_iter()
            .filter(|report| self.matches(report))
            .collect()
    }

    pub fn search_state(&self) -> SearchState {
        match &self.search {
            SearchQuery::Idle => SearchState::Idle,
            SearchQuery::Term(term) if term.trim().is_empty() => SearchState::Blank,
            SearchQuery::Term(_) => SearchState::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("unknown status filter '{0}'")]
    UnknownStatus(String),
    #[error("unknown waste type filter '{0}'")]
    UnknownWasteType(String),
    #[error("severity filter must be 'all' or a number between 0 and 10, got '{0}'")]
    InvalidSeverity(String),
}

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 200;

/// Query-string form of the predicate set plus pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "waste_type")]
    pub waste_type: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ReportQuery {
    pub fn filter(&self) -> Result<ReportFilter, FilterError> {
        let label = |raw: &Option<String>| raw.as_deref().unwrap_or("all").to_string();
        Ok(ReportFilter {
            status: label(&self.status).parse()?,
            waste_type: label(&self.waste_type).parse()?,
            severity: label(&self.severity).parse()?,
            search: match &self.search {
                Some(term) => SearchQuery::Term(term.clone()),
                None => SearchQuery::Idle,
            },
        })
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page.unwrap_or(1).max(1),
            limit: self
                .limit
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

/// One page of filtered reports, shaped for the `{ data: { docs } }` envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPage {
    pub docs: Vec<WasteReport>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub search: SearchState,
}

impl ReportPage {
    pub fn build(filtered: Vec<WasteReport>, request: PageRequest, search: SearchState) -> Self {
        let total = filtered.len();
        let offset = request.page.saturating_sub(1).saturating_mul(request.limit);
        let docs = filtered
            .into_iter()
            .skip(offset)
            .take(request.limit)
            .collect();
        Self {
            docs,
            total,
            page: request.page,
            limit: request.limit,
            search,
        }
    }
}
