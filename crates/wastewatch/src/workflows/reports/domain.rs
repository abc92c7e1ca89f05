use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::auth::UserId;

/// Server-assigned report identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub String);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WasteType {
    Organic,
    Plastic,
    Medical,
    #[serde(rename = "E-Waste")]
    EWaste,
    Glass,
    Metal,
    Mixed,
}

impl WasteType {
    pub const ALL: [WasteType; 7] = [
        WasteType::Organic,
        WasteType::Plastic,
        WasteType::Medical,
        WasteType::EWaste,
        WasteType::Glass,
        WasteType::Metal,
        WasteType::Mixed,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            WasteType::Organic => "Organic",
            WasteType::Plastic => "Plastic",
            WasteType::Medical => "Medical",
            WasteType::EWaste => "E-Waste",
            WasteType::Glass => "Glass",
            WasteType::Metal => "Metal",
            WasteType::Mixed => "Mixed",
        }
    }

    /// Case-insensitive; "ewaste" and "e_waste" are accepted for E-Waste.
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL.into_iter().find(|kind| {
            kind.label()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .map(|c| c.to_ascii_lowercase())
                .eq(normalized.chars())
        })
    }
}

impl fmt::Display for WasteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Report workflow state. Only ever moves forward, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReportStatus {
    Pending,
    Assigned,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 4] = [
        ReportStatus::Pending,
        ReportStatus::Assigned,
        ReportStatus::InProgress,
        ReportStatus::Resolved,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::Assigned => "Assigned",
            ReportStatus::InProgress => "In Progress",
            ReportStatus::Resolved => "Resolved",
        }
    }

    /// Accepts the display label as well as snake/kebab variants ("in_progress").
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "pending" => Some(ReportStatus::Pending),
            "assigned" => Some(ReportStatus::Assigned),
            "inprogress" => Some(ReportStatus::InProgress),
            "resolved" => Some(ReportStatus::Resolved),
            _ => None,
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            ReportStatus::Pending => Some(ReportStatus::Assigned),
            ReportStatus::Assigned => Some(ReportStatus::InProgress),
            ReportStatus::InProgress => Some(ReportStatus::Resolved),
            ReportStatus::Resolved => None,
        }
    }

    /// Statuses that count toward a worker's active job load.
    pub const fn is_active(self) -> bool {
        matches!(self, ReportStatus::Assigned | ReportStatus::InProgress)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed geographic partition used to route reports to workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    North,
    South,
    East,
    West,
    Central,
}

impl Zone {
    pub const ALL: [Zone; 5] = [Zone::North, Zone::South, Zone::East, Zone::West, Zone::Central];

    pub const fn label(self) -> &'static str {
        match self {
            Zone::North => "North",
            Zone::South => "South",
            Zone::East => "East",
            Zone::West => "West",
            Zone::Central => "Central",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|zone| zone.label().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
}

impl GeoLocation {
    fn validate(&self) -> Result<(), IntakeError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(IntakeError::InvalidCoordinates {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

/// Contact details only; not an account reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reporter {
    pub name: String,
    pub phone: String,
}

/// Metadata for the uploaded photo. The bytes themselves live in external storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRef {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedWorker {
    pub id: WorkerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteReport {
    pub id: ReportId,
    pub reporter: Reporter,
    pub location: GeoLocation,
    pub waste_type: WasteType,
    pub severity: f32,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoRef>,
    pub status: ReportStatus,
    #[serde(default)]
    pub assigned_worker: Option<AssignedWorker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WasteReport {
    pub fn is_assigned_to(&self, worker: &WorkerId) -> bool {
        self.assigned_worker
            .as_ref()
            .is_some_and(|assigned| &assigned.id == worker)
    }

    pub fn address(&self) -> &str {
        self.location.address.as_deref().unwrap_or_default()
    }
}

/// Citizen-provided payload prior to id assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmission {
    pub reporter: Reporter,
    pub location: GeoLocation,
    pub waste_type: WasteType,
    pub severity: f32,
    pub confidence: f32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub photo: Option<PhotoRef>,
}

impl ReportSubmission {
    pub fn validate(&self) -> Result<(), IntakeError> {
        if self.reporter.name.trim().is_empty() {
            return Err(IntakeError::MissingField("name"));
        }
        if self.reporter.phone.trim().is_empty() {
            return Err(IntakeError::MissingField("phone"));
        }
        if !self.severity.is_finite() || !(0.0..=10.0).contains(&self.severity) {
            return Err(IntakeError::SeverityOutOfRange(self.severity));
        }
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(IntakeError::ConfidenceOutOfRange(self.confidence));
        }
        self.location.validate()
    }

    pub fn into_report(
        self,
        id: ReportId,
        submitted_by: Option<UserId>,
        at: DateTime<Utc>,
    ) -> WasteReport {
        let trim_owned = |value: Option<String>| {
            value
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
        };

        let mut location = self.location;
        location.address = trim_owned(location.address);

        WasteReport {
            id,
            reporter: Reporter {
                name: self.reporter.name.trim().to_string(),
                phone: self.reporter.phone.trim().to_string(),
            },
            location,
            waste_type: self.waste_type,
            severity: self.severity,
            confidence: self.confidence,
            description: trim_owned(self.description),
            photo: self.photo,
            status: ReportStatus::Pending,
            assigned_worker: None,
            completion_notes: None,
            submitted_by,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Intake validation failures surfaced back to the submitter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IntakeError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("severity must be between 0 and 10, got {0}")]
    SeverityOutOfRange(f32),
    #[error("confidence must be between 0 and 1, got {0}")]
    ConfidenceOutOfRange(f32),
    #[error("coordinates out of range: ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

/// Field staff reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub zone: Zone,
}

impl Worker {
    pub fn assignment(&self) -> AssignedWorker {
        AssignedWorker {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Worker paired with its derived active-job count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerLoad {
    #[serde(flatten)]
    pub worker: Worker,
    pub active_jobs: usize,
}
