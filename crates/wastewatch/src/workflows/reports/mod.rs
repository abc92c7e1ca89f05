//! Waste report intake, triage, and field lifecycle.
//!
//! Reports move `Pending → Assigned → In Progress → Resolved`, one step at a time. Every
//! step is a [`ReportCommand`] applied to a copy of the stored record and committed only
//! after the repository accepts the new version.

pub mod analytics;
pub mod assignment;
pub mod domain;
pub mod export;
pub mod filter;
pub mod intake;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod sample;
pub mod service;

#[cfg(test)]
mod tests;

pub use analytics::{LabeledCount, MonthlyTrendPoint, ReportAnalytics};
pub use assignment::{AssignmentError, AssignmentMatch, AssignmentResolver};
pub use domain::{
    AssignedWorker, GeoLocation, IntakeError, PhotoRef, ReportId, ReportStatus,
    ReportSubmission, Reporter, WasteReport, WasteType, Worker, WorkerId, WorkerLoad, Zone,
};
pub use export::{ExportError, ExportFormat};
pub use filter::{
    FilterError, ReportFilter, ReportPage, ReportQuery, SearchQuery, SearchState,
    SeverityFilter, StatusFilter, WasteTypeFilter,
};
pub use intake::SubmissionForm;
pub use lifecycle::{
    ReportAction, ReportCommand, ReportUpdateRequest, TransitionError, UpdateIntent,
    UpdateRequestError,
};
pub use repository::{ReportRepository, RepositoryError, WorkerRoster};
pub use router::report_router;
pub use service::{InFlightActions, ReportService, ReportServiceError};
