use super::domain::{ReportId, WasteReport, Worker, WorkerId};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `list` returns reports in submission order; filters rely on that ordering.
pub trait ReportRepository: Send + Sync {
    fn insert(&self, report: WasteReport) -> Result<WasteReport, RepositoryError>;
    fn update(&self, report: WasteReport) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ReportId) -> Result<Option<WasteReport>, RepositoryError>;
    fn list(&self) -> Result<Vec<WasteReport>, RepositoryError>;
}

/// Backend-owned worker reference data.
pub trait WorkerRoster: Send + Sync {
    fn workers(&self) -> Result<Vec<Worker>, RepositoryError>;
    fn enroll(&self, worker: Worker) -> Result<Worker, RepositoryError>;
    /// Removes an enrolled worker; `NotFound` when the id is not on the roster.
    fn withdraw(&self, id: &WorkerId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
