use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::http::StatusCode;
use chrono::Utc;
use tracing::{info, warn};

use super::analytics::ReportAnalytics;
use super::assignment::{worker_loads, AssignmentError, AssignmentMatch, AssignmentResolver};
use super::domain::{IntakeError, ReportId, ReportSubmission, WasteReport, WorkerId, WorkerLoad};
use super::export::{ExportError, ExportFormat};
use super::filter::{FilterError, ReportPage, ReportQuery};
use super::lifecycle::{
    ReportAction, ReportCommand, ReportUpdateRequest, TransitionError, UpdateIntent,
    UpdateRequestError,
};
use super::repository::{ReportRepository, RepositoryError, WorkerRoster};
use crate::workflows::auth::{AdminActor, AuthError, Role, Session, UserId, WorkerActor};

static REPORT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_report_id() -> ReportId {
    let id = REPORT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ReportId(format!("rpt-{id:06}"))
}

/// Set of (report, action) pairs with a mutation outstanding.
#[derive(Debug, Default)]
pub struct InFlightActions {
    active: Mutex<HashSet<(ReportId, ReportAction)>>,
}

impl InFlightActions {
    /// Returns `None` when the same action is already running for this report.
    pub fn acquire(&self, id: &ReportId, action: ReportAction) -> Option<InFlightGuard<'_>> {
        let key = (id.clone(), action);
        let inserted = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone());
        inserted.then_some(InFlightGuard { owner: self, key })
    }

    pub fn is_busy(&self, id: &ReportId, action: ReportAction) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(id.clone(), action))
    }
}

/// Releases its (report, action) slot on drop, including on early error returns.
pub struct InFlightGuard<'a> {
    owner: &'a InFlightActions,
    key: (ReportId, ReportAction),
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Service composing storage, the worker roster, lifecycle commands, and assignment.
pub struct ReportService<R, W> {
    repository: Arc<R>,
    roster: Arc<W>,
    in_flight: InFlightActions,
}

impl<R, W> ReportService<R, W>
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    pub fn new(repository: Arc<R>, roster: Arc<W>) -> Self {
        Self {
            repository,
            roster,
            in_flight: InFlightActions::default(),
        }
    }

    pub fn in_flight(&self) -> &InFlightActions {
        &self.in_flight
    }

    /// Validate and store a new Pending report.
    pub fn submit(
        &self,
        submitted_by: Option<UserId>,
        submission: ReportSubmission,
    ) -> Result<WasteReport, ReportServiceError> {
        submission.validate()?;
        let report = submission.into_report(next_report_id(), submitted_by, Utc::now());
        let stored = self.repository.insert(report)?;
        info!(
            report_id = %stored.id,
            waste_type = %stored.waste_type,
            severity = stored.severity,
            "report submitted"
        );
        Ok(stored)
    }

    pub fn get(&self, id: &ReportId) -> Result<WasteReport, ReportServiceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| ReportServiceError::NotFound(id.clone()))
    }

    /// Reports hidden from the session are reported as missing.
    pub fn get_visible(
        &self,
        session: &Session,
        id: &ReportId,
    ) -> Result<WasteReport, ReportServiceError> {
        let report = self.get(id)?;
        if is_visible(session, &report) {
            Ok(report)
        } else {
            Err(ReportServiceError::NotFound(id.clone()))
        }
    }

    pub fn visible_to(&self, session: &Session) -> Result<Vec<WasteReport>, ReportServiceError> {
        Ok(self
            .repository
            .list()?
            .into_iter()
            .filter(|report| is_visible(session, report))
            .collect())
    }

    pub fn my_reports(&self, user_id: &UserId) -> Result<Vec<WasteReport>, ReportServiceError> {
        Ok(self
            .repository
            .list()?
            .into_iter()
            .filter(|report| report.submitted_by.as_ref() == Some(user_id))
            .collect())
    }

    pub fn page(
        &self,
        session: &Session,
        query: &ReportQuery,
    ) -> Result<ReportPage, ReportServiceError> {
        let filter = query.filter()?;
        let filtered = filter.apply(self.visible_to(session)?);
        Ok(ReportPage::build(
            filtered,
            query.page_request(),
            filter.search_state(),
        ))
    }

    /// Manual assignment to a named roster worker.
    pub fn assign(
        &self,
        actor: &AdminActor,
        id: &ReportId,
        worker_id: &WorkerId,
    ) -> Result<WasteReport, ReportServiceError> {
        let report = self.execute(id, ReportAction::Assign, |_current| {
            let roster = self.roster_loads()?;
            let selected = AssignmentResolver::new(&roster).select(worker_id)?;
            Ok(ReportCommand::Assign {
                worker: selected.worker,
            })
        })?;
        info!(admin = %actor.user_id(), report_id = %id, worker_id = %worker_id, "report assigned");
        Ok(report)
    }

    /// Assign to the recommended worker: same zone first, then lightest load.
    pub fn auto_assign(
        &self,
        actor: &AdminActor,
        id: &ReportId,
    ) -> Result<(WasteReport, AssignmentMatch), ReportServiceError> {
        let mut chosen = None;
        let report = self.execute(id, ReportAction::Assign, |current| {
            let roster = self.roster_loads()?;
            let pick = AssignmentResolver::new(&roster).recommend(current)?;
            let command = ReportCommand::Assign {
                worker: pick.worker.clone(),
            };
            chosen = Some(pick);
            Ok(command)
        })?;
        let pick = chosen.ok_or(AssignmentError::NoAvailableWorker)?;
        info!(
            admin = %actor.user_id(),
            report_id = %id,
            worker_id = %pick.worker.id,
            zone_match = pick.zone_match,
            "report auto-assigned"
        );
        Ok((report, pick))
    }

    pub fn start(
        &self,
        actor: &WorkerActor,
        id: &ReportId,
    ) -> Result<WasteReport, ReportServiceError> {
        self.execute(id, ReportAction::Start, |_current| {
            Ok(ReportCommand::Start {
                worker: actor.worker_id().clone(),
            })
        })
    }

    pub fn complete(
        &self,
        actor: &WorkerActor,
        id: &ReportId,
        notes: &str,
    ) -> Result<WasteReport, ReportServiceError> {
        self.execute(id, ReportAction::Complete, |_current| {
            Ok(ReportCommand::Complete {
                worker: actor.worker_id().clone(),
                notes: notes.to_string(),
            })
        })
    }

    /// Apply a partial update, checking the session holds the role the transition needs.
    pub fn update(
        &self,
        session: &Session,
        id: &ReportId,
        request: &ReportUpdateRequest,
    ) -> Result<WasteReport, ReportServiceError> {
        match request.intent()? {
            UpdateIntent::Assign(worker_id) => self.assign(&session.admin()?, id, &worker_id),
            UpdateIntent::Start => self.start(&session.worker()?, id),
            UpdateIntent::Complete(notes) => self.complete(&session.worker()?, id, &notes),
        }
    }

    pub fn worker_loads(&self, _actor: &AdminActor) -> Result<Vec<WorkerLoad>, ReportServiceError> {
        self.roster_loads()
    }

    pub fn analytics(&self, _actor: &AdminActor) -> Result<ReportAnalytics, ReportServiceError> {
        Ok(ReportAnalytics::summarize(&self.repository.list()?))
    }

    pub fn export(
        &self,
        actor: &AdminActor,
        query: &ReportQuery,
        format: ExportFormat,
    ) -> Result<String, ReportServiceError> {
        let filter = query.filter()?;
        let reports = filter.apply(self.repository.list()?);
        let rendered = format.render(&reports)?;
        info!(admin = %actor.user_id(), rows = reports.len(), format = format.file_name(), "reports exported");
        Ok(rendered)
    }

    fn roster_loads(&self) -> Result<Vec<WorkerLoad>, ReportServiceError> {
        let workers = self.roster.workers()?;
        let reports = self.repository.list()?;
        Ok(worker_loads(workers, &reports))
    }

    /// Run one lifecycle step: the next version is computed on a copy and only becomes
    /// visible once the repository accepts it.
    fn execute<F>(
        &self,
        id: &ReportId,
        action: ReportAction,
        command_for: F,
    ) -> Result<WasteReport, ReportServiceError>
    where
        F: FnOnce(&WasteReport) -> Result<ReportCommand, ReportServiceError>,
    {
        let _guard = self
            .in_flight
            .acquire(id, action)
            .ok_or_else(|| ReportServiceError::Busy {
                id: id.clone(),
                action,
            })?;

        let current = self.get(id)?;
        let command = command_for(&current)?;
        let next = command.apply(&current, Utc::now())?;

        if let Err(err) = self.repository.update(next.clone()) {
            warn!(
                report_id = %id,
                action = %action,
                status = %current.status,
                error = %err,
                "report update rejected; status unchanged"
            );
            return Err(err.into());
        }

        info!(
            report_id = %id,
            action = %action,
            from = %current.status,
            to = %next.status,
            "report status changed"
        );
        Ok(next)
    }
}

fn is_visible(session: &Session, report: &WasteReport) -> bool {
    match session.role() {
        Role::Admin | Role::Worker { .. } => true,
        Role::Citizen => report.submitted_by.as_ref() == Some(session.user_id()),
    }
}

/// Error raised by the report service.
#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Update(#[from] UpdateRequestError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("report {0} not found")]
    NotFound(ReportId),
    #[error("a {action} request for report {id} is already in progress")]
    Busy { id: ReportId, action: ReportAction },
}

impl ReportServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReportServiceError::Intake(_)
            | ReportServiceError::Filter(_)
            | ReportServiceError::Update(_)
            | ReportServiceError::Transition(TransitionError::MissingCompletionNotes)
            | ReportServiceError::Assignment(AssignmentError::UnknownWorker(_))
            | ReportServiceError::Export(ExportError::UnknownFormat(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ReportServiceError::Transition(TransitionError::NotAssignee { .. }) => {
                StatusCode::FORBIDDEN
            }
            ReportServiceError::Transition(TransitionError::InvalidTransition { .. })
            | ReportServiceError::Assignment(AssignmentError::NoAvailableWorker)
            | ReportServiceError::Repository(RepositoryError::Conflict)
            | ReportServiceError::Busy { .. } => StatusCode::CONFLICT,
            ReportServiceError::NotFound(_)
            | ReportServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            ReportServiceError::Auth(err) => err.status_code(),
            ReportServiceError::Export(_)
            | ReportServiceError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
