use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AssignedWorker, ReportStatus, WasteReport, WorkerId};

/// Mutation kinds guarded by the in-flight tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportAction {
    Assign,
    Start,
    Complete,
}

impl ReportAction {
    pub const fn label(self) -> &'static str {
        match self {
            ReportAction::Assign => "assign",
            ReportAction::Start => "start",
            ReportAction::Complete => "complete",
        }
    }
}

impl fmt::Display for ReportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One forward step of the report workflow.
///
/// Commands never mutate in place: `apply` returns the next version of the report so
/// callers can commit it only once storage has accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportCommand {
    Assign { worker: AssignedWorker },
    Start { worker: WorkerId },
    Complete { worker: WorkerId, notes: String },
}

impl ReportCommand {
    pub const fn action(&self) -> ReportAction {
        match self {
            ReportCommand::Assign { .. } => ReportAction::Assign,
            ReportCommand::Start { .. } => ReportAction::Start,
            ReportCommand::Complete { .. } => ReportAction::Complete,
        }
    }

    pub const fn required_status(&self) -> ReportStatus {
        match self {
            ReportCommand::Assign { .. } => ReportStatus::Pending,
            ReportCommand::Start { .. } => ReportStatus::Assigned,
            ReportCommand::Complete { .. } => ReportStatus::InProgress,
        }
    }

    pub const fn target_status(&self) -> ReportStatus {
        match self {
            ReportCommand::Assign { .. } => ReportStatus::Assigned,
            ReportCommand::Start { .. } => ReportStatus::InProgress,
            ReportCommand::Complete { .. } => ReportStatus::Resolved,
        }
    }

    pub fn apply(
        &self,
        report: &WasteReport,
        at: DateTime<Utc>,
    ) -> Result<WasteReport, TransitionError> {
        let required = self.required_status();
        if report.status != required {
            return Err(TransitionError::InvalidTransition {
                action: self.action(),
                from: report.status,
            });
        }

        let mut next = report.clone();
        match self {
            ReportCommand::Assign { worker } => {
                next.assigned_worker = Some(worker.clone());
            }
            ReportCommand::Start { worker } => {
                ensure_assignee(report, worker)?;
            }
            ReportCommand::Complete { worker, notes } => {
                ensure_assignee(report, worker)?;
                let notes = notes.trim();
                if notes.is_empty() {
                    return Err(TransitionError::MissingCompletionNotes);
                }
                next.completion_notes = Some(notes.to_string());
            }
        }

        next.status = self.target_status();
        next.updated_at = at;
        Ok(next)
    }
}

fn ensure_assignee(report: &WasteReport, worker: &WorkerId) -> Result<(), TransitionError> {
    if report.is_assigned_to(worker) {
        Ok(())
    } else {
        Err(TransitionError::NotAssignee {
            worker: worker.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot {action} a report that is {from}")]
    InvalidTransition {
        action: ReportAction,
        from: ReportStatus,
    },
    #[error("completion notes are required to resolve a report")]
    MissingCompletionNotes,
    #[error("report is not assigned to worker {worker}")]
    NotAssignee { worker: WorkerId },
}

/// Partial body accepted by `PUT /api/reports/:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportUpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completion_notes: Option<String>,
    #[serde(default, alias = "assignedWorkerId")]
    pub assigned_agent_id: Option<String>,
}

/// The single transition a partial update asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateIntent {
    Assign(WorkerId),
    Start,
    Complete(String),
}

impl UpdateIntent {
    pub const fn action(&self) -> ReportAction {
        match self {
            UpdateIntent::Assign(_) => ReportAction::Assign,
            UpdateIntent::Start => ReportAction::Start,
            UpdateIntent::Complete(_) => ReportAction::Complete,
        }
    }
}

impl ReportUpdateRequest {
    /// A worker id without a status means "assign"; otherwise the target status decides.
    pub fn intent(&self) -> Result<UpdateIntent, UpdateRequestError> {
        let worker = self
            .assigned_agent_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| WorkerId(id.to_string()));

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => {
                return worker
                    .map(UpdateIntent::Assign)
                    .ok_or(UpdateRequestError::MissingStatus)
            }
            Some(raw) => ReportStatus::from_label(raw)
                .ok_or_else(|| UpdateRequestError::UnknownStatus(raw.to_string()))?,
        };

        match status {
            ReportStatus::Assigned => worker
                .map(UpdateIntent::Assign)
                .ok_or(UpdateRequestError::MissingWorker),
            ReportStatus::InProgress => Ok(UpdateIntent::Start),
            ReportStatus::Resolved => Ok(UpdateIntent::Complete(
                self.completion_notes.clone().unwrap_or_default(),
            )),
            ReportStatus::Pending => Err(UpdateRequestError::UnsupportedStatus(status)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdateRequestError {
    #[error("status or assignedAgentId is required")]
    MissingStatus,
    #[error("unknown status '{0}'")]
    UnknownStatus(String),
    #[error("assignedAgentId is required to assign a report")]
    MissingWorker,
    #[error("reports cannot be moved to {0}")]
    UnsupportedStatus(ReportStatus),
}
