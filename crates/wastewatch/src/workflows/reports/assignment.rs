use serde::Serialize;

use super::domain::{AssignedWorker, WasteReport, Worker, WorkerId, WorkerLoad};

/// Number of reports held by `worker` that are Assigned or In Progress.
pub fn active_jobs(reports: &[WasteReport], worker: &WorkerId) -> usize {
    reports
        .iter()
        .filter(|report| report.status.is_active() && report.is_assigned_to(worker))
        .count()
}

/// Pairs every roster entry with its derived load, preserving roster order.
pub fn worker_loads(workers: Vec<Worker>, reports: &[WasteReport]) -> Vec<WorkerLoad> {
    workers
        .into_iter()
        .map(|worker| {
            let active_jobs = active_jobs(reports, &worker.id);
            WorkerLoad {
                worker,
                active_jobs,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentMatch {
    pub worker: AssignedWorker,
    pub zone_match: bool,
    pub active_jobs: usize,
}

/// Picks a worker for a report from a roster snapshot.
pub struct AssignmentResolver<'a> {
    roster: &'a [WorkerLoad],
}

impl<'a> AssignmentResolver<'a> {
    pub fn new(roster: &'a [WorkerLoad]) -> Self {
        Self { roster }
    }

    /// Manual selection: the named worker must be on the roster.
    pub fn select(&self, worker_id: &WorkerId) -> Result<AssignmentMatch, AssignmentError> {
        self.roster
            .iter()
            .find(|load| &load.worker.id == worker_id)
            .map(|load| AssignmentMatch {
                worker: load.worker.assignment(),
                zone_match: false,
                active_jobs: load.active_jobs,
            })
            .ok_or_else(|| AssignmentError::UnknownWorker(worker_id.clone()))
    }

    /// Zone match by exact equality, then lowest active jobs, then worker id.
    ///
    /// Reports without a zone, or zones nobody covers, fall back to the whole roster.
    pub fn recommend(&self, report: &WasteReport) -> Result<AssignmentMatch, AssignmentError> {
        let zoned: Vec<&WorkerLoad> = match report.location.zone {
            Some(zone) => self
                .roster
                .iter()
                .filter(|load| load.worker.zone == zone)
                .collect(),
            None => Vec::new(),
        };
        let zone_match = !zoned.is_empty();
        let candidates = if zone_match {
            zoned
        } else {
            self.roster.iter().collect()
        };

        candidates
            .into_iter()
            .min_by(|a, b| {
                a.active_jobs
                    .cmp(&b.active_jobs)
                    .then_with(|| a.worker.id.cmp(&b.worker.id))
            })
            .map(|load| AssignmentMatch {
                worker: load.worker.assignment(),
                zone_match,
                active_jobs: load.active_jobs,
            })
            .ok_or(AssignmentError::NoAvailableWorker)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error("no available worker")]
    NoAvailableWorker,
    #[error("worker {0} is not on the roster")]
    UnknownWorker(WorkerId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::reports::domain::{ReportStatus, Zone};
    use crate::workflows::reports::sample;

    fn loads() -> Vec<WorkerLoad> {
        worker_loads(sample::workers(), &sample::reports())
    }

    fn sample_report(id: &str) -> WasteReport {
        sample::reports()
            .into_iter()
            .find(|report| report.id.0 == id)
            .expect("sample report present")
    }

    #[test]
    fn active_jobs_counts_only_assigned_and_in_progress() {
        let loads = loads();
        let by_id = |id: &str| {
            loads
                .iter()
                .find(|load| load.worker.id.0 == id)
                .map(|load| load.active_jobs)
        };
        assert_eq!(by_id("w-1"), Some(1));
        assert_eq!(by_id("w-2"), Some(1));
        assert_eq!(by_id("w-3"), Some(0), "resolved work does not count");
        assert_eq!(by_id("w-4"), Some(1));
    }

    #[test]
    fn recommend_prefers_zone_then_load() {
        let mut roster = loads();
        roster.push(WorkerLoad {
            worker: Worker {
                id: WorkerId("w-5".to_string()),
                name: "Nikhil Bose".to_string(),
                phone: "+91-9800000005".to_string(),
                email: "nikhil.bose@wastewatch.example".to_string(),
                zone: Zone::North,
            },
            active_jobs: 0,
        });
        let resolver = AssignmentResolver::new(&roster);

        let pick = resolver
            .recommend(&sample_report("1"))
            .expect("north has workers");
        assert_eq!(pick.worker.id.0, "w-5", "idle north worker wins over w-1");
        assert!(pick.zone_match);
    }

    #[test]
    fn unzoned_reports_fall_back_to_least_loaded_worker() {
        let roster = loads();
        let pick = AssignmentResolver::new(&roster)
            .recommend(&sample_report("5"))
            .expect("roster not empty");
        assert_eq!(pick.worker.id.0, "w-3");
        assert!(!pick.zone_match);
    }

    #[test]
    fn ties_break_on_worker_id() {
        let roster: Vec<WorkerLoad> = loads()
            .into_iter()
            .map(|mut load| {
                load.active_jobs = 2;
                load
            })
            .rev()
            .collect();
        let mut report = sample_report("5");
        report.status = ReportStatus::Pending;
        let pick = AssignmentResolver::new(&roster)
            .recommend(&report)
            .expect("roster not empty");
        assert_eq!(pick.worker.id.0, "w-1");
    }

    #[test]
    fn empty_roster_has_no_available_worker() {
        let roster: Vec<WorkerLoad> = Vec::new();
        assert_eq!(
            AssignmentResolver::new(&roster).recommend(&sample_report("1")),
            Err(AssignmentError::NoAvailableWorker)
        );
    }

    #[test]
    fn select_rejects_unknown_workers() {
        let roster = loads();
        let resolver = AssignmentResolver::new(&roster);
        assert_eq!(
            resolver.select(&WorkerId("w-1".to_string())).map(|m| m.worker.name),
            Ok("Anita Sharma".to_string())
        );
        assert_eq!(
            resolver.select(&WorkerId("w-404".to_string())),
            Err(AssignmentError::UnknownWorker(WorkerId("w-404".to_string())))
        );
    }
}
