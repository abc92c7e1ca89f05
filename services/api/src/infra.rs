use chrono::Duration;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use wastewatch::config::AppConfig;
use wastewatch::workflows::auth::{
    AuthPolicy, AuthService, CredentialHasher, SessionRegistry, UserAccount, UserDirectory, UserId,
};
use wastewatch::workflows::reports::{
    sample, ExportFormat, ReportId, ReportRepository, ReportService, RepositoryError, WasteReport,
    Worker, WorkerId, WorkerRoster, Zone,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, store: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{store} lock poisoned")))
}

/// Report store keeping submission order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReportRepository {
    reports: Arc<Mutex<Vec<WasteReport>>>,
}

impl InMemoryReportRepository {
    pub(crate) fn with_reports(reports: Vec<WasteReport>) -> Self {
        Self {
            reports: Arc::new(Mutex::new(reports)),
        }
    }
}

impl ReportRepository for InMemoryReportRepository {
    fn insert(&self, report: WasteReport) -> Result<WasteReport, RepositoryError> {
        let mut guard = lock(&self.reports, "report")?;
        if guard.iter().any(|existing| existing.id == report.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(report.clone());
        Ok(report)
    }

    fn update(&self, report: WasteReport) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.reports, "report")?;
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == report.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = report;
        Ok(())
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<WasteReport>, RepositoryError> {
        let guard = lock(&self.reports, "report")?;
        Ok(guard.iter().find(|report| &report.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<WasteReport>, RepositoryError> {
        Ok(lock(&self.reports, "report")?.clone())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryWorkerRoster {
    workers: Arc<Mutex<Vec<Worker>>>,
}

impl InMemoryWorkerRoster {
    pub(crate) fn with_workers(workers: Vec<Worker>) -> Self {
        Self {
            workers: Arc::new(Mutex::new(workers)),
        }
    }
}

impl WorkerRoster for InMemoryWorkerRoster {
    fn workers(&self) -> Result<Vec<Worker>, RepositoryError> {
        Ok(lock(&self.workers, "roster")?.clone())
    }

    fn enroll(&self, worker: Worker) -> Result<Worker, RepositoryError> {
        let mut guard = lock(&self.workers, "roster")?;
        if guard.iter().any(|existing| existing.id == worker.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(worker.clone());
        Ok(worker)
    }

    fn withdraw(&self, id: &WorkerId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.workers, "roster")?;
        let position = guard
            .iter()
            .position(|worker| &worker.id == id)
            .ok_or(RepositoryError::NotFound)?;
        guard.remove(position);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryUserDirectory {
    accounts: Arc<Mutex<HashMap<UserId, UserAccount>>>,
}

impl UserDirectory for InMemoryUserDirectory {
    fn insert(&self, account: UserAccount) -> Result<UserAccount, RepositoryError> {
        let mut guard = lock(&self.accounts, "user")?;
        if guard
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserAccount>, RepositoryError> {
        let guard = lock(&self.accounts, "user")?;
        Ok(guard
            .values()
            .find(|account| account.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn fetch(&self, id: &UserId) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(lock(&self.accounts, "user")?.get(id).cloned())
    }
}

pub(crate) type Reports = ReportService<InMemoryReportRepository, InMemoryWorkerRoster>;
pub(crate) type Auth = AuthService<InMemoryUserDirectory, InMemoryWorkerRoster>;

/// Services sharing one roster and one session registry.
pub(crate) struct ServiceGraph {
    pub(crate) auth: Arc<Auth>,
    pub(crate) reports: Arc<Reports>,
    pub(crate) sessions: Arc<SessionRegistry>,
}

impl ServiceGraph {
    pub(crate) fn from_config(config: &AppConfig) -> Self {
        Self::assemble(
            config.data.seed_sample_data,
            AuthPolicy {
                allow_admin_signup: config.data.allow_admin_signup,
            },
            config.sessions.ttl(),
            CredentialHasher::default(),
        )
    }

    pub(crate) fn assemble(
        seed_sample_data: bool,
        policy: AuthPolicy,
        session_ttl: Duration,
        hasher: CredentialHasher,
    ) -> Self {
        let (reports, workers) = if seed_sample_data {
            (sample::reports(), sample::workers())
        } else {
            (Vec::new(), Vec::new())
        };
        let repository = Arc::new(InMemoryReportRepository::with_reports(reports));
        let roster = Arc::new(InMemoryWorkerRoster::with_workers(workers));
        let users = Arc::new(InMemoryUserDirectory::default());
        let sessions = Arc::new(SessionRegistry::new(session_ttl));

        let auth = Arc::new(AuthService::with_hasher(
            users,
            roster.clone(),
            sessions.clone(),
            policy,
            hasher,
        ));
        let reports = Arc::new(ReportService::new(repository, roster));

        Self {
            auth,
            reports,
            sessions,
        }
    }
}

pub(crate) fn parse_export_format(raw: &str) -> Result<ExportFormat, String> {
    raw.parse::<ExportFormat>().map_err(|err| err.to_string())
}

pub(crate) fn parse_zone(raw: &str) -> Result<Zone, String> {
    Zone::from_label(raw).ok_or_else(|| {
        let known: Vec<&str> = Zone::ALL.iter().map(|zone| zone.label()).collect();
        format!("unknown zone '{raw}' (expected one of {})", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_repository_keeps_submission_order_and_rejects_duplicates() {
        let repository = InMemoryReportRepository::with_reports(sample::reports());
        let mut duplicate = sample::reports().remove(0);
        assert_eq!(
            repository.insert(duplicate.clone()),
            Err(RepositoryError::Conflict)
        );

        duplicate.id = ReportId("rpt-000042".to_string());
        repository.insert(duplicate).expect("fresh id accepted");
        let ids: Vec<String> = repository
            .list()
            .expect("list succeeds")
            .into_iter()
            .map(|report| report.id.0)
            .collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6", "rpt-000042"]);
    }

    #[test]
    fn updating_an_unknown_report_is_not_found() {
        let repository = InMemoryReportRepository::default();
        let report = sample::reports().remove(0);
        assert_eq!(repository.update(report), Err(RepositoryError::NotFound));
    }

    #[test]
    fn user_directory_matches_emails_case_insensitively() {
        let users = InMemoryUserDirectory::default();
        let account = UserAccount {
            id: UserId("usr-1".to_string()),
            name: "Asha".to_string(),
            email: "asha@example.org".to_string(),
            phone: "+91-9000000001".to_string(),
            role: wastewatch::workflows::auth::Role::Citizen,
            password_hash: String::new(),
        };
        users.insert(account.clone()).expect("insert succeeds");
        assert_eq!(
            users.find_by_email("ASHA@example.org").expect("lookup"),
            Some(account.clone())
        );
        assert_eq!(users.insert(account), Err(RepositoryError::Conflict));
    }

    #[test]
    fn seeding_follows_the_flag() {
        let hasher = || CredentialHasher::with_cost(8, 1).expect("cheap hasher");
        let seeded = ServiceGraph::assemble(
            true,
            AuthPolicy::default(),
            Duration::minutes(5),
            hasher(),
        );
        let empty = ServiceGraph::assemble(
            false,
            AuthPolicy::default(),
            Duration::minutes(5),
            hasher(),
        );
        assert!(seeded
            .reports
            .get(&ReportId("1".to_string()))
            .is_ok());
        assert!(empty.reports.get(&ReportId("1".to_string())).is_err());
    }

    #[test]
    fn cli_parsers_report_helpful_errors() {
        assert_eq!(parse_zone("central"), Ok(Zone::Central));
        assert!(parse_zone("Uptown")
            .expect_err("unknown zone")
            .contains("North, South, East, West, Central"));
        assert_eq!(parse_export_format("HTML"), Ok(ExportFormat::Html));
        assert!(parse_export_format("pdf").is_err());
    }
}
