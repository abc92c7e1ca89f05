use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::request::Builder;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::Duration;
use serde_json::Value;

use crate::workflows::auth::{Role, Session, SessionRegistry, UserAccount, UserId};
use crate::workflows::reports::domain::{
    GeoLocation, ReportId, ReportSubmission, Reporter, WasteReport, WasteType, Worker, WorkerId,
    Zone,
};
use crate::workflows::reports::repository::{ReportRepository, RepositoryError, WorkerRoster};
use crate::workflows::reports::{report_router, sample, ReportService};

#[derive(Default)]
pub(super) struct MemoryRepository {
    pub(super) reports: Mutex<Vec<WasteReport>>,
}

impl MemoryRepository {
    pub(super) fn seeded() -> Self {
        Self {
            reports: Mutex::new(sample::reports()),
        }
    }

    pub(super) fn stored(&self, id: &str) -> WasteReport {
        self.fetch(&ReportId(id.to_string()))
            .expect("fetch succeeds")
            .expect("report present")
    }

    pub(super) fn list_len(&self) -> usize {
        self.reports.lock().expect("repository mutex poisoned").len()
    }
}

impl ReportRepository for MemoryRepository {
    fn insert(&self, report: WasteReport) -> Result<WasteReport, RepositoryError> {
        let mut guard = self.reports.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == report.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(report.clone());
        Ok(report)
    }

    fn update(&self, report: WasteReport) -> Result<(), RepositoryError> {
        let mut guard = self.reports.lock().expect("repository mutex poisoned");
        let slot = guard
            .iter_mut()
            .find(|existing| existing.id == report.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = report;
        Ok(())
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<WasteReport>, RepositoryError> {
        let guard = self.reports.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|report| &report.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<WasteReport>, RepositoryError> {
        Ok(self.reports.lock().expect("repository mutex poisoned").clone())
    }
}

/// Reads succeed, every write of an existing report fails.
pub(super) struct FailingUpdateRepository {
    pub(super) inner: MemoryRepository,
}

impl FailingUpdateRepository {
    pub(super) fn seeded() -> Self {
        Self {
            inner: MemoryRepository::seeded(),
        }
    }
}

impl ReportRepository for FailingUpdateRepository {
    fn insert(&self, report: WasteReport) -> Result<WasteReport, RepositoryError> {
        self.inner.insert(report)
    }

    fn update(&self, _report: WasteReport) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, id: &ReportId) -> Result<Option<WasteReport>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn list(&self) -> Result<Vec<WasteReport>, RepositoryError> {
        self.inner.list()
    }
}

#[derive(Default)]
pub(super) struct MemoryRoster {
    workers: Mutex<Vec<Worker>>,
}

impl MemoryRoster {
    pub(super) fn seeded() -> Self {
        Self {
            workers: Mutex::new(sample::workers()),
        }
    }
}

impl WorkerRoster for MemoryRoster {
    fn workers(&self) -> Result<Vec<Worker>, RepositoryError> {
        Ok(self.workers.lock().expect("roster mutex poisoned").clone())
    }

    fn enroll(&self, worker: Worker) -> Result<Worker, RepositoryError> {
        self.workers
            .lock()
            .expect("roster mutex poisoned")
            .push(worker.clone());
        Ok(worker)
    }

    fn withdraw(&self, id: &WorkerId) -> Result<(), RepositoryError> {
        let mut guard = self.workers.lock().expect("roster mutex poisoned");
        let before = guard.len();
        guard.retain(|worker| &worker.id != id);
        if guard.len() == before {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }
}

pub(super) fn build_service() -> (
    ReportService<MemoryRepository, MemoryRoster>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::seeded());
    let service = ReportService::new(repository.clone(), Arc::new(MemoryRoster::seeded()));
    (service, repository)
}

pub(super) fn registry() -> Arc<SessionRegistry> {
    Arc::new(SessionRegistry::new(Duration::minutes(30)))
}

fn account(id: &str, role: Role) -> UserAccount {
    UserAccount {
        id: UserId(id.to_string()),
        name: format!("User {id}"),
        email: format!("{id}@wastewatch.example"),
        phone: "+91-9000000000".to_string(),
        role,
        password_hash: String::new(),
    }
}

pub(super) fn admin_session(registry: &SessionRegistry) -> Session {
    registry.open(&account("usr-admin", Role::Admin))
}

pub(super) fn worker_session(registry: &SessionRegistry, worker_id: &str) -> Session {
    registry.open(&account(
        &format!("usr-{worker_id}"),
        Role::Worker {
            worker_id: WorkerId(worker_id.to_string()),
        },
    ))
}

pub(super) fn citizen_session(registry: &SessionRegistry, user_id: &str) -> Session {
    registry.open(&account(user_id, Role::Citizen))
}

pub(super) fn submission() -> ReportSubmission {
    ReportSubmission {
        reporter: Reporter {
            name: "Priya Nair".to_string(),
            phone: "+91-9123456789".to_string(),
        },
        location: GeoLocation {
            latitude: 12.9716,
            longitude: 77.5946,
            address: Some(" 4th Cross, Indiranagar ".to_string()),
            zone: Some(Zone::East),
        },
        waste_type: WasteType::Plastic,
        severity: 6.5,
        confidence: 0.82,
        description: Some("Bags piled by the bus stop".to_string()),
        photo: None,
    }
}

pub(super) fn router_with<R>(
    service: ReportService<R, MemoryRoster>,
    registry: Arc<SessionRegistry>,
) -> Router
where
    R: ReportRepository + 'static,
{
    report_router(Arc::new(service), registry)
}

pub(super) fn authorized(method: &str, uri: &str, session: &Session) -> Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", session.token()))
}

pub(super) fn json_request(
    method: &str,
    uri: &str,
    session: &Session,
    body: Value,
) -> Request<Body> {
    authorized(method, uri, session)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) async fn read_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn doc_ids(payload: &Value) -> Vec<String> {
    payload["data"]["docs"]
        .as_array()
        .expect("docs array")
        .iter()
        .filter_map(|doc| doc["id"].as_str().map(str::to_string))
        .collect()
}
