use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::json;

use super::domain::ReportId;
use super::export::ExportFormat;
use super::filter::ReportQuery;
use super::intake::SubmissionForm;
use super::lifecycle::ReportUpdateRequest;
use super::repository::{ReportRepository, WorkerRoster};
use super::service::{ReportService, ReportServiceError};
use crate::workflows::auth::{Authenticated, RequireAdmin, SessionRegistry};
use crate::workflows::extract::{ApiJson, ApiMultipart, ApiQuery};

/// Router builder exposing intake, triage, lifecycle, and reporting endpoints.
pub fn report_router<R, W>(
    service: Arc<ReportService<R, W>>,
    sessions: Arc<SessionRegistry>,
) -> Router
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    Router::new()
        .route(
            "/api/reports",
            get(list_handler::<R, W>).post(submit_handler::<R, W>),
        )
        .route("/api/reports/my-reports", get(my_reports_handler::<R, W>))
        .route("/api/reports/export.csv", get(export_csv_handler::<R, W>))
        .route("/api/reports/export.html", get(export_html_handler::<R, W>))
        .route(
            "/api/reports/:report_id",
            get(detail_handler::<R, W>).put(update_handler::<R, W>),
        )
        .route(
            "/api/reports/:report_id/auto-assign",
            post(auto_assign_handler::<R, W>),
        )
        .route("/api/workers", get(workers_handler::<R, W>))
        .route("/api/analytics", get(analytics_handler::<R, W>))
        .layer(Extension(sessions))
        .with_state(service)
}

pub(crate) fn service_error_response(err: ReportServiceError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!(error = %err, "report request failed");
    }
    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn list_handler<R, W>(
    State(service): State<Arc<ReportService<R, W>>>,
    Authenticated(session): Authenticated,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    match service.page(&session, &query) {
        Ok(page) => Json(json!({ "data": page })).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn my_reports_handler<R, W>(
    State(service): State<Arc<ReportService<R, W>>>,
    Authenticated(session): Authenticated,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    match service.my_reports(session.user_id()) {
        Ok(reports) => Json(json!({ "data": reports })).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn submit_handler<R, W>(
    State(service): State<Arc<ReportService<R, W>>>,
    Authenticated(session): Authenticated,
    ApiMultipart(multipart): ApiMultipart,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    let submission = match SubmissionForm::read(multipart)
        .await
        .and_then(SubmissionForm::into_submission)
    {
        Ok(submission) => submission,
        Err(err) => return service_error_response(err.into()),
    };

    match service.submit(Some(session.user_id().clone()), submission) {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn detail_handler<R, W>(
    State(service): State<Arc<ReportService<R, W>>>,
    Authenticated(session): Authenticated,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    match service.get_visible(&session, &ReportId(report_id)) {
        Ok(report) => Json(report).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn update_handler<R, W>(
    State(service): State<Arc<ReportService<R, W>>>,
    Authenticated(session): Authenticated,
    Path(report_id): Path<String>,
    ApiJson(request): ApiJson<ReportUpdateRequest>,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    match service.update(&session, &ReportId(report_id), &request) {
        Ok(report) => Json(report).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn auto_assign_handler<R, W>(
    State(service): State<Arc<ReportService<R, W>>>,
    admin: RequireAdmin,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    match service.auto_assign(&admin.actor, &ReportId(report_id)) {
        Ok((report, assignment)) => Json(json!({
            "report": report,
            "assignment": assignment,
        }))
        .into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn export_csv_handler<R, W>(
    State(service): State<Arc<ReportService<R, W>>>,
    admin: RequireAdmin,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    export_response(&service, &admin, &query, ExportFormat::Csv)
}

pub(crate) async fn export_html_handler<R, W>(
    State(service): State<Arc<ReportService<R, W>>>,
    admin: RequireAdmin,
    ApiQuery(query): ApiQuery<ReportQuery>,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    export_response(&service, &admin, &query, ExportFormat::Html)
}

fn export_response<R, W>(
    service: &ReportService<R, W>,
    admin: &RequireAdmin,
    query: &ReportQuery,
    format: ExportFormat,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    match service.export(&admin.actor, query, format) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, format.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", format.file_name()),
                ),
            ],
            body,
        )
            .into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn workers_handler<R, W>(
    State(service): State<Arc<ReportService<R, W>>>,
    admin: RequireAdmin,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    match service.worker_loads(&admin.actor) {
        Ok(loads) => Json(json!({ "data": loads })).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn analytics_handler<R, W>(
    State(service): State<Arc<ReportService<R, W>>>,
    admin: RequireAdmin,
) -> Response
where
    R: ReportRepository + 'static,
    W: WorkerRoster + 'static,
{
    match service.analytics(&admin.actor) {
        Ok(summary) => Json(summary).into_response(),
        Err(err) => service_error_response(err),
    }
}
