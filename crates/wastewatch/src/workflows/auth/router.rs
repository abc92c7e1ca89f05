use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};

use super::domain::{AuthResponse, LoginRequest, RegisterRequest};
use super::guards::Authenticated;
use super::repository::UserDirectory;
use super::service::AuthService;
use super::AuthError;
use crate::workflows::extract::ApiJson;
use crate::workflows::reports::repository::WorkerRoster;

/// Router builder exposing registration, login, and session endpoints.
pub fn auth_router<U, W>(service: Arc<AuthService<U, W>>) -> Router
where
    U: UserDirectory + 'static,
    W: WorkerRoster + 'static,
{
    let sessions = service.sessions();
    Router::new()
        .route("/api/auth/register", post(register_handler::<U, W>))
        .route("/api/auth/login", post(login_handler::<U, W>))
        .route("/api/auth/me", get(me_handler::<U, W>))
        .route("/api/auth/logout", post(logout_handler::<U, W>))
        .layer(Extension(sessions))
        .with_state(service)
}

/// Argon2 work runs on the blocking pool.
async fn off_runtime<T, F>(task: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| AuthError::TaskFailed(err.to_string()))?
}

pub(crate) async fn register_handler<U, W>(
    State(service): State<Arc<AuthService<U, W>>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError>
where
    U: UserDirectory + 'static,
    W: WorkerRoster + 'static,
{
    let (session, account) = off_runtime(move || service.register(request)).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: session.token().to_string(),
            user: account.view(),
        }),
    ))
}

pub(crate) async fn login_handler<U, W>(
    State(service): State<Arc<AuthService<U, W>>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError>
where
    U: UserDirectory + 'static,
    W: WorkerRoster + 'static,
{
    let (session, account) = off_runtime(move || service.login(request)).await?;
    Ok(Json(AuthResponse {
        token: session.token().to_string(),
        user: account.view(),
    }))
}

pub(crate) async fn me_handler<U, W>(
    State(service): State<Arc<AuthService<U, W>>>,
    Authenticated(session): Authenticated,
) -> Response
where
    U: UserDirectory + 'static,
    W: WorkerRoster + 'static,
{
    match service.me(&session) {
        Ok(account) => Json(account.view()).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn logout_handler<U, W>(
    State(service): State<Arc<AuthService<U, W>>>,
    Authenticated(session): Authenticated,
) -> StatusCode
where
    U: UserDirectory + 'static,
    W: WorkerRoster + 'static,
{
    service.logout(&session);
    StatusCode::NO_CONTENT
}
