//! Accounts, bearer sessions, and role capabilities.
//!
//! A [`Session`] exists from login (or registration) until logout or expiry. Role-gated
//! report operations take an [`AdminActor`] or [`WorkerActor`], which can only be minted
//! from a session holding that role.

pub mod domain;
pub mod guards;
mod password;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::workflows::reports::repository::RepositoryError;

pub use domain::{
    AdminActor, AuthResponse, LoginRequest, RegisterRequest, Role, RoleKind, UserAccount,
    UserId, UserView, WorkerActor,
};
pub use guards::{bearer_token, Authenticated, RequireAdmin, RequireWorker};
pub use password::CredentialHasher;
pub use repository::UserDirectory;
pub use router::auth_router;
pub use service::{AuthPolicy, AuthService};
pub use session::{Session, SessionRegistry};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("zone is required for worker accounts")]
    MissingZone,
    #[error("email is already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthenticated,
    #[error("session expired")]
    SessionExpired,
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("credential task failed: {0}")]
    TaskFailed(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(value: validator::ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) | AuthError::PasswordMismatch | AuthError::MissingZone => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AuthError::EmailTaken | AuthError::Repository(RepositoryError::Conflict) => {
                StatusCode::CONFLICT
            }
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Hashing(_) | AuthError::TaskFailed(_) | AuthError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "auth request failed");
        }
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
