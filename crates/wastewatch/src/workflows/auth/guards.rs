//! Request extractors resolving the bearer token into a session and role capability.
//!
//! The [`SessionRegistry`] is read from request extensions, so routers using these
//! guards must be layered with `Extension(Arc<SessionRegistry>)`.

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::domain::{AdminActor, WorkerActor};
use super::session::{Session, SessionRegistry};
use super::AuthError;

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Any live session.
pub struct Authenticated(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(registry) = parts.extensions.get::<Arc<SessionRegistry>>().cloned() else {
            tracing::error!("session registry missing from request extensions");
            return Err(AuthError::Unauthenticated);
        };
        let token = bearer_token(&parts.headers).ok_or(AuthError::Unauthenticated)?;
        registry.resolve(token).map(Authenticated)
    }
}

pub struct RequireAdmin {
    pub actor: AdminActor,
    pub session: Session,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(session) = Authenticated::from_request_parts(parts, state).await?;
        let actor = session.admin()?;
        Ok(Self { actor, session })
    }
}

pub struct RequireWorker {
    pub actor: WorkerActor,
    pub session: Session,
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireWorker
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(session) = Authenticated::from_request_parts(parts, state).await?;
        let actor = session.worker()?;
        Ok(Self { actor, session })
    }
}
