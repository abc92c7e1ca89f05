use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;

use super::domain::{AdminActor, Role, UserAccount, UserId, WorkerActor};
use super::AuthError;

const TOKEN_LENGTH: usize = 64;

/// Bearer session created at login/registration and destroyed at logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    user_id: UserId,
    role: Role,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn admin(&self) -> Result<AdminActor, AuthError> {
        match self.role {
            Role::Admin => Ok(AdminActor::new(self.user_id.clone())),
            Role::Citizen | Role::Worker { .. } => Err(AuthError::Forbidden("admin role required")),
        }
    }

    pub fn worker(&self) -> Result<WorkerActor, AuthError> {
        match &self.role {
            Role::Worker { worker_id } => {
                Ok(WorkerActor::new(self.user_id.clone(), worker_id.clone()))
            }
            Role::Citizen | Role::Admin => Err(AuthError::Forbidden("worker role required")),
        }
    }
}

/// In-process session table keyed by token.
pub struct SessionRegistry {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn open(&self, account: &UserAccount) -> Session {
        self.open_at(account, Utc::now())
    }

    pub(crate) fn open_at(&self, account: &UserAccount, now: DateTime<Utc>) -> Session {
        let session = Session {
            token: generate_token(),
            user_id: account.id.clone(),
            role: account.role.clone(),
            created_at: now,
            expires_at: now + self.ttl,
        };
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, existing| !existing.is_expired(now));
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    pub fn resolve(&self, token: &str) -> Result<Session, AuthError> {
        self.resolve_at(token, Utc::now())
    }

    /// Expired sessions are evicted on lookup and swept whenever a new one opens.
    pub(crate) fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Result<Session, AuthError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        match sessions.get(token) {
            None => Err(AuthError::Unauthenticated),
            Some(session) if session.is_expired(now) => {
                sessions.remove(token);
                Err(AuthError::SessionExpired)
            }
            Some(session) => Ok(session.clone()),
        }
    }

    /// Returns whether a session was removed.
    pub fn close(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }

    pub fn active_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::reports::domain::WorkerId;

    fn account(role: Role) -> UserAccount {
        UserAccount {
            id: UserId("usr-test".to_string()),
            name: "Test User".to_string(),
            email: "test@wastewatch.example".to_string(),
            phone: "+91-9000000000".to_string(),
            role,
            password_hash: String::new(),
        }
    }

    #[test]
    fn sessions_resolve_until_closed() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let session = registry.open(&account(Role::Citizen));

        assert_eq!(session.token().len(), TOKEN_LENGTH);
        assert_eq!(registry.resolve(session.token()), Ok(session.clone()));
        assert!(registry.close(session.token()));
        assert!(!registry.close(session.token()));
        assert_eq!(
            registry.resolve(session.token()),
            Err(AuthError::Unauthenticated)
        );
    }

    #[test]
    fn expired_sessions_are_evicted() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let opened = Utc::now();
        let session = registry.open_at(&account(Role::Citizen), opened);

        let later = opened + Duration::minutes(31);
        assert_eq!(
            registry.resolve_at(session.token(), later),
            Err(AuthError::SessionExpired)
        );
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn opening_a_session_sweeps_abandoned_expired_ones() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let opened = Utc::now();
        for _ in 0..50 {
            registry.open_at(&account(Role::Citizen), opened);
        }
        assert_eq!(registry.active_count(), 50);

        let later = opened + Duration::minutes(31);
        let live = registry.open_at(&account(Role::Citizen), later);
        assert_eq!(registry.active_count(), 1);
        assert_eq!(registry.resolve_at(live.token(), later), Ok(live.clone()));
    }

    #[test]
    fn role_capabilities_follow_the_session_role() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let admin = registry.open(&account(Role::Admin));
        let worker = registry.open(&account(Role::Worker {
            worker_id: WorkerId("w-1".to_string()),
        }));
        let citizen = registry.open(&account(Role::Citizen));

        assert!(admin.admin().is_ok());
        assert!(admin.worker().is_err());
        assert_eq!(
            worker.worker().map(|actor| actor.worker_id().0.clone()),
            Ok("w-1".to_string())
        );
        assert!(matches!(citizen.admin(), Err(AuthError::Forbidden(_))));
        assert!(matches!(citizen.worker(), Err(AuthError::Forbidden(_))));
    }
}
