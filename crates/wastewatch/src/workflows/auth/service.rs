use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use super::domain::{LoginRequest, RegisterRequest, Role, RoleKind, UserAccount, UserId};
use super::password::CredentialHasher;
use super::repository::UserDirectory;
use super::session::{Session, SessionRegistry};
use super::AuthError;
use crate::workflows::reports::domain::{Worker, WorkerId};
use crate::workflows::reports::repository::{RepositoryError, WorkerRoster};

static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static WORKER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_user_id() -> UserId {
    let id = USER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UserId(format!("usr-{id:06}"))
}

fn next_worker_id() -> WorkerId {
    let id = WORKER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    WorkerId(format!("wkr-{id:06}"))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthPolicy {
    pub allow_admin_signup: bool,
}

/// Registration, login, and logout over a user directory and the worker roster.
pub struct AuthService<U, W> {
    users: Arc<U>,
    roster: Arc<W>,
    sessions: Arc<SessionRegistry>,
    hasher: CredentialHasher,
    policy: AuthPolicy,
}

impl<U, W> AuthService<U, W>
where
    U: UserDirectory + 'static,
    W: WorkerRoster + 'static,
{
    pub fn new(
        users: Arc<U>,
        roster: Arc<W>,
        sessions: Arc<SessionRegistry>,
        policy: AuthPolicy,
    ) -> Self {
        Self::with_hasher(users, roster, sessions, policy, CredentialHasher::default())
    }

    pub fn with_hasher(
        users: Arc<U>,
        roster: Arc<W>,
        sessions: Arc<SessionRegistry>,
        policy: AuthPolicy,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            users,
            roster,
            sessions,
            hasher,
            policy,
        }
    }

    pub fn sessions(&self) -> Arc<SessionRegistry> {
        self.sessions.clone()
    }

    /// Create an account and open its first session.
    ///
    /// Worker accounts are enrolled on the roster under a fresh worker id.
    pub fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<(Session, UserAccount), AuthError> {
        request.validate()?;
        if request
            .confirm_password
            .as_deref()
            .is_some_and(|confirm| confirm != request.password)
        {
            return Err(AuthError::PasswordMismatch);
        }

        let name = request.name.trim().to_string();
        let phone = request.phone.trim().to_string();
        if name.is_empty() || phone.is_empty() {
            return Err(AuthError::Validation(
                "name and phone must not be blank".to_string(),
            ));
        }

        let email = request.email.trim().to_lowercase();
        if self.users.find_by_email(&email)?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        if request.role == RoleKind::Admin && !self.policy.allow_admin_signup {
            warn!(%email, "admin self-registration refused");
            return Err(AuthError::Forbidden("admin sign-up is disabled"));
        }
        if request.role == RoleKind::Worker && request.zone.is_none() {
            return Err(AuthError::MissingZone);
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let role = match (request.role, request.zone) {
            (RoleKind::Citizen, _) => Role::Citizen,
            (RoleKind::Admin, _) => Role::Admin,
            (RoleKind::Worker, Some(zone)) => {
                let worker = self.roster.enroll(Worker {
                    id: next_worker_id(),
                    name: name.clone(),
                    phone: phone.clone(),
                    email: email.clone(),
                    zone,
                })?;
                Role::Worker {
                    worker_id: worker.id,
                }
            }
            (RoleKind::Worker, None) => return Err(AuthError::MissingZone),
        };

        let enrolled = match &role {
            Role::Worker { worker_id } => Some(worker_id.clone()),
            Role::Citizen | Role::Admin => None,
        };
        let inserted = self.users.insert(UserAccount {
            id: next_user_id(),
            name,
            email,
            phone,
            role,
            password_hash,
        });
        let account = match inserted {
            Ok(account) => account,
            Err(err) => {
                if let Some(worker_id) = enrolled {
                    self.withdraw_orphan(&worker_id);
                }
                return Err(match err {
                    RepositoryError::Conflict => AuthError::EmailTaken,
                    other => AuthError::Repository(other),
                });
            }
        };

        let session = self.sessions.open(&account);
        info!(user_id = %account.id, role = account.role.kind().label(), "account registered");
        Ok((session, account))
    }

    fn withdraw_orphan(&self, worker_id: &WorkerId) {
        if let Err(err) = self.roster.withdraw(worker_id) {
            warn!(%worker_id, error = %err, "failed to withdraw worker after registration failure");
        }
    }

    pub fn login(&self, request: LoginRequest) -> Result<(Session, UserAccount), AuthError> {
        request.validate()?;
        let email = request.email.trim().to_lowercase();

        let account = self
            .users
            .find_by_email(&email)?
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.hasher.verify(&request.password, &account.password_hash)? {
            warn!(user_id = %account.id, "login rejected: bad password");
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.sessions.open(&account);
        info!(user_id = %account.id, "session opened");
        Ok((session, account))
    }

    pub fn me(&self, session: &Session) -> Result<UserAccount, AuthError> {
        self.users
            .fetch(session.user_id())?
            .ok_or(AuthError::Unauthenticated)
    }

    pub fn logout(&self, session: &Session) -> bool {
        let closed = self.sessions.close(session.token());
        info!(user_id = %session.user_id(), closed, "session closed");
        closed
    }
}
