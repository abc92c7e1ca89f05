use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::workflows::reports::domain::{WorkerId, Zone};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role requested at registration, before a worker id exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    #[default]
    Citizen,
    Worker,
    Admin,
}

impl RoleKind {
    pub const fn label(self) -> &'static str {
        match self {
            RoleKind::Citizen => "citizen",
            RoleKind::Worker => "worker",
            RoleKind::Admin => "admin",
        }
    }
}

/// Account role. Workers carry the roster entry they act as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Role {
    Citizen,
    Worker { worker_id: WorkerId },
    Admin,
}

impl Role {
    pub const fn kind(&self) -> RoleKind {
        match self {
            Role::Citizen => RoleKind::Citizen,
            Role::Worker { .. } => RoleKind::Worker,
            Role::Admin => RoleKind::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub password_hash: String,
}

impl UserAccount {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            role: self.role.kind().label(),
            worker_id: match &self.role {
                Role::Worker { worker_id } => Some(worker_id.clone()),
                Role::Citizen | Role::Admin => None,
            },
        }
    }
}

/// Public account shape; never includes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<WorkerId>,
}

/// Capability for admin-only operations. Only obtainable from an admin session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminActor {
    user_id: UserId,
}

impl AdminActor {
    pub(crate) fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

/// Capability for field-worker operations, bound to one roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerActor {
    user_id: UserId,
    worker_id: WorkerId,
}

impl WorkerActor {
    pub(crate) fn new(user_id: UserId, worker_id: WorkerId) -> Self {
        Self { user_id, worker_id }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn worker_id(&self) -> &WorkerId {
        &self.worker_id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[serde(default, alias = "confirm_password")]
    pub confirm_password: Option<String>,

    #[validate(length(min = 1, max = 32, message = "Phone must be 1-32 characters"))]
    pub phone: String,

    #[serde(default)]
    pub role: RoleKind,

    #[serde(default)]
    pub zone: Option<Zone>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}
