//! Role model - account-scoped roles with permission entries.

use crate::models::condition::Condition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One permission entry inside a role's JSONB permissions array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub resource: String,
    pub action: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub granted: bool,
}

/// Role entity (account-scoped). System roles are immutable through the
/// normal mutation paths.
#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_system: bool,
    pub permissions: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(account_id: Uuid, name: String, permissions: Vec<Permission>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            name,
            description: None,
            is_system: false,
            permissions: serde_json::to_value(permissions).unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Decode the stored permissions array. Corrupt JSON surfaces here so
    /// the evaluator can skip the role instead of failing the whole check.
    pub fn parsed_permissions(&self) -> Result<Vec<Permission>, serde_json::Error> {
        serde_json::from_value(self.permissions.clone())
    }
}

/// Role assignment entity, optionally time-bounded.
#[derive(Debug, Clone, FromRow)]
pub struct UserRoleAssignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub account_id: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl UserRoleAssignment {
    pub fn new(user_id: Uuid, role_id: Uuid, account_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            role_id,
            account_id,
            assigned_at: Utc::now(),
            expires_at: None,
            is_active: true,
        }
    }

    /// Check if the assignment is currently in force.
    pub fn is_currently_active(&self) -> bool {
        let now = Utc::now();
        self.is_active && self.expires_at.is_none_or(|exp| exp > now)
    }
}
