//! Audit log and data access log models - append-only decision records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Permission-check audit entry.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub resource: String,
    pub resource_id: Option<String>,
    pub allowed: bool,
    pub reason: String,
    pub context: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditLog {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account_id: Uuid,
        user_id: Uuid,
        action: String,
        resource: String,
        resource_id: Option<String>,
        allowed: bool,
        reason: String,
        context: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            user_id,
            action,
            resource,
            resource_id,
            allowed,
            reason,
            context,
            created_at: Utc::now(),
        }
    }
}

/// Data-access decision entry, including the masked-field list handed back
/// to the caller.
#[derive(Debug, Clone, FromRow)]
pub struct DataAccessLog {
    pub id: Uuid,
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub access_type: String,
    pub allowed: bool,
    pub reason: String,
    pub masked_fields: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl DataAccessLog {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account_id: Uuid,
        user_id: Uuid,
        resource_type: String,
        resource_id: Option<String>,
        access_type: String,
        allowed: bool,
        reason: String,
        masked_fields: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            user_id,
            resource_type,
            resource_id,
            access_type,
            allowed,
            reason,
            masked_fields,
            created_at: Utc::now(),
        }
    }
}

/// Query parameters for audit listings.
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    pub user_id: Option<Uuid>,
    pub action: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Audit log response for API.
#[derive(Debug, Serialize)]
pub struct AuditLogResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub resource: String,
    pub resource_id: Option<String>,
    pub allowed: bool,
    pub reason: String,
    pub context: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLog> for AuditLogResponse {
    fn from(l: AuditLog) -> Self {
        Self {
            id: l.id,
            account_id: l.account_id,
            user_id: l.user_id,
            action: l.action,
            resource: l.resource,
            resource_id: l.resource_id,
            allowed: l.allowed,
            reason: l.reason,
            context: l.context,
            created_at: l.created_at,
        }
    }
}

/// Data access log response for API.
#[derive(Debug, Serialize)]
pub struct DataAccessLogResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub access_type: String,
    pub allowed: bool,
    pub reason: String,
    pub masked_fields: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DataAccessLog> for DataAccessLogResponse {
    fn from(l: DataAccessLog) -> Self {
        Self {
            id: l.id,
            account_id: l.account_id,
            user_id: l.user_id,
            resource_type: l.resource_type,
            resource_id: l.resource_id,
            access_type: l.access_type,
            allowed: l.allowed,
            reason: l.reason,
            masked_fields: l.masked_fields,
            created_at: l.created_at,
        }
    }
}
