//! Two-factor secret model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user TOTP secret with hashed single-use backup codes.
#[derive(Debug, Clone, FromRow)]
pub struct TwoFactorSecret {
    pub user_id: Uuid,
    pub secret: String,
    pub backup_codes: Vec<String>,
    pub enabled: bool,
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TwoFactorSecret {
    pub fn new(user_id: Uuid, secret: String, backup_codes: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            secret,
            backup_codes,
            enabled: true,
            last_used: None,
            created_at: now,
            updated_at: now,
        }
    }
}
