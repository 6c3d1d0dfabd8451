//! Click event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Click event. `referral_code` stores the raw tracking code the visitor's
/// request carried, never a normalized form.
#[derive(Debug, Clone, FromRow)]
pub struct Click {
    pub id: Uuid,
    pub affiliate_id: Uuid,
    pub referral_code: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

impl Click {
    pub fn new(
        affiliate_id: Uuid,
        referral_code: String,
        referrer: Option<String>,
        user_agent: Option<String>,
        ip_address: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            affiliate_id,
            referral_code,
            referrer,
            user_agent,
            ip_address,
            clicked_at: Utc::now(),
        }
    }
}

/// Request body for click recording.
#[derive(Debug, Default, Deserialize)]
pub struct RecordClickRequest {
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Click response for API.
#[derive(Debug, Serialize)]
pub struct ClickResponse {
    pub id: Uuid,
    pub referral_code: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

impl From<Click> for ClickResponse {
    fn from(c: Click) -> Self {
        Self {
            id: c.id,
            referral_code: c.referral_code,
            referrer: c.referrer,
            user_agent: c.user_agent,
            ip_address: c.ip_address,
            clicked_at: c.clicked_at,
        }
    }
}

/// Destination returned after a click is recorded.
#[derive(Debug, Serialize)]
pub struct RedirectResponse {
    pub redirect_url: String,
}
