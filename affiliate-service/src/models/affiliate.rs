//! Affiliate profile and referral code models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Affiliate profile entity. Owns the affiliate-level running totals that
/// click and conversion recording increment.
#[derive(Debug, Clone, FromRow)]
pub struct AffiliateProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub total_clicks: i64,
    pub total_earnings: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AffiliateProfile {
    pub fn new(user_id: Uuid, account_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            account_id,
            total_clicks: 0,
            total_earnings: Decimal::ZERO,
            status: "ACTIVE".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Referral code entity. Referral-derived link slugs take this code as
/// their prefix.
#[derive(Debug, Clone, FromRow)]
pub struct ReferralCode {
    pub id: Uuid,
    pub affiliate_id: Uuid,
    pub code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ReferralCode {
    pub fn new(affiliate_id: Uuid, code: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            affiliate_id,
            code,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
