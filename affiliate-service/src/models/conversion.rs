//! Conversion event model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Conversion event. `referral_code` carries the same raw identifier
/// ambiguity as clicks.
#[derive(Debug, Clone, FromRow)]
pub struct Conversion {
    pub id: Uuid,
    pub affiliate_id: Uuid,
    pub referral_code: String,
    pub commission_amount: Decimal,
    pub order_value: Decimal,
    pub converted_at: DateTime<Utc>,
}

impl Conversion {
    pub fn new(
        affiliate_id: Uuid,
        referral_code: String,
        commission_amount: Decimal,
        order_value: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            affiliate_id,
            referral_code,
            commission_amount,
            order_value,
            converted_at: Utc::now(),
        }
    }
}

/// Request body for conversion postbacks.
#[derive(Debug, Deserialize)]
pub struct RecordConversionRequest {
    pub commission_amount: Decimal,
    #[serde(default)]
    pub order_value: Decimal,
}

/// Conversion response for API.
#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    pub id: Uuid,
    pub referral_code: String,
    pub commission_amount: Decimal,
    pub order_value: Decimal,
    pub converted_at: DateTime<Utc>,
}

impl From<Conversion> for ConversionResponse {
    fn from(c: Conversion) -> Self {
        Self {
            id: c.id,
            referral_code: c.referral_code,
            commission_amount: c.commission_amount,
            order_value: c.order_value,
            converted_at: c.converted_at,
        }
    }
}
