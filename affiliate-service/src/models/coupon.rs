//! Coupon model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Discount kinds, reflected in the generated code prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn code_prefix(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "PCT-",
            DiscountType::Fixed => "FIX-",
        }
    }

    /// Render the stored discount string, `"15%"` or `"$10"`.
    pub fn format_discount(&self, value: Decimal) -> String {
        match self {
            DiscountType::Percentage => format!("{}%", value.normalize()),
            DiscountType::Fixed => format!("${}", value.normalize()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponStatus {
    Active,
    Inactive,
}

impl CouponStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouponStatus::Active => "ACTIVE",
            CouponStatus::Inactive => "INACTIVE",
        }
    }

    /// Unknown stored values read as inactive so they never validate.
    pub fn parse(s: &str) -> Self {
        match s {
            "ACTIVE" => CouponStatus::Active,
            _ => CouponStatus::Inactive,
        }
    }
}

/// Coupon entity, owned by exactly one affiliate.
#[derive(Debug, Clone, FromRow)]
pub struct Coupon {
    pub id: Uuid,
    pub affiliate_id: Uuid,
    pub code: String,
    pub discount: String,
    pub valid_until: DateTime<Utc>,
    pub usage_count: i64,
    pub max_usage: Option<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    pub fn new(
        affiliate_id: Uuid,
        code: String,
        discount: String,
        valid_until: DateTime<Utc>,
        max_usage: Option<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            affiliate_id,
            code,
            discount,
            valid_until,
            usage_count: 0,
            max_usage,
            status: CouponStatus::Active.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> CouponStatus {
        CouponStatus::parse(&self.status)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until < now
    }

    pub fn is_exhausted(&self) -> bool {
        self.max_usage.is_some_and(|max| self.usage_count >= max)
    }
}

/// Request to generate a coupon.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCouponRequest {
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub valid_until: DateTime<Utc>,
    #[validate(range(min = 1))]
    pub max_usage: Option<i64>,
}

/// Coupon response for API.
#[derive(Debug, Serialize)]
pub struct CouponResponse {
    pub id: Uuid,
    pub affiliate_id: Uuid,
    pub code: String,
    pub discount: String,
    pub valid_until: DateTime<Utc>,
    pub usage_count: i64,
    pub max_usage: Option<i64>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Coupon> for CouponResponse {
    fn from(c: Coupon) -> Self {
        Self {
            id: c.id,
            affiliate_id: c.affiliate_id,
            code: c.code,
            discount: c.discount,
            valid_until: c.valid_until,
            usage_count: c.usage_count,
            max_usage: c.max_usage,
            status: c.status,
            created_at: c.created_at,
        }
    }
}
