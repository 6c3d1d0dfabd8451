//! Coupon handlers.
//!
//! Generation with unique-code retry, listing, public redemption with the
//! conditional usage increment, and deactivation.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::models::coupon::{Coupon, CouponResponse, CouponStatus, CreateCouponRequest};
use crate::services::metrics::record_coupon_redemption;
use crate::services::{IdentifierGenerator, MAX_GENERATION_ATTEMPTS};
use crate::AppState;
use platform_core::error::AppError;
use validator::Validate;

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Request to redeem a coupon by code.
#[derive(Debug, Deserialize, Validate)]
pub struct RedeemCouponRequest {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
}

/// Successful redemption, carrying the discount to apply and attribution.
#[derive(Debug, Serialize)]
pub struct RedeemCouponResponse {
    pub code: String,
    pub discount: String,
    pub affiliate_id: Uuid,
}

// ============================================================================
// Handlers
// ============================================================================

/// Generate a coupon with a unique prefixed code.
///
/// POST /api/coupons
#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id))]
pub async fn generate_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCouponRequest>,
) -> Result<(StatusCode, Json<CouponResponse>), AppError> {
    payload.validate()?;

    let profile = state
        .db
        .find_profile_by_user(user.user_id, user.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Affiliate profile not found")))?;

    let mut code = None;
    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let candidate = IdentifierGenerator::coupon_code(payload.discount_type);
        if !state.db.coupon_code_exists(&candidate).await? {
            code = Some(candidate);
            break;
        }
    }
    let code = code.ok_or_else(|| {
        AppError::GenerationExhausted(anyhow::anyhow!(
            "Could not generate a unique coupon code after {} attempts",
            MAX_GENERATION_ATTEMPTS
        ))
    })?;

    let discount = payload.discount_type.format_discount(payload.discount_value);
    let coupon = Coupon::new(
        profile.id,
        code,
        discount,
        payload.valid_until,
        payload.max_usage,
    );
    let created = state.db.insert_coupon(&coupon).await?;

    Ok((StatusCode::CREATED, Json(CouponResponse::from(created))))
}

/// List the caller's coupons.
///
/// GET /api/coupons
#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_coupons(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<CouponResponse>>, AppError> {
    let profile = state
        .db
        .find_profile_by_user(user.user_id, user.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Affiliate profile not found")))?;

    let coupons = state.db.list_coupons_by_affiliate(profile.id).await?;

    Ok(Json(coupons.into_iter().map(CouponResponse::from).collect()))
}

/// Redeem a coupon.
///
/// Rejection reasons are checked in a fixed order: not-found, not-active,
/// expired, usage-exhausted. The usage increment itself is a conditional
/// UPDATE, so a redemption that loses a concurrent race reports
/// usage-exhausted even though the earlier checks passed.
///
/// POST /api/public/coupons/redeem
#[tracing::instrument(skip(state, payload))]
pub async fn redeem_coupon(
    State(state): State<AppState>,
    Json(payload): Json<RedeemCouponRequest>,
) -> Result<Json<RedeemCouponResponse>, AppError> {
    payload.validate()?;

    let coupon = match state.db.find_coupon_by_code(&payload.code).await? {
        Some(coupon) => coupon,
        None => {
            record_coupon_redemption("not_found");
            return Err(AppError::NotFound(anyhow::anyhow!("Coupon not found")));
        }
    };

    if coupon.status() != CouponStatus::Active {
        record_coupon_redemption("not_active");
        return Err(AppError::BadRequest(anyhow::anyhow!("Coupon is not active")));
    }

    if coupon.is_expired(Utc::now()) {
        record_coupon_redemption("expired");
        return Err(AppError::BadRequest(anyhow::anyhow!("Coupon has expired")));
    }

    if coupon.is_exhausted() || !state.db.increment_coupon_usage(coupon.id).await? {
        record_coupon_redemption("usage_exhausted");
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Coupon usage limit reached"
        )));
    }

    record_coupon_redemption("redeemed");
    tracing::info!(coupon_id = %coupon.id, code = %coupon.code, "Coupon redeemed");

    Ok(Json(RedeemCouponResponse {
        code: coupon.code,
        discount: coupon.discount,
        affiliate_id: coupon.affiliate_id,
    }))
}

/// Deactivate a coupon.
///
/// PATCH /api/coupons/:id/deactivate
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, coupon_id = %coupon_id))]
pub async fn deactivate_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Path(coupon_id): Path<Uuid>,
) -> Result<Json<CouponResponse>, AppError> {
    let profile = state
        .db
        .find_profile_by_user(user.user_id, user.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Affiliate profile not found")))?;

    state
        .db
        .find_coupon_by_id(coupon_id)
        .await?
        .filter(|coupon| coupon.affiliate_id == profile.id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Coupon not found")))?;

    let deactivated = state
        .db
        .deactivate_coupon(coupon_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Coupon not found")))?;

    Ok(Json(CouponResponse::from(deactivated)))
}
