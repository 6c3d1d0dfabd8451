//! Tracking link handlers.
//!
//! Link creation, listing with variant-matched aggregates, per-link stats,
//! public resolution, and click/conversion recording.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::models::click::{Click, ClickResponse, RecordClickRequest, RedirectResponse};
use crate::models::conversion::{Conversion, ConversionResponse, RecordConversionRequest};
use crate::models::link::{AffiliateLink, CreateLinkRequest, LinkResponse, PublicLinkResponse};
use crate::services::metrics::record_click_event;
use crate::services::{Database, IdentifierGenerator, TrackingService, MAX_GENERATION_ATTEMPTS};
use crate::AppState;
use platform_core::error::AppError;
use validator::Validate;

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Request to toggle a link's active flag.
#[derive(Debug, Deserialize)]
pub struct SetLinkActiveRequest {
    pub is_active: bool,
}

/// Per-link statistics with the most recent raw clicks.
#[derive(Debug, Serialize)]
pub struct LinkStatsResponse {
    pub link_id: Uuid,
    pub clicks: i64,
    pub conversions: i64,
    pub total_commission: rust_decimal::Decimal,
    pub total_order_value: rust_decimal::Decimal,
    pub conversion_rate: f64,
    pub recent_clicks: Vec<ClickResponse>,
}

// ============================================================================
// Slug resolution
// ============================================================================

/// Pick the slug for a new link.
///
/// A custom alias must be free or the request fails outright. A referral
/// code owned by the caller derives the slug with no uniqueness loop (the
/// random suffix carries collision resistance). Otherwise random slugs are
/// drawn against an existence probe with a bounded retry budget; the unique
/// constraint on insert remains the real guarantee.
async fn resolve_slug(
    db: &Database,
    affiliate_id: Uuid,
    payload: &CreateLinkRequest,
) -> Result<String, AppError> {
    if let Some(alias) = &payload.custom_alias {
        if db.slug_exists(alias).await? {
            return Err(AppError::Duplicate(anyhow::anyhow!(
                "Alias '{}' is already taken",
                alias
            )));
        }
        return Ok(alias.clone());
    }

    if let Some(referral_code_id) = payload.referral_code_id {
        if let Some(referral) = db.find_referral_code(referral_code_id).await? {
            if referral.affiliate_id == affiliate_id && referral.is_active {
                return Ok(IdentifierGenerator::referral_slug(&referral.code));
            }
        }
        // Unknown or foreign referral code falls through to a fresh slug.
    }

    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let candidate = IdentifierGenerator::random_slug();
        if !db.slug_exists(&candidate).await? {
            return Ok(candidate);
        }
    }

    Err(AppError::GenerationExhausted(anyhow::anyhow!(
        "Could not generate a unique slug after {} attempts",
        MAX_GENERATION_ATTEMPTS
    )))
}

// ============================================================================
// Authenticated handlers
// ============================================================================

/// Create a tracking link.
///
/// POST /api/links
#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id))]
pub async fn create_link(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let profile = state
        .db
        .find_profile_by_user(user.user_id, user.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Affiliate profile not found")))?;

    let slug = resolve_slug(&state.db, profile.id, &payload).await?;
    let short_url = format!("{}/link/{}", state.config.tracking.base_url, slug);
    let campaign_name = payload
        .campaign_name
        .clone()
        .unwrap_or_else(|| "Default Campaign".to_string());

    let link = AffiliateLink::new(
        profile.id,
        payload.offer_id,
        payload.url.clone(),
        short_url,
        Some(slug),
        campaign_name,
    );
    let created = state.db.insert_link(&link).await?;

    let mut response = LinkResponse::from(created);
    response.website_id = payload.website_id;

    Ok((StatusCode::CREATED, Json(response)))
}

/// List the caller's links with live aggregate stats.
///
/// Aggregates are batched: one grouped click query and one grouped
/// conversion query cover every link, then each link sums the buckets that
/// belong to its identifier variants.
///
/// GET /api/links
#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_links(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<LinkResponse>>, AppError> {
    let profile = state
        .db
        .find_profile_by_user(user.user_id, user.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Affiliate profile not found")))?;

    let links = state.db.list_links_by_affiliate(profile.id).await?;
    let variants = TrackingService::collect_variants(&links);
    let clicks_by_code = state.db.count_clicks_grouped(profile.id, &variants).await?;
    let conversions_by_code = state
        .db
        .sum_conversions_grouped(profile.id, &variants)
        .await?;

    let responses = links
        .into_iter()
        .map(|link| {
            let stats = TrackingService::stats_for(&link, &clicks_by_code, &conversions_by_code);
            LinkResponse::with_aggregates(link, stats.clicks, stats.conversions, stats.earnings)
        })
        .collect();

    Ok(Json(responses))
}

/// Detailed stats for one link, including the latest 100 raw clicks.
///
/// GET /api/links/:id/stats
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, link_id = %link_id))]
pub async fn get_link_stats(
    State(state): State<AppState>,
    user: AuthUser,
    Path(link_id): Path<Uuid>,
) -> Result<Json<LinkStatsResponse>, AppError> {
    let profile = state
        .db
        .find_profile_by_user(user.user_id, user.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Affiliate profile not found")))?;

    let link = state
        .db
        .find_link_by_id(link_id)
        .await?
        .filter(|link| link.affiliate_id == profile.id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Link not found")))?;

    let variants = link.identifier_variants();
    let clicks_by_code = state.db.count_clicks_grouped(profile.id, &variants).await?;
    let conversions_by_code = state
        .db
        .sum_conversions_grouped(profile.id, &variants)
        .await?;
    let stats = TrackingService::stats_for(&link, &clicks_by_code, &conversions_by_code);

    let recent = state
        .db
        .list_recent_clicks(profile.id, &variants, 100)
        .await?;

    Ok(Json(LinkStatsResponse {
        link_id: link.id,
        clicks: stats.clicks,
        conversions: stats.conversions,
        total_commission: stats.earnings,
        total_order_value: stats.revenue,
        conversion_rate: stats.conversion_rate(),
        recent_clicks: recent.into_iter().map(ClickResponse::from).collect(),
    }))
}

/// Toggle a link's active flag.
///
/// PATCH /api/links/:id/active
#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id, link_id = %link_id))]
pub async fn set_link_active(
    State(state): State<AppState>,
    user: AuthUser,
    Path(link_id): Path<Uuid>,
    Json(payload): Json<SetLinkActiveRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let profile = state
        .db
        .find_profile_by_user(user.user_id, user.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Affiliate profile not found")))?;

    state
        .db
        .find_link_by_id(link_id)
        .await?
        .filter(|link| link.affiliate_id == profile.id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Link not found")))?;

    let updated = state
        .db
        .update_link_active(link_id, payload.is_active)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Link not found")))?;

    Ok(Json(LinkResponse::from(updated)))
}

/// Delete a link.
///
/// DELETE /api/links/:id
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, link_id = %link_id))]
pub async fn delete_link(
    State(state): State<AppState>,
    user: AuthUser,
    Path(link_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let profile = state
        .db
        .find_profile_by_user(user.user_id, user.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Affiliate profile not found")))?;

    state
        .db
        .find_link_by_id(link_id)
        .await?
        .filter(|link| link.affiliate_id == profile.id)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Link not found")))?;

    if !state.db.delete_link(link_id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Link not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Public handlers
// ============================================================================

/// Resolve a tracking code to its public view with live aggregates.
///
/// GET /api/public/links/:code
#[tracing::instrument(skip(state))]
pub async fn resolve_public_link(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PublicLinkResponse>, AppError> {
    let link = state
        .db
        .find_active_link_by_code(&code)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Link not found")))?;

    let variants = link.identifier_variants();
    let clicks_by_code = state
        .db
        .count_clicks_grouped(link.affiliate_id, &variants)
        .await?;
    let conversions_by_code = state
        .db
        .sum_conversions_grouped(link.affiliate_id, &variants)
        .await?;
    let stats = TrackingService::stats_for(&link, &clicks_by_code, &conversions_by_code);

    Ok(Json(PublicLinkResponse {
        short_url: link.short_url,
        original_url: link.original_url,
        campaign_name: link.campaign_name,
        clicks: stats.clicks,
        conversions: stats.conversions,
        earnings: stats.earnings,
        revenue: stats.revenue,
        conversion_rate: stats.conversion_rate(),
    }))
}

/// Shared click recording path for the API endpoint and the redirect.
///
/// The raw tracking code is stored as the click's referral code, never
/// normalized to the link's canonical slug; aggregate reads match on the
/// full variant set instead.
async fn record_click_for_code(
    state: &AppState,
    code: &str,
    payload: RecordClickRequest,
) -> Result<AffiliateLink, AppError> {
    let link = match state.db.find_link_by_code(code).await? {
        Some(link) => link,
        None => {
            record_click_event("not_found");
            return Err(AppError::NotFound(anyhow::anyhow!("Link not found")));
        }
    };

    if !link.is_active {
        record_click_event("inactive_link");
        return Err(AppError::BadRequest(anyhow::anyhow!("Link is not active")));
    }

    let click = Click::new(
        link.affiliate_id,
        code.to_string(),
        payload.referrer,
        payload.user_agent,
        payload.ip_address,
    );
    state.db.record_click(&click, link.id).await?;
    record_click_event("recorded");

    Ok(link)
}

/// Record a click and return the destination URL.
///
/// POST /api/public/links/:code/click
#[tracing::instrument(skip(state, payload))]
pub async fn record_click(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<RecordClickRequest>,
) -> Result<Json<RedirectResponse>, AppError> {
    let link = record_click_for_code(&state, &code, payload).await?;

    Ok(Json(RedirectResponse {
        redirect_url: link.original_url,
    }))
}

/// Record a click and 307-redirect to the destination.
///
/// GET /r/:code
#[tracing::instrument(skip(state, headers))]
pub async fn redirect_link(
    State(state): State<AppState>,
    Path(code): Path<String>,
    headers: HeaderMap,
) -> Result<Redirect, AppError> {
    let payload = RecordClickRequest {
        referrer: header_value(&headers, "referer"),
        user_agent: header_value(&headers, "user-agent"),
        ip_address: headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string()),
    };

    let link = record_click_for_code(&state, &code, payload).await?;

    Ok(Redirect::temporary(&link.original_url))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

/// Record a conversion postback against a tracking code.
///
/// POST /api/public/links/:code/conversion
#[tracing::instrument(skip(state, payload))]
pub async fn record_conversion(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<RecordConversionRequest>,
) -> Result<(StatusCode, Json<ConversionResponse>), AppError> {
    let link = state
        .db
        .find_active_link_by_code(&code)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Link not found")))?;

    let conversion = Conversion::new(
        link.affiliate_id,
        code,
        payload.commission_amount,
        payload.order_value,
    );
    state.db.record_conversion(&conversion, link.id).await?;

    Ok((StatusCode::CREATED, Json(ConversionResponse::from(conversion))))
}
