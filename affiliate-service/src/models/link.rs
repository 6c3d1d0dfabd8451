//! Affiliate tracking link model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Tracking link entity, owned by exactly one affiliate.
#[derive(Debug, Clone, FromRow)]
pub struct AffiliateLink {
    pub id: Uuid,
    pub affiliate_id: Uuid,
    pub offer_id: Option<Uuid>,
    pub original_url: String,
    pub short_url: String,
    pub custom_slug: Option<String>,
    pub campaign_name: String,
    pub clicks: i64,
    pub conversions: i64,
    pub earnings: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AffiliateLink {
    pub fn new(
        affiliate_id: Uuid,
        offer_id: Option<Uuid>,
        original_url: String,
        short_url: String,
        custom_slug: Option<String>,
        campaign_name: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            affiliate_id,
            offer_id,
            original_url,
            short_url,
            custom_slug,
            campaign_name,
            clicks: 0,
            conversions: 0,
            earnings: Decimal::ZERO,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// All identifier shapes historical click/conversion rows may carry for
    /// this link: the full slug, the slug prefix before the first hyphen,
    /// and the link id. Aggregate reads must match against every variant or
    /// stats recorded under older slug schemes go missing.
    pub fn identifier_variants(&self) -> Vec<String> {
        let mut variants = Vec::with_capacity(3);
        if let Some(slug) = &self.custom_slug {
            variants.push(slug.clone());
            if let Some(prefix) = slug.split('-').next() {
                if !prefix.is_empty() && prefix != slug {
                    variants.push(prefix.to_string());
                }
            }
        }
        variants.push(self.id.to_string());
        variants
    }
}

/// conversions/clicks as a percentage; zero clicks reports zero instead of
/// dividing by zero.
pub fn conversion_rate(conversions: i64, clicks: i64) -> f64 {
    if clicks == 0 {
        return 0.0;
    }
    conversions as f64 / clicks as f64 * 100.0
}

/// Request to create a tracking link.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    #[validate(url)]
    pub url: String,
    pub offer_id: Option<Uuid>,
    pub referral_code_id: Option<Uuid>,
    pub website_id: Option<Uuid>,
    #[validate(length(min = 1, max = 120))]
    pub campaign_name: Option<String>,
    #[validate(length(min = 3, max = 64))]
    pub custom_alias: Option<String>,
}

/// Link response for API. `clicks`/`conversions`/`earnings` are the stored
/// counters on create and the variant-matched aggregates on list.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub affiliate_id: Uuid,
    pub offer_id: Option<Uuid>,
    pub original_url: String,
    pub short_url: String,
    pub custom_slug: Option<String>,
    pub campaign_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_id: Option<Uuid>,
    pub clicks: i64,
    pub conversions: i64,
    pub earnings: Decimal,
    pub conversion_rate: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn with_aggregates(
        link: AffiliateLink,
        clicks: i64,
        conversions: i64,
        earnings: Decimal,
    ) -> Self {
        Self {
            id: link.id,
            affiliate_id: link.affiliate_id,
            offer_id: link.offer_id,
            original_url: link.original_url,
            short_url: link.short_url,
            custom_slug: link.custom_slug,
            campaign_name: link.campaign_name,
            website_id: None,
            clicks,
            conversions,
            earnings,
            conversion_rate: conversion_rate(conversions, clicks),
            is_active: link.is_active,
            created_at: link.created_at,
        }
    }
}

impl From<AffiliateLink> for LinkResponse {
    fn from(link: AffiliateLink) -> Self {
        let clicks = link.clicks;
        let conversions = link.conversions;
        let earnings = link.earnings;
        Self::with_aggregates(link, clicks, conversions, earnings)
    }
}

/// Public view of a resolved link with live aggregate stats.
#[derive(Debug, Serialize)]
pub struct PublicLinkResponse {
    pub short_url: String,
    pub original_url: String,
    pub campaign_name: String,
    pub clicks: i64,
    pub conversions: i64,
    pub earnings: Decimal,
    pub revenue: Decimal,
    pub conversion_rate: f64,
}
