//! Variant-matched aggregate statistics for tracking links.
//!
//! Click and conversion rows store whatever identifier the visitor's
//! request carried, so per-link stats are assembled by summing grouped
//! counts over each link's identifier variants. Reads are batched: one
//! grouped click query and one grouped conversion query cover a whole
//! link listing.

use crate::models::link::{conversion_rate, AffiliateLink};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Grouped conversion totals for one referral code.
#[derive(Debug, Clone, Default)]
pub struct ConversionTotals {
    pub conversions: i64,
    pub commission: Decimal,
    pub revenue: Decimal,
}

/// Live aggregate stats for one link.
#[derive(Debug, Clone, Default)]
pub struct LinkStats {
    pub clicks: i64,
    pub conversions: i64,
    pub earnings: Decimal,
    pub revenue: Decimal,
}

impl LinkStats {
    pub fn conversion_rate(&self) -> f64 {
        conversion_rate(self.conversions, self.clicks)
    }
}

/// Pure assembly of link stats from grouped query results.
#[derive(Debug, Clone)]
pub struct TrackingService;

impl TrackingService {
    /// Identifier variants of every link, deduplicated, for one batched
    /// `referral_code = ANY($1)` query.
    pub fn collect_variants(links: &[AffiliateLink]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut variants = Vec::new();
        for link in links {
            for variant in link.identifier_variants() {
                if seen.insert(variant.clone()) {
                    variants.push(variant);
                }
            }
        }
        variants
    }

    /// Sum the grouped click and conversion buckets that belong to this
    /// link's identifier variants.
    pub fn stats_for(
        link: &AffiliateLink,
        clicks_by_code: &HashMap<String, i64>,
        conversions_by_code: &HashMap<String, ConversionTotals>,
    ) -> LinkStats {
        let mut stats = LinkStats::default();
        for variant in link.identifier_variants() {
            if let Some(count) = clicks_by_code.get(&variant) {
                stats.clicks += count;
            }
            if let Some(totals) = conversions_by_code.get(&variant) {
                stats.conversions += totals.conversions;
                stats.earnings += totals.commission;
                stats.revenue += totals.revenue;
            }
        }
        stats
    }
}
