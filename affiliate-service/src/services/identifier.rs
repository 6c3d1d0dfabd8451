//! Short identifier generation for tracking links and coupons.
//!
//! Generation is best-effort pre-check only: callers retry on collision up
//! to [`MAX_GENERATION_ATTEMPTS`] and the database unique constraints remain
//! the final arbiter, since two writers can both pass an existence probe
//! before either inserts.

use crate::models::coupon::DiscountType;
use rand::Rng;

/// Retry budget for slug and coupon code generation before the operation
/// fails as exhausted.
pub const MAX_GENERATION_ATTEMPTS: u32 = 10;

/// Stateless identifier generator.
#[derive(Debug, Clone)]
pub struct IdentifierGenerator;

impl IdentifierGenerator {
    /// Random 12-character lowercase hex slug.
    pub fn random_slug() -> String {
        let mut rng = rand::thread_rng();
        let bytes: [u8; 6] = rng.gen();
        hex::encode(bytes)
    }

    /// Slug derived from a referral code: `{code}-{4 hex chars}`.
    ///
    /// No retry loop. The random suffix keeps the slug unique in practice,
    /// and the hyphen preserves the referral code as the slug's prefix so
    /// prefix-variant click attribution keeps working.
    pub fn referral_slug(referral_code: &str) -> String {
        let mut rng = rand::thread_rng();
        let bytes: [u8; 2] = rng.gen();
        format!("{}-{}", referral_code, hex::encode(bytes))
    }

    /// Coupon code: discount-type prefix plus 8 uppercase hex characters.
    pub fn coupon_code(discount_type: DiscountType) -> String {
        let mut rng = rand::thread_rng();
        let bytes: [u8; 4] = rng.gen();
        format!("{}{}", discount_type.code_prefix(), hex::encode_upper(bytes))
    }
}
