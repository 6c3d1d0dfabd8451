//! Services layer for affiliate-service.
//!
//! Pure evaluators (conditions, visibility, TOTP, identifiers) plus the
//! database wrapper and JWT verification.

pub mod conditions;
mod database;
mod identifier;
mod jwt;
pub mod metrics;
mod permissions;
pub mod tracking;
mod two_factor;
mod visibility;

pub use conditions::ConditionEvaluator;
pub use database::Database;
pub use identifier::{IdentifierGenerator, MAX_GENERATION_ATTEMPTS};
pub use jwt::{Claims, JwtService};
pub use permissions::{PermissionCheck, PermissionDecision, PermissionService};
pub use tracking::{ConversionTotals, LinkStats, TrackingService};
pub use two_factor::{TotpService, TwoFactorError};
pub use visibility::{AccessCheck, AccessDecision, MaskingOutcome, VisibilityService};
