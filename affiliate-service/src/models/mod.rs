pub mod access_control;
pub mod affiliate;
pub mod audit;
pub mod click;
pub mod condition;
pub mod conversion;
pub mod coupon;
pub mod link;
pub mod masking_rule;
pub mod role;
pub mod two_factor;
pub mod visibility_rule;

pub use access_control::AccessControl;
pub use affiliate::{AffiliateProfile, ReferralCode};
pub use audit::{
    AuditLog, AuditLogQuery, AuditLogResponse, DataAccessLog, DataAccessLogResponse,
};
pub use click::{Click, ClickResponse, RecordClickRequest, RedirectResponse};
pub use condition::{Condition, ConditionLogic, ConditionOperator};
pub use conversion::{Conversion, ConversionResponse, RecordConversionRequest};
pub use coupon::{Coupon, CouponResponse, CouponStatus, CreateCouponRequest, DiscountType};
pub use link::{
    AffiliateLink, CreateLinkRequest, LinkResponse, PublicLinkResponse, conversion_rate,
};
pub use masking_rule::{DataMaskingRule, MaskingType};
pub use role::{Permission, Role, UserRoleAssignment};
pub use two_factor::TwoFactorSecret;
pub use visibility_rule::{AccessType, DataVisibilityRule, RuleScope, RuleType};
