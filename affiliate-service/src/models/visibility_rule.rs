//! Data visibility rule model.

use crate::models::condition::Condition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Data categories a visibility rule can target. `Global` rules apply to
/// every category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    Global,
    AffiliateData,
    FinancialData,
    PerformanceData,
    PersonalData,
    SystemData,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Global => "GLOBAL",
            RuleType::AffiliateData => "AFFILIATE_DATA",
            RuleType::FinancialData => "FINANCIAL_DATA",
            RuleType::PerformanceData => "PERFORMANCE_DATA",
            RuleType::PersonalData => "PERSONAL_DATA",
            RuleType::SystemData => "SYSTEM_DATA",
        }
    }

    /// Unknown stored values yield `None`; the caller skips the rule.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GLOBAL" => Some(RuleType::Global),
            "AFFILIATE_DATA" => Some(RuleType::AffiliateData),
            "FINANCIAL_DATA" => Some(RuleType::FinancialData),
            "PERFORMANCE_DATA" => Some(RuleType::PerformanceData),
            "PERSONAL_DATA" => Some(RuleType::PersonalData),
            "SYSTEM_DATA" => Some(RuleType::SystemData),
            _ => None,
        }
    }

    /// Whether a rule of this type applies when `requested` data is read.
    pub fn applies_to(&self, requested: RuleType) -> bool {
        *self == RuleType::Global || *self == requested
    }
}

/// Who a visibility rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleScope {
    Global,
    RoleBased,
    UserBased,
    AffiliateBased,
}

impl RuleScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleScope::Global => "GLOBAL",
            RuleScope::RoleBased => "ROLE_BASED",
            RuleScope::UserBased => "USER_BASED",
            RuleScope::AffiliateBased => "AFFILIATE_BASED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GLOBAL" => Some(RuleScope::Global),
            "ROLE_BASED" => Some(RuleScope::RoleBased),
            "USER_BASED" => Some(RuleScope::UserBased),
            "AFFILIATE_BASED" => Some(RuleScope::AffiliateBased),
            _ => None,
        }
    }
}

/// Actions a visibility rule can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    View,
    Edit,
    Delete,
    Export,
    Share,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::View => "view",
            AccessType::Edit => "edit",
            AccessType::Delete => "delete",
            AccessType::Export => "export",
            AccessType::Share => "share",
        }
    }
}

/// Visibility rule entity (account-scoped).
#[derive(Debug, Clone, FromRow)]
pub struct DataVisibilityRule {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub rule_type: String,
    pub scope: String,
    pub conditions: serde_json::Value,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_export: bool,
    pub can_share: bool,
    pub restricted_fields: Vec<String>,
    pub allowed_roles: Vec<String>,
    pub allowed_users: Vec<Uuid>,
    pub allowed_affiliates: Vec<Uuid>,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DataVisibilityRule {
    pub fn new(account_id: Uuid, name: String, rule_type: RuleType, scope: RuleScope) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            name,
            rule_type: rule_type.as_str().to_string(),
            scope: scope.as_str().to_string(),
            conditions: serde_json::Value::Array(vec![]),
            can_view: false,
            can_edit: false,
            can_delete: false,
            can_export: false,
            can_share: false,
            restricted_fields: vec![],
            allowed_roles: vec![],
            allowed_users: vec![],
            allowed_affiliates: vec![],
            priority: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this rule grants the requested access type.
    pub fn grants(&self, access_type: AccessType) -> bool {
        match access_type {
            AccessType::View => self.can_view,
            AccessType::Edit => self.can_edit,
            AccessType::Delete => self.can_delete,
            AccessType::Export => self.can_export,
            AccessType::Share => self.can_share,
        }
    }

    pub fn parsed_conditions(&self) -> Result<Vec<Condition>, serde_json::Error> {
        serde_json::from_value(self.conditions.clone())
    }
}
