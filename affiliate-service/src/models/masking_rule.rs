//! Data masking rule model.

use crate::models::condition::Condition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Masking transforms applied to a matched field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaskingType {
    Partial,
    Full,
    Hash,
    Encrypt,
    Redact,
}

impl MaskingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaskingType::Partial => "PARTIAL",
            MaskingType::Full => "FULL",
            MaskingType::Hash => "HASH",
            MaskingType::Encrypt => "ENCRYPT",
            MaskingType::Redact => "REDACT",
        }
    }

    /// Unknown stored values fall back to FULL, masking the entire value
    /// rather than leaking it.
    pub fn parse(s: &str) -> Self {
        match s {
            "PARTIAL" => MaskingType::Partial,
            "FULL" => MaskingType::Full,
            "HASH" => MaskingType::Hash,
            "ENCRYPT" => MaskingType::Encrypt,
            "REDACT" => MaskingType::Redact,
            _ => MaskingType::Full,
        }
    }
}

/// Masking rule entity (account-scoped), targeting one field name.
#[derive(Debug, Clone, FromRow)]
pub struct DataMaskingRule {
    pub id: Uuid,
    pub account_id: Uuid,
    pub field_name: String,
    pub masking_type: String,
    pub pattern: Option<String>,
    pub replacement: String,
    pub conditions: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DataMaskingRule {
    pub fn new(account_id: Uuid, field_name: String, masking_type: MaskingType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id,
            field_name,
            masking_type: masking_type.as_str().to_string(),
            pattern: None,
            replacement: "***".to_string(),
            conditions: serde_json::Value::Array(vec![]),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn masking_type(&self) -> MaskingType {
        MaskingType::parse(&self.masking_type)
    }

    pub fn parsed_conditions(&self) -> Result<Vec<Condition>, serde_json::Error> {
        serde_json::from_value(self.conditions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_masking_type_falls_back_to_full() {
        assert_eq!(MaskingType::parse("TOKENIZE"), MaskingType::Full);
        assert_eq!(MaskingType::parse("PARTIAL"), MaskingType::Partial);
    }
}
