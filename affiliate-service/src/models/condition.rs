//! Condition expressions shared by role permissions, access controls, and
//! visibility rules.

use serde::{Deserialize, Serialize};

/// Comparison operators understood by the condition evaluator.
///
/// `Owner` and `SameAccount` are field-less: they compare well-known context
/// entries against each other instead of a named field against a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    In,
    NotIn,
    Owner,
    SameAccount,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "EQUALS",
            ConditionOperator::NotEquals => "NOT_EQUALS",
            ConditionOperator::Contains => "CONTAINS",
            ConditionOperator::In => "IN",
            ConditionOperator::NotIn => "NOT_IN",
            ConditionOperator::Owner => "OWNER",
            ConditionOperator::SameAccount => "SAME_ACCOUNT",
        }
    }
}

/// How an access-control condition chains into the running result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionLogic {
    #[default]
    And,
    Or,
}

impl ConditionLogic {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionLogic::And => "AND",
            ConditionLogic::Or => "OR",
        }
    }
}

/// One condition as stored in JSONB condition arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub field: Option<String>,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub logic: ConditionLogic,
}

impl Condition {
    pub fn new(field: &str, operator: ConditionOperator, value: serde_json::Value) -> Self {
        Self {
            field: Some(field.to_string()),
            operator,
            value: Some(value),
            logic: ConditionLogic::And,
        }
    }

    pub fn with_logic(mut self, logic: ConditionLogic) -> Self {
        self.logic = logic;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_round_trips_through_serde() {
        let json = serde_json::to_string(&ConditionOperator::SameAccount).unwrap();
        assert_eq!(json, "\"SAME_ACCOUNT\"");
        let parsed: ConditionOperator = serde_json::from_str("\"NOT_IN\"").unwrap();
        assert_eq!(parsed, ConditionOperator::NotIn);
    }

    #[test]
    fn logic_defaults_to_and_when_absent() {
        let condition: Condition = serde_json::from_value(serde_json::json!({
            "field": "status",
            "operator": "EQUALS",
            "value": "ACTIVE"
        }))
        .unwrap();
        assert_eq!(condition.logic, ConditionLogic::And);
    }

    #[test]
    fn unknown_operator_fails_to_parse() {
        let result: Result<Condition, _> = serde_json::from_value(serde_json::json!({
            "field": "status",
            "operator": "GREATER_THAN",
            "value": 5
        }));
        assert!(result.is_err());
    }
}
