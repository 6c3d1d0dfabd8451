//! Condition expression evaluator.
//!
//! Evaluates stored condition lists against a dynamic JSON context. Role
//! permissions use strict AND evaluation; access-control entries use a
//! chained fold where each condition's logic tag governs how the NEXT
//! condition combines with the running result. Stored entries were authored
//! against that fold order; changing it changes their meaning.

use crate::models::condition::{Condition, ConditionLogic, ConditionOperator};
use serde_json::Value;

/// Pure condition evaluation service.
#[derive(Debug, Clone)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Resolve a dot-separated path inside the context object.
    ///
    /// A missing segment yields `None`, the equivalent of an undefined
    /// field: it satisfies no equality or membership test, while negated
    /// operators treat it as "not equal to anything defined".
    pub fn lookup_path<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
        let mut current = context;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Evaluate a single condition against the context.
    pub fn evaluate(condition: &Condition, context: &Value) -> bool {
        match condition.operator {
            ConditionOperator::Owner => {
                let user = Self::lookup_path(context, "userId");
                let owner = Self::lookup_path(context, "ownerId");
                user == owner
            }
            ConditionOperator::SameAccount => {
                let account = Self::lookup_path(context, "accountId");
                let resource_account = Self::lookup_path(context, "resourceAccountId");
                account == resource_account
            }
            ConditionOperator::Equals => {
                Self::actual(condition, context) == condition.value.as_ref()
            }
            ConditionOperator::NotEquals => {
                Self::actual(condition, context) != condition.value.as_ref()
            }
            ConditionOperator::Contains => {
                let Some(actual) = Self::actual(condition, context) else {
                    return false;
                };
                let Some(expected) = condition.value.as_ref() else {
                    return false;
                };
                coerce_string(actual).contains(&coerce_string(expected))
            }
            ConditionOperator::In => Self::is_member(condition, context),
            ConditionOperator::NotIn => !Self::is_member(condition, context),
        }
    }

    /// Evaluate a role-permission condition list: every condition must hold,
    /// and an empty list holds trivially.
    pub fn evaluate_all(conditions: &[Condition], context: &Value) -> bool {
        conditions.iter().all(|c| Self::evaluate(c, context))
    }

    /// Evaluate an access-control condition chain with the historical fold.
    ///
    /// The running result starts true under an implicit AND. Each step
    /// combines the current condition's truth using the logic tag carried by
    /// the PREVIOUS condition, then adopts the current condition's tag for
    /// the following step. A condition's own tag therefore never affects its
    /// own combination, only its successor's.
    pub fn evaluate_chained(conditions: &[Condition], context: &Value) -> bool {
        let mut result = true;
        let mut logic = ConditionLogic::And;

        for condition in conditions {
            let current = Self::evaluate(condition, context);
            result = match logic {
                ConditionLogic::And => result && current,
                ConditionLogic::Or => result || current,
            };
            logic = condition.logic;
        }

        result
    }

    fn actual<'a>(condition: &Condition, context: &'a Value) -> Option<&'a Value> {
        condition
            .field
            .as_deref()
            .and_then(|field| Self::lookup_path(context, field))
    }

    fn is_member(condition: &Condition, context: &Value) -> bool {
        let actual = Self::actual(condition, context);
        match condition.value.as_ref() {
            Some(Value::Array(items)) => match actual {
                Some(actual) => items.iter().any(|item| item == actual),
                None => false,
            },
            // A scalar right-hand side degrades to an equality check.
            other => actual == other,
        }
    }
}

/// String coercion for CONTAINS: strings compare by content, everything
/// else by its JSON rendering.
fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
