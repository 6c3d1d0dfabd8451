//! Data visibility and masking engine.
//!
//! Runs alongside the permission evaluator but stays independent of it:
//! visibility rules grant view/edit/delete/export/share directly instead of
//! going through resource/action permissions. Scope membership is filtered
//! BEFORE conditions, and the restricted fields of EVERY rule that passes
//! scope and conditions are unioned into the masked-field set, whether or
//! not that particular rule granted the requested access.

use crate::models::masking_rule::{DataMaskingRule, MaskingType};
use crate::models::visibility_rule::{AccessType, DataVisibilityRule, RuleScope, RuleType};
use crate::services::conditions::ConditionEvaluator;
use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use uuid::Uuid;

/// One visibility check request, fully resolved from the caller's identity
/// and the request payload.
#[derive(Debug, Clone)]
pub struct AccessCheck {
    pub user_id: Uuid,
    pub role: String,
    pub rule_type: RuleType,
    pub access_type: AccessType,
    pub context: Value,
}

/// Outcome of a visibility check.
#[derive(Debug, Clone)]
pub struct AccessDecision {
    pub allowed: bool,
    pub masked_fields: Vec<String>,
    pub reason: String,
}

/// Outcome of a masking pass.
#[derive(Debug, Clone)]
pub struct MaskingOutcome {
    pub data: Value,
    pub masked_fields: Vec<String>,
}

/// Pure visibility and masking evaluation over pre-loaded rules.
#[derive(Debug, Clone)]
pub struct VisibilityService;

impl VisibilityService {
    /// Decide whether the caller may perform `access_type` on data of
    /// `rule_type`, and which fields must be masked in what they see.
    pub fn check_access(rules: &[DataVisibilityRule], check: &AccessCheck) -> AccessDecision {
        let mut allowed = false;
        let mut reason = format!(
            "no visibility rule grants {} on {}",
            check.access_type.as_str(),
            check.rule_type.as_str()
        );
        let mut masked = BTreeSet::new();

        for rule in rules.iter().filter(|r| r.is_active) {
            let Some(rule_type) = RuleType::parse(&rule.rule_type) else {
                tracing::warn!(rule_id = %rule.id, rule_type = %rule.rule_type, "Skipping visibility rule with unknown type");
                continue;
            };
            if !rule_type.applies_to(check.rule_type) {
                continue;
            }

            let Some(scope) = RuleScope::parse(&rule.scope) else {
                tracing::warn!(rule_id = %rule.id, scope = %rule.scope, "Skipping visibility rule with unknown scope");
                continue;
            };
            if !Self::scope_satisfied(scope, rule, check) {
                continue;
            }

            let conditions = match rule.parsed_conditions() {
                Ok(conditions) => conditions,
                Err(e) => {
                    tracing::warn!(rule_id = %rule.id, error = %e, "Skipping visibility rule with malformed conditions");
                    continue;
                }
            };
            if !ConditionEvaluator::evaluate_all(&conditions, &check.context) {
                continue;
            }

            // The rule applies to this caller. Its restricted fields join
            // the masked set even when a different rule carries the grant.
            masked.extend(rule.restricted_fields.iter().cloned());

            if !allowed && rule.grants(check.access_type) {
                allowed = true;
                reason = format!("granted by visibility rule '{}'", rule.name);
            }
        }

        AccessDecision {
            allowed,
            masked_fields: masked.into_iter().collect(),
            reason,
        }
    }

    /// Apply every active masking rule whose target field is present and
    /// truthy in `data`. Rule conditions are checked against `context`; a
    /// malformed rule is skipped, never aborting the rest of the batch.
    pub fn apply_masking(
        rules: &[DataMaskingRule],
        mut data: Value,
        context: &Value,
    ) -> MaskingOutcome {
        let mut masked_fields = Vec::new();

        if let Some(object) = data.as_object_mut() {
            for rule in rules.iter().filter(|r| r.is_active) {
                let Some(value) = object.get(&rule.field_name) else {
                    continue;
                };
                if !is_truthy(value) {
                    continue;
                }

                let conditions = match rule.parsed_conditions() {
                    Ok(conditions) => conditions,
                    Err(e) => {
                        tracing::warn!(rule_id = %rule.id, error = %e, "Skipping masking rule with malformed conditions");
                        continue;
                    }
                };
                if !ConditionEvaluator::evaluate_all(&conditions, context) {
                    continue;
                }

                let source = coerce_string(value);
                let Some(masked) = Self::mask_value(rule, &source) else {
                    continue;
                };

                object.insert(rule.field_name.clone(), Value::String(masked));
                masked_fields.push(rule.field_name.clone());
            }
        }

        MaskingOutcome {
            data,
            masked_fields,
        }
    }

    /// Transform one value per the rule's masking type. `None` means the
    /// rule could not be applied (currently only a malformed REDACT regex).
    fn mask_value(rule: &DataMaskingRule, value: &str) -> Option<String> {
        let masked = match rule.masking_type() {
            MaskingType::Partial => mask_partial(value, &rule.replacement),
            MaskingType::Full => rule.replacement.clone(),
            MaskingType::Hash => {
                let digest = hex::encode(Sha256::digest(value.as_bytes()));
                digest[..8].to_string()
            }
            MaskingType::Encrypt => {
                // Placeholder scheme, not real encryption. Kept verbatim
                // until a reversible-encryption decision lands.
                let head: String = value.chars().take(4).collect();
                format!("ENCRYPTED_{}", head)
            }
            MaskingType::Redact => {
                let pattern = rule.pattern.as_deref().unwrap_or_default();
                match Regex::new(pattern) {
                    Ok(re) => re.replace_all(value, rule.replacement.as_str()).into_owned(),
                    Err(e) => {
                        tracing::warn!(rule_id = %rule.id, error = %e, "Skipping REDACT rule with invalid pattern");
                        return None;
                    }
                }
            }
        };
        Some(masked)
    }

    fn scope_satisfied(scope: RuleScope, rule: &DataVisibilityRule, check: &AccessCheck) -> bool {
        match scope {
            RuleScope::Global => true,
            RuleScope::RoleBased => rule.allowed_roles.iter().any(|r| r == &check.role),
            RuleScope::UserBased => rule.allowed_users.contains(&check.user_id),
            RuleScope::AffiliateBased => context_affiliate_id(&check.context)
                .map(|id| rule.allowed_affiliates.contains(&id))
                .unwrap_or(false),
        }
    }
}

fn context_affiliate_id(context: &Value) -> Option<Uuid> {
    ConditionEvaluator::lookup_path(context, "affiliateId")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// Present-and-truthy test for a field value: null, false, zero, and the
/// empty string do not get masked.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Short values are replaced outright; longer values keep their first and
/// last two characters around the replacement.
fn mask_partial(value: &str, replacement: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return replacement.to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}{}{}", head, replacement, tail)
}
