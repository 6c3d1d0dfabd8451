//! Permission evaluation.
//!
//! A check walks two layers in order: role-granted permissions first
//! (AND-only conditions, first grant wins), then direct access-control
//! entries (chained AND/OR conditions). Every decision is audit-logged
//! before it is returned, allow and deny alike.

use crate::models::{AccessControl, AuditLog, Role};
use crate::services::conditions::ConditionEvaluator;
use crate::services::database::Database;
use crate::services::metrics;
use platform_core::error::AppError;
use serde_json::Value;
use tracing::{instrument, warn};
use uuid::Uuid;

/// One permission check request.
#[derive(Debug, Clone)]
pub struct PermissionCheck {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub resource: String,
    pub action: String,
    pub resource_id: Option<String>,
    pub context: Value,
}

/// Outcome of a permission check.
#[derive(Debug, Clone)]
pub struct PermissionDecision {
    pub allowed: bool,
    pub reason: String,
}

#[derive(Clone)]
pub struct PermissionService {
    db: Database,
}

impl PermissionService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Evaluate a permission check and audit the decision.
    ///
    /// A user with no active role assignments and no access-control
    /// entries is always denied.
    #[instrument(skip(self, check), fields(user_id = %check.user_id, resource = %check.resource, action = %check.action))]
    pub async fn check_permission(
        &self,
        check: &PermissionCheck,
    ) -> Result<PermissionDecision, AppError> {
        let assignments = self
            .db
            .find_assignments(check.user_id, check.account_id)
            .await?;

        let role_ids: Vec<Uuid> = assignments
            .iter()
            .filter(|a| a.is_currently_active())
            .map(|a| a.role_id)
            .collect();

        let roles = self.db.find_roles_by_ids(&role_ids).await?;

        let mut decision = PermissionDecision {
            allowed: false,
            reason: "no matching role permission or access control entry".to_string(),
        };

        for role in &roles {
            if let Some(reason) =
                evaluate_role(role, &check.resource, &check.action, &check.context)
            {
                decision = PermissionDecision {
                    allowed: true,
                    reason,
                };
                break;
            }
        }

        if !decision.allowed {
            let entries = self
                .db
                .find_access_controls(
                    check.account_id,
                    &check.resource,
                    check.resource_id.as_deref(),
                    check.user_id,
                    &role_ids,
                )
                .await?;

            for entry in entries.iter().filter(|e| e.is_active()) {
                if evaluate_entry(entry, &check.action, &check.context) {
                    decision = PermissionDecision {
                        allowed: true,
                        reason: "granted by access control entry".to_string(),
                    };
                    break;
                }
            }
        }

        self.audit(check, &decision).await;
        metrics::record_permission_check(if decision.allowed { "allow" } else { "deny" });

        Ok(decision)
    }

    /// Append the decision to the audit log. A failed write is reported
    /// but never turns a computed decision into an error.
    async fn audit(&self, check: &PermissionCheck, decision: &PermissionDecision) {
        let log = AuditLog::new(
            check.account_id,
            check.user_id,
            check.action.clone(),
            check.resource.clone(),
            check.resource_id.clone(),
            decision.allowed,
            decision.reason.clone(),
            (!check.context.is_null()).then(|| check.context.clone()),
        );

        if let Err(e) = self.db.insert_audit_log(&log).await {
            tracing::error!(user_id = %check.user_id, "Failed to write audit log: {}", e);
        }
    }
}

/// Whether a role grants (resource, action) under the given context.
/// Returns the grant reason on success. Role permission conditions are
/// AND-only; an entry with `granted = false` never allows. A role whose
/// permissions JSON fails to decode is skipped.
fn evaluate_role(role: &Role, resource: &str, action: &str, context: &Value) -> Option<String> {
    let permissions = match role.parsed_permissions() {
        Ok(p) => p,
        Err(e) => {
            warn!(role_id = %role.id, "Skipping role with undecodable permissions: {}", e);
            return None;
        }
    };

    for permission in &permissions {
        if permission.resource == resource
            && permission.action == action
            && permission.granted
            && ConditionEvaluator::evaluate_all(&permission.conditions, context)
        {
            return Some(format!("granted by role '{}'", role.name));
        }
    }

    None
}

/// Whether a direct access-control entry grants the action under the
/// given context. Entry conditions chain with per-condition AND/OR logic.
fn evaluate_entry(entry: &AccessControl, action: &str, context: &Value) -> bool {
    if !entry.allows_action(action) {
        return false;
    }

    match entry.parsed_conditions() {
        Ok(conditions) => ConditionEvaluator::evaluate_chained(&conditions, context),
        Err(e) => {
            warn!(entry_id = %entry.id, "Skipping access control entry with undecodable conditions: {}", e);
            false
        }
    }
}
