//! Data visibility and masking handlers.

use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::middleware::AuthUser;
use crate::models::audit::DataAccessLog;
use crate::models::visibility_rule::{AccessType, RuleType};
use crate::services::metrics::record_visibility_check;
use crate::services::{AccessCheck, VisibilityService};
use crate::AppState;
use platform_core::error::AppError;

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Request to check data visibility for the caller.
#[derive(Debug, Deserialize)]
pub struct CheckAccessRequest {
    pub rule_type: RuleType,
    pub access_type: AccessType,
    pub resource_id: Option<String>,
    #[serde(default)]
    pub context: Value,
}

/// Visibility decision with the unioned masked-field set.
#[derive(Debug, Serialize)]
pub struct CheckAccessResponse {
    pub allowed: bool,
    pub masked_fields: Vec<String>,
    pub reason: String,
}

/// Request to mask a data object for the caller.
#[derive(Debug, Deserialize)]
pub struct ApplyMaskingRequest {
    pub data: Value,
}

/// Masked data plus the fields that were rewritten.
#[derive(Debug, Serialize)]
pub struct ApplyMaskingResponse {
    pub data: Value,
    pub masked_fields: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Evaluate the account's visibility rules for the caller.
///
/// Every call appends a data-access log row, allow or deny, before the
/// decision is returned.
///
/// POST /api/visibility/check
#[tracing::instrument(
    skip(state, payload),
    fields(user_id = %user.user_id, account_id = %user.account_id)
)]
pub async fn check_access(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckAccessRequest>,
) -> Result<Json<CheckAccessResponse>, AppError> {
    let rules = state.db.find_visibility_rules(user.account_id).await?;

    let check = AccessCheck {
        user_id: user.user_id,
        role: user.role.clone(),
        rule_type: payload.rule_type,
        access_type: payload.access_type,
        context: payload.context,
    };
    let decision = VisibilityService::check_access(&rules, &check);

    record_visibility_check(if decision.allowed { "allow" } else { "deny" });

    let log = DataAccessLog::new(
        user.account_id,
        user.user_id,
        payload.rule_type.as_str().to_string(),
        payload.resource_id,
        payload.access_type.as_str().to_string(),
        decision.allowed,
        decision.reason.clone(),
        decision.masked_fields.clone(),
    );
    if let Err(e) = state.db.insert_data_access_log(&log).await {
        // A failed log write never turns a computed decision into an error.
        tracing::error!(error = %e, "Failed to write data access log");
    }

    Ok(Json(CheckAccessResponse {
        allowed: decision.allowed,
        masked_fields: decision.masked_fields,
        reason: decision.reason,
    }))
}

/// Apply the account's masking rules to a data object.
///
/// POST /api/visibility/mask
#[tracing::instrument(
    skip(state, payload),
    fields(user_id = %user.user_id, account_id = %user.account_id)
)]
pub async fn apply_masking(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ApplyMaskingRequest>,
) -> Result<Json<ApplyMaskingResponse>, AppError> {
    let rules = state.db.find_masking_rules(user.account_id).await?;

    let context = json!({
        "userId": user.user_id,
        "userRole": user.role,
    });
    let outcome = VisibilityService::apply_masking(&rules, payload.data, &context);

    Ok(Json(ApplyMaskingResponse {
        data: outcome.data,
        masked_fields: outcome.masked_fields,
    }))
}
