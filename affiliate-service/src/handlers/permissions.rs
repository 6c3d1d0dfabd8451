//! Permission check handler.

use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::middleware::AuthUser;
use crate::services::{PermissionCheck, PermissionDecision};
use crate::AppState;
use platform_core::error::AppError;
use validator::Validate;

/// Request to evaluate one (resource, action) pair for the caller.
#[derive(Debug, Deserialize, Validate)]
pub struct CheckPermissionRequest {
    #[validate(length(min = 1, max = 120))]
    pub resource: String,
    #[validate(length(min = 1, max = 120))]
    pub action: String,
    pub resource_id: Option<String>,
    #[serde(default)]
    pub context: Value,
}

/// Evaluation outcome.
#[derive(Debug, Serialize)]
pub struct CheckPermissionResponse {
    pub allowed: bool,
    pub reason: String,
}

impl From<PermissionDecision> for CheckPermissionResponse {
    fn from(decision: PermissionDecision) -> Self {
        Self {
            allowed: decision.allowed,
            reason: decision.reason,
        }
    }
}

/// Evaluate role permissions and access control entries for the caller.
///
/// POST /api/permissions/check
#[tracing::instrument(
    skip(state, payload),
    fields(user_id = %user.user_id, account_id = %user.account_id)
)]
pub async fn check_permission(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckPermissionRequest>,
) -> Result<Json<CheckPermissionResponse>, AppError> {
    payload.validate()?;

    let check = PermissionCheck {
        user_id: user.user_id,
        account_id: user.account_id,
        resource: payload.resource,
        action: payload.action,
        resource_id: payload.resource_id,
        context: payload.context,
    };

    let decision = state.permissions.check_permission(&check).await?;

    Ok(Json(CheckPermissionResponse::from(decision)))
}
