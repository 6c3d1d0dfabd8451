//! Audit log listing handlers.
//!
//! Both listings are account-scoped and gated through the permission
//! evaluator, so reading the logs is itself an audited action.

use axum::extract::{Json, Query, State};
use serde_json::Value;

use crate::middleware::AuthUser;
use crate::models::audit::{AuditLogQuery, AuditLogResponse, DataAccessLogResponse};
use crate::services::PermissionCheck;
use crate::AppState;
use platform_core::error::AppError;

async fn require_permission(
    state: &AppState,
    user: &AuthUser,
    resource: &str,
) -> Result<(), AppError> {
    let check = PermissionCheck {
        user_id: user.user_id,
        account_id: user.account_id,
        resource: resource.to_string(),
        action: "read".to_string(),
        resource_id: None,
        context: Value::Null,
    };
    let decision = state.permissions.check_permission(&check).await?;

    if !decision.allowed {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Not allowed to read {}",
            resource
        )));
    }

    Ok(())
}

/// List permission-check audit logs for the caller's account.
///
/// GET /api/audit/logs
#[tracing::instrument(skip(state, query), fields(user_id = %user.user_id, account_id = %user.account_id))]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditLogResponse>>, AppError> {
    require_permission(&state, &user, "audit_logs").await?;

    let logs = state.db.list_audit_logs(user.account_id, &query).await?;

    Ok(Json(logs.into_iter().map(AuditLogResponse::from).collect()))
}

/// List data-access logs for the caller's account.
///
/// GET /api/audit/access
#[tracing::instrument(skip(state, query), fields(user_id = %user.user_id, account_id = %user.account_id))]
pub async fn list_access_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<DataAccessLogResponse>>, AppError> {
    require_permission(&state, &user, "access_logs").await?;

    let logs = state
        .db
        .list_data_access_logs(user.account_id, &query)
        .await?;

    Ok(Json(
        logs.into_iter().map(DataAccessLogResponse::from).collect(),
    ))
}
