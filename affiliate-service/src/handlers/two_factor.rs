//! Two-factor verification handler.

use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};

use crate::middleware::AuthUser;
use crate::services::metrics::record_two_factor_verification;
use crate::services::TotpService;
use crate::AppState;
use chrono::Utc;
use platform_core::error::AppError;
use validator::Validate;

/// Request carrying either a 6-digit TOTP code or a backup code.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyTwoFactorRequest {
    #[validate(length(min = 6, max = 64))]
    pub code: String,
}

/// Verification outcome. `method` names the path that matched.
#[derive(Debug, Serialize)]
pub struct VerifyTwoFactorResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_codes_remaining: Option<usize>,
}

/// Verify a TOTP or backup code for the caller.
///
/// TOTP is tried first; a miss falls through to the backup codes, which are
/// single-use and removed from storage when matched. `last_used` is only
/// touched on success.
///
/// POST /api/twofactor/verify
#[tracing::instrument(skip(state, payload), fields(user_id = %user.user_id))]
pub async fn verify_two_factor(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<VerifyTwoFactorRequest>,
) -> Result<Json<VerifyTwoFactorResponse>, AppError> {
    payload.validate()?;

    let secret = state
        .db
        .find_two_factor_secret(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Two-factor is not configured")))?;

    if !secret.enabled {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Two-factor is not enabled"
        )));
    }

    let now_unix = Utc::now().timestamp();
    let totp_valid = TotpService::verify_totp(&secret.secret, &payload.code, now_unix)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Stored secret unusable: {}", e)))?;

    if totp_valid {
        state.db.touch_two_factor_last_used(user.user_id).await?;
        record_two_factor_verification("totp", "success");

        return Ok(Json(VerifyTwoFactorResponse {
            valid: true,
            method: Some("totp"),
            backup_codes_remaining: None,
        }));
    }

    if let Some(index) = TotpService::match_backup_code(&secret.backup_codes, &payload.code) {
        let mut remaining = secret.backup_codes;
        remaining.remove(index);
        state
            .db
            .replace_backup_codes(user.user_id, &remaining)
            .await?;
        record_two_factor_verification("backup_code", "success");
        tracing::info!(user_id = %user.user_id, remaining = remaining.len(), "Backup code consumed");

        return Ok(Json(VerifyTwoFactorResponse {
            valid: true,
            method: Some("backup_code"),
            backup_codes_remaining: Some(remaining.len()),
        }));
    }

    record_two_factor_verification("none", "failure");

    Ok(Json(VerifyTwoFactorResponse {
        valid: false,
        method: None,
        backup_codes_remaining: None,
    }))
}
