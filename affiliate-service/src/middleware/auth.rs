use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::AppState;
use crate::services::Claims;
use platform_core::error::AppError;

/// Authenticated caller identity, parsed from verified token claims.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub account_id: Uuid,
    pub role: String,
}

impl TryFrom<&Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: &Claims) -> Result<Self, AppError> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|e| AppError::Unauthorized(anyhow::anyhow!("Invalid subject claim: {}", e)))?;
        let account_id = Uuid::parse_str(&claims.account_id)
            .map_err(|e| AppError::Unauthorized(anyhow::anyhow!("Invalid account claim: {}", e)))?;

        Ok(Self {
            user_id,
            account_id,
            role: claims.role.clone(),
        })
    }
}

/// Middleware to require authentication on the API routes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!("Missing or invalid Authorization header"))
        })?;

    let claims = state.jwt.validate_token(token)?;
    let user = AuthUser::try_from(&claims)?;

    // Store identity in request extensions so handlers can extract it
    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthUser>().cloned().ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!("Authentication missing from request"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, account_id: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            account_id: account_id.to_string(),
            role: "affiliate".to_string(),
            exp: 2_000_000_000,
            iat: 1_700_000_000,
            jti: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn test_claims_with_uuid_subjects_parse() {
        let user_id = Uuid::new_v4();
        let account_id = Uuid::new_v4();
        let user =
            AuthUser::try_from(&claims(&user_id.to_string(), &account_id.to_string())).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.account_id, account_id);
        assert_eq!(user.role, "affiliate");
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        let account_id = Uuid::new_v4();
        let result = AuthUser::try_from(&claims("user_123", &account_id.to_string()));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
