//! Two-factor verification integration tests: TOTP codes, single-use
//! backup codes, and configuration edge cases.

mod common;

use affiliate_service::services::TotpService;
use axum::http::StatusCode;
use chrono::Utc;
use common::{response_json, TestApp};
use serde_json::json;
use uuid::Uuid;

// Base32 of the ASCII secret "12345678901234567890".
const TEST_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

async fn seed_secret(app: &TestApp, user_id: Uuid, backup_codes: &[&str], enabled: bool) {
    let hashes: Vec<String> = backup_codes
        .iter()
        .map(|code| TotpService::hash_backup_code(code))
        .collect();
    sqlx::query(
        "INSERT INTO two_factor_secrets (user_id, secret, backup_codes, enabled) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(TEST_SECRET)
    .bind(&hashes)
    .bind(enabled)
    .execute(app.pool())
    .await
    .expect("Failed to seed two-factor secret");
}

async fn last_used(app: &TestApp, user_id: Uuid) -> Option<chrono::DateTime<Utc>> {
    sqlx::query_scalar("SELECT last_used FROM two_factor_secrets WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(app.pool())
        .await
        .expect("Failed to read last_used")
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn current_totp_code_verifies() {
    // Arrange
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    let token = app.token(user_id, account_id, "affiliate");
    seed_secret(&app, user_id, &[], true).await;

    let code = TotpService::code_for_step(TEST_SECRET, Utc::now().timestamp() / 30)
        .expect("Failed to compute TOTP code");

    // Act
    let response = app
        .post_json("/api/twofactor/verify", Some(&token), &json!({ "code": code }))
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["method"], "totp");
    assert!(last_used(&app, user_id).await.is_some());
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn backup_code_is_single_use() {
    // Arrange
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    let token = app.token(user_id, account_id, "affiliate");
    seed_secret(&app, user_id, &["AAAA-1111", "BBBB-2222"], true).await;

    // Act: first use succeeds and reports the remaining pool
    let response = app
        .post_json(
            "/api/twofactor/verify",
            Some(&token),
            &json!({ "code": "AAAA-1111" }),
        )
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["method"], "backup_code");
    assert_eq!(body["backup_codes_remaining"], 1);

    let stored: Vec<String> =
        sqlx::query_scalar("SELECT backup_codes FROM two_factor_secrets WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(app.pool())
            .await
            .expect("Failed to read backup codes");
    assert_eq!(stored.len(), 1);

    // The same code a second time no longer matches
    let response = app
        .post_json(
            "/api/twofactor/verify",
            Some(&token),
            &json!({ "code": "AAAA-1111" }),
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["valid"], false);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn wrong_code_is_invalid_without_side_effects() {
    // Arrange
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    let token = app.token(user_id, account_id, "affiliate");
    seed_secret(&app, user_id, &["AAAA-1111"], true).await;

    // Act: not a TOTP code, not a backup code
    let response = app
        .post_json(
            "/api/twofactor/verify",
            Some(&token),
            &json!({ "code": "ZZZZZZ" }),
        )
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["valid"], false);
    assert!(last_used(&app, user_id).await.is_none());

    let stored: Vec<String> =
        sqlx::query_scalar("SELECT backup_codes FROM two_factor_secrets WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(app.pool())
            .await
            .expect("Failed to read backup codes");
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn unconfigured_user_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.token(Uuid::new_v4(), Uuid::new_v4(), "affiliate");

    let response = app
        .post_json(
            "/api/twofactor/verify",
            Some(&token),
            &json!({ "code": "123456" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn disabled_secret_is_rejected() {
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    let token = app.token(user_id, account_id, "affiliate");
    seed_secret(&app, user_id, &[], false).await;

    let response = app
        .post_json(
            "/api/twofactor/verify",
            Some(&token),
            &json!({ "code": "123456" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn too_short_code_fails_validation() {
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    let token = app.token(user_id, account_id, "affiliate");
    seed_secret(&app, user_id, &[], true).await;

    let response = app
        .post_json("/api/twofactor/verify", Some(&token), &json!({ "code": "12" }))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
