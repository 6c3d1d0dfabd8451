//! Link tracking integration tests: creation, slug rules, click recording,
//! redirects, conversions, and variant-matched aggregates.

mod common;

use axum::http::StatusCode;
use common::{response_json, TestApp};
use serde_json::json;
use uuid::Uuid;

/// Globally unique lowercase code so parallel test files never share a
/// slug or a slug prefix.
fn unique_code(tag: &str) -> String {
    format!("{}{}", tag, &Uuid::new_v4().simple().to_string()[..10])
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn create_link_with_custom_alias_succeeds() {
    // Arrange
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    app.seed_profile(user_id, account_id).await;
    let token = app.token(user_id, account_id, "affiliate");
    let alias = unique_code("lka");

    // Act
    let response = app
        .post_json(
            "/api/links",
            Some(&token),
            &json!({
                "url": "https://example.com/product",
                "custom_alias": alias,
            }),
        )
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["custom_slug"], alias.as_str());
    assert_eq!(
        body["short_url"],
        format!("http://track.test/link/{}", alias)
    );
    assert_eq!(body["campaign_name"], "Default Campaign");
    assert_eq!(body["clicks"], 0);
    assert_eq!(body["is_active"], true);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn create_link_rejects_duplicate_alias() {
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    app.seed_profile(user_id, account_id).await;
    let token = app.token(user_id, account_id, "affiliate");
    let alias = unique_code("lkb");

    let body = json!({ "url": "https://example.com/a", "custom_alias": alias });
    let response = app.post_json("/api/links", Some(&token), &body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.post_json("/api/links", Some(&token), &body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn create_link_rejects_invalid_url() {
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    app.seed_profile(user_id, account_id).await;
    let token = app.token(user_id, account_id, "affiliate");

    let response = app
        .post_json(
            "/api/links",
            Some(&token),
            &json!({ "url": "not-a-url" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn create_link_without_profile_is_not_found() {
    let app = TestApp::spawn().await;
    let token = app.token(Uuid::new_v4(), Uuid::new_v4(), "affiliate");

    let response = app
        .post_json(
            "/api/links",
            Some(&token),
            &json!({ "url": "https://example.com/a" }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn api_routes_require_authentication() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/links", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn clicks_match_full_slug_and_prefix_variants() {
    // Arrange: a link whose slug carries a hyphenated prefix
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    app.seed_profile(user_id, account_id).await;
    let token = app.token(user_id, account_id, "affiliate");
    let prefix = unique_code("lkc");
    let alias = format!("{}-summer", prefix);

    let response = app
        .post_json(
            "/api/links",
            Some(&token),
            &json!({ "url": "https://example.com/sale", "custom_alias": alias }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let link = response_json(response).await;
    let link_id = link["id"].as_str().unwrap().to_string();

    // Act: one click under the full slug, one under the bare prefix
    let response = app
        .post_json(
            &format!("/api/public/links/{}/click", alias),
            None,
            &json!({ "referrer": "https://blog.example.com" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["redirect_url"], "https://example.com/sale");

    let response = app
        .post_json(&format!("/api/public/links/{}/click", prefix), None, &json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Assert: both rows aggregate onto the same link
    let response = app.get("/api/links", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["clicks"], 2);

    let response = app
        .get(&format!("/api/links/{}/stats", link_id), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = response_json(response).await;
    assert_eq!(stats["clicks"], 2);
    let recent = stats["recent_clicks"].as_array().unwrap();
    assert_eq!(recent.len(), 2);
    // Raw captured codes survive: one row holds the full slug, one the prefix.
    let codes: Vec<&str> = recent
        .iter()
        .map(|c| c["referral_code"].as_str().unwrap())
        .collect();
    assert!(codes.contains(&alias.as_str()));
    assert!(codes.contains(&prefix.as_str()));
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn redirect_endpoint_records_click_and_redirects() {
    // Arrange
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    app.seed_profile(user_id, account_id).await;
    let token = app.token(user_id, account_id, "affiliate");
    let alias = unique_code("lkd");

    let response = app
        .post_json(
            "/api/links",
            Some(&token),
            &json!({ "url": "https://example.com/landing", "custom_alias": alias }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let link = response_json(response).await;
    let link_id = link["id"].as_str().unwrap().to_string();

    // Act: follow the short link the way a browser would
    let request = axum::http::Request::builder()
        .method("GET")
        .uri(format!("/r/{}", alias))
        .header("user-agent", "Mozilla/5.0 (X11; Linux x86_64) Firefox/126.0")
        .header("accept", "text/html")
        .header("accept-language", "en-US")
        .header("accept-encoding", "gzip")
        .header("referer", "https://news.example.org/post")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.send(request).await;

    // Assert
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "https://example.com/landing"
    );

    let response = app
        .get(&format!("/api/links/{}/stats", link_id), Some(&token))
        .await;
    let stats = response_json(response).await;
    assert_eq!(stats["clicks"], 1);
    let recent = stats["recent_clicks"].as_array().unwrap();
    assert_eq!(recent[0]["referrer"], "https://news.example.org/post");
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn conversion_postback_updates_aggregates() {
    // Arrange: a link with one click on it
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    app.seed_profile(user_id, account_id).await;
    let token = app.token(user_id, account_id, "affiliate");
    let alias = unique_code("lke");

    let response = app
        .post_json(
            "/api/links",
            Some(&token),
            &json!({ "url": "https://example.com/buy", "custom_alias": alias }),
        )
        .await;
    let link = response_json(response).await;
    let link_id = link["id"].as_str().unwrap().to_string();

    app.post_json(&format!("/api/public/links/{}/click", alias), None, &json!({}))
        .await;

    // Act
    let response = app
        .post_json(
            &format!("/api/public/links/{}/conversion", alias),
            None,
            &json!({ "commission_amount": 10, "order_value": 40 }),
        )
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::CREATED);
    let conversion = response_json(response).await;
    assert_eq!(conversion["referral_code"], alias.as_str());

    let response = app
        .get(&format!("/api/links/{}/stats", link_id), Some(&token))
        .await;
    let stats = response_json(response).await;
    assert_eq!(stats["conversions"], 1);
    assert_eq!(stats["total_commission"], "10.00");
    assert_eq!(stats["total_order_value"], "40.00");
    assert_eq!(stats["conversion_rate"], 100.0);

    let response = app.get("/api/links", Some(&token)).await;
    let body = response_json(response).await;
    assert_eq!(body.as_array().unwrap()[0]["earnings"], "10.00");
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn inactive_link_rejects_clicks_but_stays_visible_to_owner() {
    // Arrange
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    app.seed_profile(user_id, account_id).await;
    let token = app.token(user_id, account_id, "affiliate");
    let alias = unique_code("lkf");

    let response = app
        .post_json(
            "/api/links",
            Some(&token),
            &json!({ "url": "https://example.com/page", "custom_alias": alias }),
        )
        .await;
    let link = response_json(response).await;
    let link_id = link["id"].as_str().unwrap().to_string();

    // Act: deactivate, then try to use it
    let response = app
        .patch_json(
            &format!("/api/links/{}/active", link_id),
            Some(&token),
            &json!({ "is_active": false }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["is_active"], false);

    // Assert: clicks are rejected, public resolution misses, owner reads work
    let response = app
        .post_json(&format!("/api/public/links/{}/click", alias), None, &json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get(&format!("/api/public/links/{}", alias), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .get(&format!("/api/links/{}/stats", link_id), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn public_resolution_returns_live_stats() {
    // Arrange
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    app.seed_profile(user_id, account_id).await;
    let token = app.token(user_id, account_id, "affiliate");
    let alias = unique_code("lkg");

    app.post_json(
        "/api/links",
        Some(&token),
        &json!({ "url": "https://example.com/promo", "custom_alias": alias }),
    )
    .await;
    app.post_json(&format!("/api/public/links/{}/click", alias), None, &json!({}))
        .await;

    // Act
    let response = app.get(&format!("/api/public/links/{}", alias), None).await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["original_url"], "https://example.com/promo");
    assert_eq!(body["clicks"], 1);
    assert_eq!(body["conversions"], 0);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn delete_link_removes_it() {
    // Arrange
    let app = TestApp::spawn().await;
    let user_id = Uuid::new_v4();
    let account_id = Uuid::new_v4();
    app.seed_profile(user_id, account_id).await;
    let token = app.token(user_id, account_id, "affiliate");
    let alias = unique_code("lkh");

    let response = app
        .post_json(
            "/api/links",
            Some(&token),
            &json!({ "url": "https://example.com/gone", "custom_alias": alias }),
        )
        .await;
    let link = response_json(response).await;
    let link_id = link["id"].as_str().unwrap().to_string();

    // Act
    let response = app
        .delete(&format!("/api/links/{}", link_id), Some(&token))
        .await;

    // Assert
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .get(&format!("/api/links/{}/stats", link_id), Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post_json(&format!("/api/public/links/{}/click", alias), None, &json!({}))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn unknown_public_code_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/api/public/links/nosuchcode9/click", None, &json!({}))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn owner_cannot_touch_another_affiliates_link() {
    // Arrange: two affiliates, one link each side
    let app = TestApp::spawn().await;
    let owner_id = Uuid::new_v4();
    let owner_account = Uuid::new_v4();
    app.seed_profile(owner_id, owner_account).await;
    let owner_token = app.token(owner_id, owner_account, "affiliate");

    let intruder_id = Uuid::new_v4();
    let intruder_account = Uuid::new_v4();
    app.seed_profile(intruder_id, intruder_account).await;
    let intruder_token = app.token(intruder_id, intruder_account, "affiliate");

    let response = app
        .post_json(
            "/api/links",
            Some(&owner_token),
            &json!({ "url": "https://example.com/mine", "custom_alias": unique_code("lki") }),
        )
        .await;
    let link = response_json(response).await;
    let link_id = link["id"].as_str().unwrap().to_string();

    // Act + Assert: the other affiliate sees 404 on every owner route
    let response = app
        .get(&format!("/api/links/{}/stats", link_id), Some(&intruder_token))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .patch_json(
            &format!("/api/links/{}/active", link_id),
            Some(&intruder_token),
            &json!({ "is_active": false }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .delete(&format!("/api/links/{}", link_id), Some(&intruder_token))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
