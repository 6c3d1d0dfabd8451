pub mod config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    http::{header, HeaderValue, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post},
    Router,
};
use platform_core::middleware::{
    bot_detection_middleware, ip_rate_limit_middleware, request_id_middleware,
    security_headers_middleware, IpRateLimiter,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AffiliateConfig;
use crate::middleware::metrics_middleware;
use crate::services::{Database, JwtService, PermissionService};
use platform_core::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: AffiliateConfig,
    pub db: Database,
    pub jwt: JwtService,
    pub permissions: PermissionService,
    pub public_rate_limiter: IpRateLimiter,
}

pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    // Click tracking routes: rate-limited per IP and bot-filtered, since
    // they mutate counters and are open to the world.
    let tracking_limiter = state.public_rate_limiter.clone();
    let tracking_routes = Router::new()
        .route(
            "/api/public/links/:code/click",
            post(handlers::links::record_click),
        )
        .route("/r/:code", get(handlers::links::redirect_link))
        .layer(from_fn(bot_detection_middleware))
        .layer(from_fn_with_state(
            tracking_limiter,
            ip_rate_limit_middleware,
        ));

    // Server-to-server postbacks and coupon redemption: rate-limited but
    // not bot-filtered, merchant backends do not send browser user agents.
    let postback_limiter = state.public_rate_limiter.clone();
    let postback_routes = Router::new()
        .route(
            "/api/public/links/:code/conversion",
            post(handlers::links::record_conversion),
        )
        .route(
            "/api/public/coupons/redeem",
            post(handlers::coupons::redeem_coupon),
        )
        .layer(from_fn_with_state(
            postback_limiter,
            ip_rate_limit_middleware,
        ));

    // Authenticated API surface.
    let api_routes = Router::new()
        .route("/api/links", post(handlers::links::create_link))
        .route("/api/links", get(handlers::links::list_links))
        .route("/api/links/:id/stats", get(handlers::links::get_link_stats))
        .route(
            "/api/links/:id/active",
            patch(handlers::links::set_link_active),
        )
        .route("/api/links/:id", delete(handlers::links::delete_link))
        .route("/api/coupons", post(handlers::coupons::generate_coupon))
        .route("/api/coupons", get(handlers::coupons::list_coupons))
        .route(
            "/api/coupons/:id/deactivate",
            patch(handlers::coupons::deactivate_coupon),
        )
        .route(
            "/api/permissions/check",
            post(handlers::permissions::check_permission),
        )
        .route(
            "/api/twofactor/verify",
            post(handlers::two_factor::verify_two_factor),
        )
        .route(
            "/api/visibility/check",
            post(handlers::visibility::check_access),
        )
        .route(
            "/api/visibility/mask",
            post(handlers::visibility::apply_masking),
        )
        .route("/api/audit/logs", get(handlers::audit::list_audit_logs))
        .route("/api/audit/access", get(handlers::audit::list_access_logs))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::metrics))
        .route(
            "/api/public/links/:code",
            get(handlers::links::resolve_public_link),
        )
        .merge(tracking_routes)
        .merge(postback_routes)
        .merge(api_routes)
        .with_state(state.clone())
        // Add metrics middleware
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add security headers middleware
        .layer(from_fn(security_headers_middleware))
        // Add CORS layer
        .layer(
            CorsLayer::new()
                .allow_origin(
                    state
                        .config
                        .security
                        .allowed_origins
                        .iter()
                        .map(|o| {
                            o.parse::<HeaderValue>().unwrap_or_else(|e| {
                                tracing::error!(
                                    "Invalid CORS origin '{}': {}. Using fallback.",
                                    o,
                                    e
                                );
                                HeaderValue::from_static("*")
                            })
                        })
                        .collect::<Vec<HeaderValue>>(),
                )
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        );

    Ok(app)
}
