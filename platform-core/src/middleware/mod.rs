pub mod bot_detection;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use bot_detection::bot_detection_middleware;
pub use rate_limit::{
    IpRateLimiter, UnkeyedRateLimiter, create_ip_rate_limiter, create_unkeyed_rate_limiter,
    ip_rate_limit_middleware, rate_limit_middleware,
};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
