//! HTTP handlers.

pub mod audit;
pub mod coupons;
pub mod health;
pub mod links;
pub mod permissions;
pub mod two_factor;
pub mod visibility;
