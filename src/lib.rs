//! Request gating for the storefront: locale routing, bot filtering and
//! role-gated admin access in front of the storefront application.

pub mod admin_api;
pub mod config;
pub mod gate;
pub mod i18n;
pub mod identity;
pub mod middleware;
pub mod proxy;
pub mod security;
pub mod server;
