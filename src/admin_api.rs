//! Role checks for the admin JSON API (`/api/admin/**`).
//!
//! Admin API callers are the admin console (session cookie), the mobile admin
//! app (bearer credential) and internal services (`X-Admin-API-Key`).

use axum::http::HeaderMap;
use tracing::debug;

use crate::i18n::routing::is_under;
use crate::identity::{IdentityResolver, Role};
use crate::security::has_admin_api_key;

pub const ADMIN_API_ROOT: &str = "/api/admin";

pub const ANALYTICS_API_ROOT: &str = "/api/admin/analytics";

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

pub const ANALYTICS_USERS: &[Role] = &[Role::Admin, Role::MediaBuyer];

#[derive(Clone)]
pub struct AdminApiAuthorizer {
    identity: IdentityResolver,
    api_key: Option<String>,
}

impl AdminApiAuthorizer {
    pub fn new(identity: IdentityResolver, api_key: Option<String>) -> Self {
        Self { identity, api_key }
    }

    /// Roles allowed on an API path, or `None` when the path is not admin API.
    pub fn required_roles(path: &str) -> Option<&'static [Role]> {
        if is_under(path, ANALYTICS_API_ROOT) {
            Some(ANALYTICS_USERS)
        } else if is_under(path, ADMIN_API_ROOT) {
            Some(ADMIN_ONLY)
        } else {
            None
        }
    }

    /// Session role, then bearer role, then the service API key.
    pub async fn has_role(&self, headers: &HeaderMap, allowed: &[Role]) -> bool {
        let permitted = |role: Option<Role>| role.is_some_and(|role| allowed.contains(&role));

        if let Some(identity) = self.identity.resolve_session(headers).await {
            if permitted(identity.role) {
                return true;
            }
        }

        if let Some(identity) = self.identity.resolve_bearer(headers).await {
            if permitted(identity.role) {
                return true;
            }
        }

        let by_key = has_admin_api_key(headers, self.api_key.as_deref());
        if !by_key {
            debug!("Admin API request without an accepted credential");
        }
        by_key
    }

    pub async fn is_admin_request(&self, headers: &HeaderMap) -> bool {
        self.has_role(headers, ADMIN_ONLY).await
    }

    pub async fn is_analytics_user_request(&self, headers: &HeaderMap) -> bool {
        self.has_role(headers, ANALYTICS_USERS).await
    }
}
