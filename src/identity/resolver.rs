use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::{debug, warn};

use super::{Identity, TokenVerifier, VerifyError};
use crate::security::{bearer_token, cookie_value};

/// Session cookie names, plain and `__Secure-` prefixed (HTTPS deployments)
pub const SESSION_COOKIE_NAMES: [&str; 2] = ["next-auth.session-token", "__Secure-next-auth.session-token"];

/// Resolves the caller of a request from its session cookie or bearer credential.
///
/// Every failure resolves to `None`: an invalid, expired or unverifiable
/// credential is treated exactly like a missing one.
#[derive(Clone)]
pub struct IdentityResolver {
    session: Arc<dyn TokenVerifier>,
    bearer: Arc<dyn TokenVerifier>,
}

impl IdentityResolver {
    pub fn new(session: Arc<dyn TokenVerifier>, bearer: Arc<dyn TokenVerifier>) -> Self {
        Self { session, bearer }
    }

    /// Session cookie first, then `Authorization: Bearer`.
    pub async fn resolve(&self, headers: &HeaderMap) -> Option<Identity> {
        match self.resolve_session(headers).await {
            Some(identity) => Some(identity),
            None => self.resolve_bearer(headers).await,
        }
    }

    pub async fn resolve_session(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = SESSION_COOKIE_NAMES
            .iter()
            .find_map(|name| cookie_value(headers, name))?;
        verified("session", self.session.verify(token).await)
    }

    pub async fn resolve_bearer(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = bearer_token(headers)?;
        verified("bearer", self.bearer.verify(token).await)
    }
}

fn verified(source: &str, result: Result<Identity, VerifyError>) -> Option<Identity> {
    match result {
        Ok(identity) => Some(identity),
        Err(e @ (VerifyError::MissingSecret | VerifyError::Unavailable(_))) => {
            warn!("Treating {} credential as unauthenticated: {}", source, e);
            None
        }
        Err(e) => {
            debug!("Invalid {} credential: {}", source, e);
            None
        }
    }
}
