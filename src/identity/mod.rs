//! Identity resolution for the admin gate and the admin API.
//!
//! # Architecture
//!
//! - `role`: Closed set of role claims and the admin access policy
//! - `token`: Local HS256 JWT signing and verification
//! - `remote`: Bearer verification against an external identity provider
//! - `resolver`: Picks the credential off a request and verifies it, failing closed

mod remote;
mod resolver;
mod role;
mod token;

use async_trait::async_trait;
use thiserror::Error;

pub use remote::RemoteVerifier;
pub use resolver::{IdentityResolver, SESSION_COOKIE_NAMES};
pub use role::{AdminAccess, Role, ANALYTICS_PATH};
pub use token::{decode_token, sign_token, Claims, HmacVerifier};

/// A verified caller. Lives for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub subject: Option<String>,
    pub role: Option<Role>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role.as_deref().and_then(Role::from_claim),
        }
    }
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("no signing secret configured")]
    MissingSecret,

    #[error("malformed token: {0}")]
    Malformed(&'static str),

    #[error("unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("identity provider rejected token with status {0}")]
    Rejected(u16),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
}

/// Turns a raw credential into an identity.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError>;
}
