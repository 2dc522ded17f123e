//! Bearer verification against a remote identity provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Identity, Role, TokenVerifier, VerifyError};

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    sub: Option<String>,
    role: Option<String>,
}

/// Posts `{"token": ...}` to the provider and expects `200 {"sub", "role"}`.
///
/// Failures are reported once and never retried.
#[derive(Debug, Clone)]
pub struct RemoteVerifier {
    client: reqwest::Client,
    url: String,
}

impl RemoteVerifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VerifyError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl TokenVerifier for RemoteVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&VerifyRequest { token })
            .send()
            .await
            .map_err(|e| VerifyError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!("Identity provider rejected bearer token with {}", status);
            return Err(VerifyError::Rejected(status.as_u16()));
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|_| VerifyError::Malformed("invalid identity provider response"))?;

        Ok(Identity {
            subject: body.sub,
            role: body.role.as_deref().and_then(Role::from_claim),
        })
    }
}
