//! Signed identity tokens: HS256 JWTs.
//!
//! Session cookies and mobile bearer credentials share this format and are
//! signed with the shared session secret.

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{Identity, TokenVerifier, VerifyError};

/// Claims carried by a session or bearer token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Expiry in epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

fn require_secret(secret: &str) -> Result<&[u8], VerifyError> {
    if secret.is_empty() {
        return Err(VerifyError::MissingSecret);
    }
    Ok(secret.as_bytes())
}

/// Sign `claims` into a compact token.
pub fn sign_token(claims: &Claims, secret: &str) -> Result<String, VerifyError> {
    let key = EncodingKey::from_secret(require_secret(secret)?);
    encode(&Header::new(Algorithm::HS256), claims, &key).map_err(VerifyError::Encoding)
}

/// Verify a compact token and return its claims.
///
/// `now_secs` is the current epoch time, used to reject expired tokens.
pub fn decode_token(token: &str, secret: &str, now_secs: i64) -> Result<Claims, VerifyError> {
    let key = DecodingKey::from_secret(require_secret(secret)?);

    // `exp` is optional and checked against `now_secs` below
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let claims = decode::<Claims>(token, &key, &validation)
        .map_err(|e| verify_error(token, e))?
        .claims;

    match claims.exp {
        Some(exp) if exp <= now_secs => Err(VerifyError::Expired),
        _ => Ok(claims),
    }
}

fn verify_error(token: &str, err: jsonwebtoken::errors::Error) -> VerifyError {
    match err.kind() {
        ErrorKind::InvalidSignature => VerifyError::BadSignature,
        ErrorKind::ExpiredSignature => VerifyError::Expired,
        ErrorKind::InvalidAlgorithm => VerifyError::UnsupportedAlgorithm(
            decode_header(token)
                .map(|header| format!("{:?}", header.alg))
                .unwrap_or_default(),
        ),
        ErrorKind::InvalidToken => VerifyError::Malformed("expected three segments"),
        ErrorKind::Base64(_) => VerifyError::Malformed("invalid segment encoding"),
        ErrorKind::Json(_) | ErrorKind::Utf8(_) => VerifyError::Malformed("invalid token contents"),
        _ => VerifyError::Malformed("invalid token"),
    }
}

/// Verifies tokens locally with the shared session secret.
///
/// Without a secret every verification fails closed with `MissingSecret`.
#[derive(Debug, Clone)]
pub struct HmacVerifier {
    secret: Option<String>,
}

impl HmacVerifier {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }
}

#[async_trait]
impl TokenVerifier for HmacVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let secret = self.secret.as_deref().ok_or(VerifyError::MissingSecret)?;
        let claims = decode_token(token, secret, chrono::Utc::now().timestamp())?;
        Ok(Identity::from(claims))
    }
}
