use anyhow::Context;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

// Error type for bearer token failures.
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Invalid token.")]
    InvalidToken(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

// Newtype for the HS256 secret shared with the identity provider.
#[derive(Clone)]
pub struct JwtSecret(pub SecretString);

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Claims {
    sub: Uuid,
    iat: i64,
    exp: i64,
}

/// Issue a bearer token for `user_id`, valid for `expires_in`.
/// Tokens are normally minted by the identity provider; this mirrors its format.
pub fn encode_token(
    user_id: Uuid,
    secret: &JwtSecret,
    expires_in: Duration,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + expires_in).timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.0.expose_secret().as_bytes()),
    )
    .context("Failed to encode bearer token.")?;
    Ok(token)
}

/// Verify signature and expiry of a bearer token and return its subject.
pub fn decode_token(token: &str, secret: &JwtSecret) -> Result<Uuid, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.0.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.sub)
    .context("Bearer token failed verification.")
    .map_err(AuthError::InvalidToken)
}
