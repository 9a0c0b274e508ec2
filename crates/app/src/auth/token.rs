//! Session token inspection.
//!
//! Tokens are treated as opaque except for the `exp` claim of a JWT, which lets a stale
//! session be discarded at startup without a round trip.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jiff::Timestamp;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token payload is not valid base64")]
    Encoding(#[from] base64::DecodeError),

    #[error("token claims are not valid JSON")]
    Claims(#[from] serde_json::Error),

    #[error("token expiry is out of range")]
    Expiry(#[from] jiff::Error),
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Expiry encoded in a JWT, or `None` for opaque tokens and JWTs without `exp`.
///
/// # Errors
///
/// Returns an error if the token looks like a JWT but its payload cannot be decoded.
pub fn token_expiry(token: &str) -> Result<Option<Timestamp>, TokenError> {
    let mut segments = token.split('.');

    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Ok(None);
    };

    let decoded = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: Claims = serde_json::from_slice(&decoded)?;

    claims
        .exp
        .map(Timestamp::from_second)
        .transpose()
        .map_err(TokenError::from)
}

/// Whether `token` has expired as of `now`.
///
/// # Errors
///
/// Returns an error if the token's claims cannot be read.
pub fn is_expired(token: &str, now: Timestamp) -> Result<bool, TokenError> {
    Ok(token_expiry(token)?.is_some_and(|expiry| expiry <= now))
}

#[cfg(test)]
pub(crate) fn jwt_expiring_at(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"id":"u1","exp":{exp}}}"#));

    format!("{header}.{payload}.signature")
}
