//! Auth token accessor.
//!
//! Tokens are JWTs issued by the auth API. The signature is never checked
//! here: the issuing server verifies it on every request. This module only
//! reads the `exp` claim so that expired tokens are not sent at all.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use serde::{Deserialize, Deserializer};

use crate::{
    error::{Result, TokenError},
    storage::{AUTH_TOKEN, Storage},
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claims {
    /// Expiry, seconds since the Unix epoch.
    ///
    /// Outer `None`: the claim is missing and the token never expires.
    /// `Some(None)`: the claim is `null`, which compares as already expired.
    #[serde(default, deserialize_with = "present")]
    pub exp: Option<Option<f64>>,
}

impl Claims {
    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.exp {
            None => false,
            Some(None) => true,
            Some(Some(exp)) => exp <= now as f64,
        }
    }
}

/// Keeps an explicit `null` distinct from a missing field.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}

/// Decodes the payload segment of `token` without verifying it.
pub fn decode_claims(token: &str) -> std::result::Result<Claims, TokenError> {
    let payload = token.split('.').nth(1).ok_or(TokenError::MissingPayload)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Returns `token` unchanged if it has not expired at `now` (seconds).
///
/// A token expires at the instant its `exp` is reached.
pub fn is_valid_token_at(token: &str, now: i64) -> std::result::Result<Option<&str>, TokenError> {
    if token.is_empty() {
        return Ok(None);
    }
    let expired = decode_claims(token)?.is_expired_at(now);
    Ok((!expired).then_some(token))
}

pub fn is_valid_token(token: &str) -> std::result::Result<Option<&str>, TokenError> {
    is_valid_token_at(token, Utc::now().timestamp())
}

/// Reads the stored token and returns it if still valid.
///
/// Absent and expired tokens are `Ok(None)`; expired tokens stay in storage.
/// A stored token that cannot be decoded is a [`TokenError`].
pub fn get_auth_token(storage: &dyn Storage) -> Result<Option<String>> {
    let Some(token) = storage.get_item(AUTH_TOKEN)? else {
        return Ok(None);
    };
    Ok(is_valid_token(&token)?.map(ToOwned::to_owned))
}

pub fn store_auth_token(storage: &dyn Storage, token: &str) -> Result<()> {
    storage.set_item(AUTH_TOKEN, token)?;
    tracing::debug!("auth token stored");
    Ok(())
}

pub fn clear_auth_token(storage: &dyn Storage) -> Result<()> {
    storage.remove_item(AUTH_TOKEN)?;
    tracing::debug!("auth token cleared");
    Ok(())
}
