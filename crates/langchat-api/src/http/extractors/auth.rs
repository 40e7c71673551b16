//! API key authentication extractor.
//!
//! Extracts and verifies API keys from:
//! - `Authorization: Bearer <key>` header
//! - `X-API-Key: <key>` header
//!
//! Keys are SHA-256 hashed and resolved to a [`Principal`] through the
//! `api_keys` table. Permission grants are checked by the handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use langchat_core::repository::principal::PrincipalRepository;
use langchat_types::principal::Principal;

use crate::http::error::AppError;
use crate::state::AppState;

/// Prefix of every generated key.
pub const API_KEY_PREFIX: &str = "lc_";

/// The authenticated caller. Extracting this validates the API key.
pub struct Authenticated(pub Principal);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = extract_api_key(parts)?;
        let key_hash = hash_api_key(&api_key);

        match state.principals.find_by_key_hash(&key_hash).await? {
            Some(principal) => Ok(Authenticated(principal)),
            None => Err(AppError::Unauthorized(
                "Invalid API key. Provide a valid key via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header.".to_string(),
            )),
        }
    }
}

/// Extract the API key from request headers.
fn extract_api_key(parts: &Parts) -> Result<String, AppError> {
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(key) = auth_str.strip_prefix("Bearer ") {
            return Ok(key.trim().to_string());
        }
    }

    if let Some(key) = parts.headers.get("x-api-key") {
        let key_str = key.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-API-Key header encoding".to_string())
        })?;
        return Ok(key_str.trim().to_string());
    }

    Err(AppError::Unauthorized(
        "Missing API key. Provide via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header.".to_string(),
    ))
}

/// Compute SHA-256 hash of an API key (lowercase hex).
pub fn hash_api_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    format!("{:x}", digest)
}

/// Generate a fresh plaintext API key from 32 OS-random bytes.
pub fn generate_api_key() -> String {
    let mut key_bytes = [0u8; 32];
    OsRng.fill_bytes(&mut key_bytes);
    format!(
        "{API_KEY_PREFIX}{}",
        key_bytes.iter().map(|b| format!("{b:02x}")).collect::<String>()
    )
}

/// Create a key for `principal`, store its hash and return the plaintext.
///
/// The plaintext is shown once and never persisted.
pub async fn create_api_key<P: PrincipalRepository>(
    principals: &P,
    principal: &Principal,
) -> anyhow::Result<String> {
    let key = generate_api_key();
    principals.create_key(&hash_api_key(&key), principal).await?;
    Ok(key)
}
