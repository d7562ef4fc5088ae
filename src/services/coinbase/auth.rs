//! Request signing for private endpoints.
//!
//! `CB-ACCESS-SIGN` is the base64 HMAC-SHA256 of
//! `timestamp + METHOD + request_path + body`, keyed with the base64-decoded
//! API secret.

use crate::error::{BotError, BotResult};
use crate::services::credentials::Credentials;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_KEY: &str = "CB-ACCESS-KEY";
pub const HEADER_SIGN: &str = "CB-ACCESS-SIGN";
pub const HEADER_TIMESTAMP: &str = "CB-ACCESS-TIMESTAMP";
pub const HEADER_PASSPHRASE: &str = "CB-ACCESS-PASSPHRASE";

pub fn sign(
    secret_b64: &str,
    timestamp: &str,
    method: &str,
    request_path: &str,
    body: &str,
) -> BotResult<String> {
    let key = STANDARD
        .decode(secret_b64)
        .map_err(|e| BotError::Parse(format!("API secret is not valid base64: {}", e)))?;
    let mut mac = HmacSha256::new_from_slice(&key)
        .map_err(|e| BotError::Parse(format!("Invalid HMAC key: {}", e)))?;
    mac.update(timestamp.as_bytes());
    mac.update(method.to_uppercase().as_bytes());
    mac.update(request_path.as_bytes());
    mac.update(body.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// The four auth headers for one request.
pub fn auth_headers(
    credentials: &Credentials,
    timestamp: &str,
    method: &str,
    request_path: &str,
    body: &str,
) -> BotResult<[(&'static str, String); 4]> {
    let signature = sign(&credentials.secret, timestamp, method, request_path, body)?;
    Ok([
        (HEADER_KEY, credentials.public_key.clone()),
        (HEADER_SIGN, signature),
        (HEADER_TIMESTAMP, timestamp.to_string()),
        (HEADER_PASSPHRASE, credentials.passphrase.clone()),
    ])
}
