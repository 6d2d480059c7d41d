//! Share link identifier generation and validation.

use crate::error::AppError;
use base64::Engine as _;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

/// Random bytes per identifier; 12 bytes encode to 16 URL-safe characters.
const SHARE_ID_BYTES: usize = 12;

/// Accepted identifier format on input.
static SHARE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{8,64}$").expect("valid share id regex"));

/// Generates a cryptographically secure random share identifier.
///
/// Uses `getrandom` for entropy and encodes the result as URL-safe base64
/// without padding.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
pub fn generate_share_id() -> Result<String, AppError> {
    let mut buffer = [0u8; SHARE_ID_BYTES];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate share id",
            json!({ "reason": e.to_string() }),
        )
    })?;

    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}

/// Rejects identifiers that could never have been issued.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for anything outside `[A-Za-z0-9_-]{8,64}`.
pub fn validate_share_id(id: &str) -> Result<(), AppError> {
    if SHARE_ID_REGEX.is_match(id) {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "Malformed share id",
            json!({ "share_id": id }),
        ))
    }
}
