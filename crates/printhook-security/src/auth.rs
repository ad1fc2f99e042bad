// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// API-key authentication.
//
// Both the presented and the configured key are reduced to SHA-256 digests
// before comparison.  The digests always have the same length, so the
// constant-time comparison below also hides the length of the real key.

use printhook_core::config::ApiKey;
use printhook_core::error::{GatewayError, Result};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::debug;

/// Header carrying the caller's key (lowercase, as stored by `http`).
pub const API_KEY_HEADER: &str = "x-api-key";

/// Compare `provided` against the configured key in constant time.
pub fn keys_match(provided: &str, expected: &ApiKey) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.expose().as_bytes());
    provided.as_slice().ct_eq(expected.as_slice()).into()
}

/// Authenticate a request given the raw header value, if any.
///
/// # Errors
///
/// `GatewayError::Unauthorized` when the header is absent or the key is
/// wrong.  The two cases carry different messages but the same status.
pub fn verify_api_key(provided: Option<&str>, expected: &ApiKey) -> Result<()> {
    let Some(provided) = provided else {
        debug!("request without API key");
        return Err(GatewayError::Unauthorized("missing API key".into()));
    };

    if keys_match(provided, expected) {
        Ok(())
    } else {
        debug!("request with invalid API key");
        Err(GatewayError::Unauthorized("invalid API key".into()))
    }
}
