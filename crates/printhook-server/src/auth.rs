// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// API-key middleware for protected routes.
//
// Installed with `route_layer`, so it runs before any extractor touches the
// request body: an unauthenticated upload is rejected without parsing a
// single multipart byte.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use printhook_security::{API_KEY_HEADER, verify_api_key};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // A present but non-UTF-8 header is a wrong key, not a missing one.
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|value| value.to_str().unwrap_or_default());

    verify_api_key(provided, &state.config.api_key)?;
    Ok(next.run(request).await)
}
