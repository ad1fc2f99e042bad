// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-request deadline.
//
// Stamped when the request enters the router, just inside the outer
// `TimeoutLayer`.  Handlers that do long work check it so they can report
// what they finished before the outer timeout cuts the request off.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::time::Instant;

use crate::state::AppState;

/// Time reserved between the handler deadline and the outer request timeout
/// for cleanup and writing the response.
pub const RESPONSE_HEADROOM: Duration = Duration::from_millis(500);

/// Instant by which a handler should have its response ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDeadline(pub Instant);

impl RequestDeadline {
    pub fn after(request_timeout: Duration) -> Self {
        Self(Instant::now() + request_timeout.saturating_sub(RESPONSE_HEADROOM))
    }

    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }
}

pub async fn stamp_deadline(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let deadline = RequestDeadline::after(state.config.request_timeout());
    request.extensions_mut().insert(deadline);
    next.run(request).await
}
