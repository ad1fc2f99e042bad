// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Router assembly.
//
// Layers wrap everything registered before them, so the last `.layer` call
// is the outermost.  Request-id is assigned first, then tracing, the JSON
// body for bare timeouts, the request timeout, the handler deadline and
// finally the body limit.
//
// The concurrency bound sits on the protected routes only, inside the auth
// check and inside the timeout: `/health` never queues behind prints, an
// unauthenticated caller never holds a permit, and waiting for one counts
// against the request timeout.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware::{from_fn_with_state, map_response};
use axum::routing::{get, post};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_api_key;
use crate::deadline::stamp_deadline;
use crate::error::json_timeout_fallback;
use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let protected = Router::new()
        .route("/printers", get(handlers::list_printers))
        .route("/print", post(handlers::print))
        .route_layer(GlobalConcurrencyLimitLayer::new(config.workers))
        .route_layer(from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(from_fn_with_state(state.clone(), stamp_deadline))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            config.request_timeout(),
        ))
        .layer(map_response(json_timeout_fallback))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
