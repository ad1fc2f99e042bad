// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Handler-boundary error mapping: every `GatewayError` becomes a status code
// and a `{"error", "kind"}` JSON body.

use axum::Json;
use axum::body::HttpBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{debug, error, warn};

use printhook_core::error::GatewayError;

/// Response-side wrapper around [`GatewayError`].
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Spooler(_) | GatewayError::UpstreamUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Config(_) | GatewayError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Local failures can carry file paths; keep those in the log only.
        let message = match &self.0 {
            GatewayError::Io(_) | GatewayError::Config(_) => {
                error!(error = %self.0, "internal error");
                "internal server error".to_string()
            }
            other if status.is_server_error() => {
                warn!(error = %other, %status, "request failed upstream");
                other.to_string()
            }
            other => {
                debug!(error = %other, %status, "request rejected");
                other.to_string()
            }
        };

        let body = json!({
            "error": message,
            "kind": self.0.kind(),
        });
        (status, Json(body)).into_response()
    }
}

/// Give the outer request timeout the same JSON body as every other error.
///
/// `TimeoutLayer` answers with an empty 504; handler-produced 504s always
/// carry a body, so an empty one can only come from the layer.
pub async fn json_timeout_fallback(response: Response) -> Response {
    if response.status() == StatusCode::GATEWAY_TIMEOUT
        && response.body().size_hint().exact() == Some(0)
    {
        return ApiError(GatewayError::UpstreamTimeout(
            "request exceeded the gateway time limit".into(),
        ))
        .into_response();
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_documented_statuses() {
        let cases = [
            (GatewayError::Unauthorized("x".into()), 401),
            (GatewayError::Validation("x".into()), 400),
            (GatewayError::PayloadTooLarge(10), 413),
            (GatewayError::Spooler("x".into()), 502),
            (GatewayError::UpstreamUnavailable("x".into()), 502),
            (GatewayError::UpstreamTimeout("x".into()), 504),
        ];
        for (err, code) in cases {
            assert_eq!(ApiError(err).status().as_u16(), code);
        }
    }

    #[tokio::test]
    async fn bare_gateway_timeout_gets_a_json_body() {
        let bare = (StatusCode::GATEWAY_TIMEOUT, ()).into_response();
        let response = json_timeout_fallback(bare).await;
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_ne!(response.body().size_hint().exact(), Some(0));
    }

    #[tokio::test]
    async fn other_responses_pass_through() {
        let ok = (StatusCode::OK, ()).into_response();
        let response = json_timeout_fallback(ok).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().size_hint().exact(), Some(0));
    }

    #[test]
    fn io_details_are_not_exposed() {
        let err = ApiError(GatewayError::Io(std::io::Error::other("/tmp/secret-path")));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
