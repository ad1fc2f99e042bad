// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Route handlers.

use axum::{Extension, Json};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use tracing::{info, warn};

use printhook_core::error::GatewayError;
use printhook_core::types::HealthStatus;
use printhook_security::Fingerprint;

use crate::deadline::RequestDeadline;
use crate::dto::{HealthResponse, PrintResponse, PrintersResponse};
use crate::error::ApiError;
use crate::state::AppState;
use crate::upload;

/// `GET /health`. Always 200; spooler trouble shows up as `degraded`.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, printer, error) = match state.printing.target_printer().await {
        Ok(Some(printer)) => {
            let status = if printer.is_available() {
                HealthStatus::Ok
            } else {
                HealthStatus::Degraded
            };
            (status, Some(printer), None)
        }
        Ok(None) => (
            HealthStatus::Degraded,
            None,
            Some("No printer configured or found".to_string()),
        ),
        Err(e) => {
            warn!(error = %e, "health check could not query the spooler");
            (HealthStatus::Degraded, None, Some(e.to_string()))
        }
    };

    Json(HealthResponse {
        status,
        printer_configured: printer.is_some(),
        printer,
        version: env!("CARGO_PKG_VERSION"),
        error,
    })
}

/// `GET /printers`
pub async fn list_printers(
    State(state): State<AppState>,
) -> Result<Json<PrintersResponse>, ApiError> {
    let printers = state.printing.printers().await?;
    let default = printers
        .iter()
        .find(|p| p.is_default)
        .map(|p| p.name.clone());

    Ok(Json(PrintersResponse {
        printers,
        default,
        configured: state.printing.configured_printer().map(str::to_owned),
    }))
}

/// `POST /print`
///
/// Copies still pending when the request deadline passes are skipped, and
/// the jobs already queued are reported as a partial result.
pub async fn print(
    State(state): State<AppState>,
    Extension(deadline): Extension<RequestDeadline>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PrintResponse>, ApiError> {
    let multipart = multipart.map_err(|rejection| {
        GatewayError::Validation(format!(
            "expected a multipart/form-data upload: {}",
            rejection.body_text()
        ))
    })?;

    let form = upload::read_form(multipart, state.config.max_upload_bytes).await?;
    let request = upload::validate(form, state.config.max_copies)?;

    info!(
        kind = ?request.image.kind,
        bytes = request.image.bytes.len(),
        copies = request.copies,
        sha256 = %Fingerprint::of(&request.image.bytes),
        "print request accepted"
    );

    let staged = upload::stage(
        &request.image,
        state.config.upload_dir(),
        state.printing.timeout().min(deadline.remaining()),
    )
    .await?;
    let report = state
        .printing
        .submit_copies(&staged, request.copies, deadline.0)
        .await;
    upload::discard(staged);

    let report = report.into_result()?;
    Ok(Json(PrintResponse::from(report)))
}
