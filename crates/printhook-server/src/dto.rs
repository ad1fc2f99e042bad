// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON response bodies.

use serde::Serialize;

use printhook_core::types::{HealthStatus, PrinterInfo};
use printhook_print::{CopyFailure, SubmissionReport};

/// `GET /health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// The destination jobs would go to, if one could be resolved.
    pub printer: Option<PrinterInfo>,
    pub printer_configured: bool,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /printers`
#[derive(Debug, Serialize)]
pub struct PrintersResponse {
    pub printers: Vec<PrinterInfo>,
    /// System default destination.
    pub default: Option<String>,
    /// Printer named in the gateway configuration.
    pub configured: Option<String>,
}

/// `POST /print`
///
/// `success` is true only when every requested copy was queued.  A partial
/// result keeps HTTP 200 but reports `success: false` with the counts and
/// per-copy errors.
#[derive(Debug, Serialize)]
pub struct PrintResponse {
    pub success: bool,
    pub message: String,
    /// First queued job.
    pub job_id: Option<String>,
    pub job_ids: Vec<String>,
    /// Copies actually queued.
    pub copies: u32,
    pub requested: u32,
    pub failed: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<CopyFailure>,
}

impl From<SubmissionReport> for PrintResponse {
    fn from(report: SubmissionReport) -> Self {
        let success = report.is_complete();
        let message = if success {
            "Print job submitted successfully".to_string()
        } else {
            format!(
                "{} of {} copies queued",
                report.succeeded(),
                report.requested
            )
        };
        let job_ids = report.job_ids();

        Self {
            success,
            message,
            job_id: job_ids.first().cloned(),
            copies: report.succeeded(),
            requested: report.requested,
            failed: report.failed(),
            job_ids,
            errors: report.failures,
        }
    }
}
