// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for printhook.

use thiserror::Error;

/// Top-level error type for all gateway operations.
///
/// The HTTP layer maps every variant to a status code and JSON body; none of
/// them is allowed to escape a handler as a panic.
#[derive(Debug, Error)]
pub enum GatewayError {
    // -- Caller errors --
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Validation(String),

    #[error("upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    // -- Spooler errors --
    #[error("print spooler error: {0}")]
    Spooler(String),

    #[error("print spooler timed out: {0}")]
    UpstreamTimeout(String),

    #[error("print spooler unavailable: {0}")]
    UpstreamUnavailable(String),

    // -- Process --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Short machine-readable name used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::Validation(_) => "validation_error",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Spooler(_) => "spooler_error",
            Self::UpstreamTimeout(_) => "upstream_timeout",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
        }
    }
}

impl From<figment::Error> for GatewayError {
    fn from(e: figment::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GatewayError>;
