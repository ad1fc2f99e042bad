// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printhook: core types, error taxonomy, and configuration shared across all
// crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ApiKey, GatewayConfig};
pub use error::{GatewayError, Result};
pub use types::*;
