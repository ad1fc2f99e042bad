// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// State shared by every handler.  Read-only after construction, so cloning
// into each request needs no locking.

use std::sync::Arc;

use printhook_core::config::GatewayConfig;
use printhook_print::{PrintService, Spooler};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub printing: PrintService,
}

impl AppState {
    pub fn new(config: GatewayConfig, spooler: Arc<dyn Spooler>) -> Self {
        let printing = PrintService::from_config(spooler, &config);
        Self {
            config: Arc::new(config),
            printing,
        }
    }
}
