// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spooler capability.
//
// The gateway never talks to a print queue directly; it goes through this
// trait so the HTTP layer can be exercised against a scripted spooler and so
// a different backend (IPP, LPD) could be dropped in later.

use std::path::Path;

use async_trait::async_trait;
use printhook_core::error::Result;
use printhook_core::types::PrinterInfo;

/// OS print-queue operations the gateway depends on.
#[async_trait]
pub trait Spooler: Send + Sync {
    /// Snapshot every destination the spooler knows about.
    ///
    /// An installation with no destinations yields an empty list, not an
    /// error.
    async fn list_printers(&self) -> Result<Vec<PrinterInfo>>;

    /// Queue one job for `file` and return the spooler-assigned job id.
    ///
    /// `printer` of `None` targets the system default destination.
    async fn submit(&self, file: &Path, printer: Option<&str>, options: &[String])
    -> Result<String>;
}
