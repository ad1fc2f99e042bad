// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scripted in-memory spooler for tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use printhook_core::error::{GatewayError, Result};
use printhook_core::types::PrinterInfo;

use crate::spooler::Spooler;

/// A spooler whose behaviour is fixed up front and whose calls are counted.
///
/// Job ids are `<printer>-<call number>`, with `default` standing in for the
/// system default destination.
#[derive(Debug, Default)]
pub struct ScriptedSpooler {
    printers: Vec<PrinterInfo>,
    fail_list: bool,
    failing_calls: HashSet<usize>,
    submit_delay: Option<Duration>,
    unreachable: bool,
    submit_calls: AtomicUsize,
    list_calls: AtomicUsize,
    /// Every submitted path and whether it existed when the job was queued.
    seen: Mutex<Vec<(PathBuf, bool)>>,
    options: Mutex<Vec<String>>,
}

impl ScriptedSpooler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_printers(mut self, printers: Vec<PrinterInfo>) -> Self {
        self.printers = printers;
        self
    }

    /// Make `list_printers` fail as if the scheduler were down.
    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Reject the `call`-th submission (1-based).
    pub fn failing_on(mut self, call: usize) -> Self {
        self.failing_calls.insert(call);
        self
    }

    /// Sleep before answering each submission.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    /// Fail every submission as unreachable.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn submissions(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn seen_files(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn last_options(&self) -> Vec<String> {
        self.options.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Spooler for ScriptedSpooler {
    async fn list_printers(&self) -> Result<Vec<PrinterInfo>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(GatewayError::UpstreamUnavailable(
                "scheduler is not running".into(),
            ));
        }
        Ok(self.printers.clone())
    }

    async fn submit(
        &self,
        file: &Path,
        printer: Option<&str>,
        options: &[String],
    ) -> Result<String> {
        let call = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((file.to_path_buf(), file.exists()));
        }
        if let Ok(mut last) = self.options.lock() {
            *last = options.to_vec();
        }

        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable {
            return Err(GatewayError::UpstreamUnavailable("lp not found".into()));
        }
        if self.failing_calls.contains(&call) {
            return Err(GatewayError::Spooler(format!("copy {call} rejected")));
        }
        Ok(format!("{}-{call}", printer.unwrap_or("default")))
    }
}
