// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job dispatch. Bounds every spooler call with a timeout and turns a copy
// count into independent submissions with per-copy accounting.
//
// Copies are submitted one job at a time rather than as a single `lp -n N`
// job.  Each copy succeeds or fails on its own, and the caller learns exactly
// how many made it into the queue.  After a timeout or an unreachable
// spooler the remaining copies are not attempted: a stuck printer must not
// hold a worker for `copies × timeout`.
//
// The whole loop also runs against the caller's deadline.  Each spooler call
// gets whichever is shorter of the per-call timeout and the time left, and
// copies that would start after the deadline are skipped, so queued jobs are
// always reported before the request itself runs out of time.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use printhook_core::config::GatewayConfig;
use printhook_core::error::{GatewayError, Result};
use printhook_core::types::{JobReceipt, PrinterInfo};

use crate::spooler::Spooler;

// ---------------------------------------------------------------------------
// Submission accounting
// ---------------------------------------------------------------------------

/// Why a single copy did not make it into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The spooler answered and refused the job.
    Rejected,
    /// The spooler did not answer within the bound.
    Timeout,
    /// The spooler could not be reached at all.
    Unavailable,
    /// Not attempted because an earlier copy timed out, found the spooler
    /// unreachable, or the request deadline had passed.
    Skipped,
}

/// One failed copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyFailure {
    /// 1-based copy index.
    pub copy: u32,
    pub kind: FailureKind,
    pub reason: String,
}

/// Outcome of submitting every requested copy.
#[derive(Debug, Clone, Default)]
pub struct SubmissionReport {
    pub requested: u32,
    pub receipts: Vec<JobReceipt>,
    pub failures: Vec<CopyFailure>,
}

impl SubmissionReport {
    /// Number of copies actually queued.
    pub fn succeeded(&self) -> u32 {
        u32::try_from(self.receipts.len()).unwrap_or(u32::MAX)
    }

    pub fn failed(&self) -> u32 {
        u32::try_from(self.failures.len()).unwrap_or(u32::MAX)
    }

    /// True only when every requested copy was queued.
    pub fn is_complete(&self) -> bool {
        self.requested > 0 && self.failures.is_empty() && self.succeeded() == self.requested
    }

    /// Record copies `from..=requested` as skipped.
    fn skip_from(&mut self, from: u32, reason: &str) {
        let requested = self.requested;
        self.failures.extend((from..=requested).map(|copy| CopyFailure {
            copy,
            kind: FailureKind::Skipped,
            reason: reason.to_owned(),
        }));
    }

    /// Spooler job ids in copy order.
    pub fn job_ids(&self) -> Vec<String> {
        self.receipts.iter().map(|r| r.job_id.clone()).collect()
    }

    /// Convert a report with zero queued copies into an error.
    ///
    /// Partial success is still `Ok`; the caller reports it explicitly.
    pub fn into_result(self) -> Result<Self> {
        if !self.receipts.is_empty() {
            return Ok(self);
        }

        let first_reason = self
            .failures
            .iter()
            .find(|f| f.kind != FailureKind::Skipped)
            .or_else(|| self.failures.first())
            .map(|f| f.reason.clone())
            .unwrap_or_else(|| "no copies were submitted".into());

        let any = |kind: FailureKind| self.failures.iter().any(|f| f.kind == kind);
        let err = if any(FailureKind::Unavailable) {
            GatewayError::UpstreamUnavailable(first_reason)
        } else if !any(FailureKind::Rejected)
            && (any(FailureKind::Timeout) || any(FailureKind::Skipped))
        {
            GatewayError::UpstreamTimeout(first_reason)
        } else {
            GatewayError::Spooler(first_reason)
        };
        Err(err)
    }
}

// ---------------------------------------------------------------------------
// PrintService
// ---------------------------------------------------------------------------

/// Gateway-side view of the spooler: configured target, options and
/// timeout applied to every call.
#[derive(Clone)]
pub struct PrintService {
    spooler: Arc<dyn Spooler>,
    printer: Option<String>,
    options: Vec<String>,
    timeout: Duration,
}

impl PrintService {
    pub fn new(
        spooler: Arc<dyn Spooler>,
        printer: Option<String>,
        options: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            spooler,
            printer,
            options,
            timeout,
        }
    }

    /// Build from the process configuration.
    pub fn from_config(spooler: Arc<dyn Spooler>, config: &GatewayConfig) -> Self {
        Self::new(
            spooler,
            config.printer().map(str::to_owned),
            config.print_options.clone(),
            config.spooler_timeout(),
        )
    }

    /// Explicitly configured printer, if any.
    pub fn configured_printer(&self) -> Option<&str> {
        self.printer.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// All spooler destinations.
    pub async fn printers(&self) -> Result<Vec<PrinterInfo>> {
        bounded(self.timeout, "listing printers", self.spooler.list_printers()).await
    }

    /// The destination jobs will go to: the configured printer if set,
    /// otherwise the system default.  `Ok(None)` when neither exists.
    pub async fn target_printer(&self) -> Result<Option<PrinterInfo>> {
        let printers = self.printers().await?;
        let target = match self.configured_printer() {
            Some(name) => printers.into_iter().find(|p| p.name == name),
            None => printers.into_iter().find(|p| p.is_default),
        };
        Ok(target)
    }

    /// Submit `copies` independent jobs for `file`, finishing by `deadline`.
    ///
    /// Never fails as a whole; see [`SubmissionReport::into_result`].
    pub async fn submit_copies(
        &self,
        file: &Path,
        copies: u32,
        deadline: Instant,
    ) -> SubmissionReport {
        let mut report = SubmissionReport {
            requested: copies,
            ..SubmissionReport::default()
        };
        let printer = self.configured_printer();

        for copy in 1..=copies {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(copy, copies, "request deadline reached; skipping remaining copies");
                report.skip_from(copy, "request deadline reached");
                break;
            }

            let submission = self.spooler.submit(file, printer, &self.options);
            match bounded(self.timeout.min(remaining), "submitting job", submission).await {
                Ok(job_id) => {
                    debug!(copy, job_id = %job_id, "copy queued");
                    report.receipts.push(JobReceipt {
                        job_id,
                        copy,
                        submitted_at: Utc::now(),
                    });
                }
                Err(err) => {
                    let kind = match err {
                        GatewayError::UpstreamTimeout(_) => FailureKind::Timeout,
                        GatewayError::UpstreamUnavailable(_) => FailureKind::Unavailable,
                        _ => FailureKind::Rejected,
                    };
                    warn!(copy, copies, error = %err, "copy not queued");
                    report.failures.push(CopyFailure {
                        copy,
                        kind,
                        reason: err.to_string(),
                    });

                    if kind != FailureKind::Rejected {
                        report.skip_from(copy + 1, "not attempted");
                        break;
                    }
                }
            }
        }

        info!(
            requested = report.requested,
            succeeded = report.succeeded(),
            failed = report.failed(),
            printer = printer.unwrap_or("<default>"),
            "submission finished"
        );
        report
    }
}

/// Run a spooler call under `limit`.
async fn bounded<T>(
    limit: Duration,
    what: &str,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, call).await.map_err(|_| {
        GatewayError::UpstreamTimeout(format!("{what} took longer than {}ms", limit.as_millis()))
    })?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedSpooler;
    use printhook_core::types::PrinterState;

    fn service(spooler: Arc<ScriptedSpooler>, printer: Option<&str>) -> PrintService {
        PrintService::new(
            spooler,
            printer.map(str::to_owned),
            vec!["fit-to-page".into()],
            Duration::from_millis(200),
        )
    }

    fn far() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    fn printer(name: &str, is_default: bool) -> PrinterInfo {
        PrinterInfo {
            name: name.into(),
            state: PrinterState::Idle,
            accepting_jobs: true,
            is_default,
        }
    }

    #[tokio::test]
    async fn every_copy_is_an_independent_submission() {
        let spooler = Arc::new(ScriptedSpooler::new());
        let report = service(spooler.clone(), Some("Office"))
            .submit_copies(Path::new("/tmp/a.png"), 3, far())
            .await;

        assert!(report.is_complete());
        assert_eq!(report.succeeded(), 3);
        assert_eq!(spooler.submissions(), 3);
        assert_eq!(report.job_ids(), vec!["Office-1", "Office-2", "Office-3"]);
        assert_eq!(spooler.last_options(), vec!["fit-to-page".to_string()]);
    }

    #[tokio::test]
    async fn rejected_copy_does_not_stop_the_rest() {
        let spooler = Arc::new(ScriptedSpooler::new().failing_on(2));
        let report = service(spooler.clone(), None)
            .submit_copies(Path::new("/tmp/a.png"), 3, far())
            .await;

        assert!(!report.is_complete());
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].copy, 2);
        assert_eq!(report.failures[0].kind, FailureKind::Rejected);
        assert_eq!(spooler.submissions(), 3);
        assert!(report.into_result().is_ok());
    }

    #[tokio::test]
    async fn all_rejected_is_a_spooler_error() {
        let spooler = Arc::new(ScriptedSpooler::new().failing_on(1).failing_on(2));
        let report = service(spooler, None)
            .submit_copies(Path::new("/tmp/a.png"), 2, far())
            .await;
        assert!(matches!(report.into_result(), Err(GatewayError::Spooler(_))));
    }

    #[tokio::test]
    async fn timeout_skips_remaining_copies() {
        let spooler = Arc::new(ScriptedSpooler::new().delayed(Duration::from_secs(5)));
        let report = service(spooler.clone(), None)
            .submit_copies(Path::new("/tmp/a.png"), 3, far())
            .await;

        assert_eq!(spooler.submissions(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::Timeout);
        assert_eq!(report.failures[1].kind, FailureKind::Skipped);
        assert_eq!(report.failures[2].kind, FailureKind::Skipped);
        assert!(matches!(
            report.into_result(),
            Err(GatewayError::UpstreamTimeout(_))
        ));
    }

    #[tokio::test]
    async fn deadline_cuts_the_loop_and_keeps_queued_copies() {
        let spooler = Arc::new(ScriptedSpooler::new().delayed(Duration::from_millis(200)));
        let svc = PrintService::new(spooler.clone(), None, Vec::new(), Duration::from_secs(5));
        let deadline = Instant::now() + Duration::from_millis(500);

        let report = svc.submit_copies(Path::new("/tmp/a.png"), 5, deadline).await;

        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 3);
        assert_eq!(report.failures[0].copy, 3);
        assert_eq!(report.failures[0].kind, FailureKind::Timeout);
        assert!(
            report.failures[1..]
                .iter()
                .all(|f| f.kind == FailureKind::Skipped)
        );
        assert_eq!(spooler.submissions(), 3);
        let report = report.into_result().expect("partial success is not an error");
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn expired_deadline_submits_nothing() {
        let spooler = Arc::new(ScriptedSpooler::new());
        let report = service(spooler.clone(), None)
            .submit_copies(Path::new("/tmp/a.png"), 2, Instant::now())
            .await;

        assert_eq!(spooler.submissions(), 0);
        assert_eq!(report.failed(), 2);
        assert!(report.failures.iter().all(|f| f.kind == FailureKind::Skipped));
        assert!(matches!(
            report.into_result(),
            Err(GatewayError::UpstreamTimeout(ref m)) if m == "request deadline reached"
        ));
    }

    #[tokio::test]
    async fn unreachable_spooler_is_unavailable() {
        let spooler = Arc::new(ScriptedSpooler::new().unreachable());
        let report = service(spooler.clone(), None)
            .submit_copies(Path::new("/tmp/a.png"), 2, far())
            .await;
        assert_eq!(spooler.submissions(), 1);
        assert!(matches!(
            report.into_result(),
            Err(GatewayError::UpstreamUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn target_prefers_configured_then_default() {
        let spooler = Arc::new(
            ScriptedSpooler::new().with_printers(vec![printer("A", false), printer("B", true)]),
        );

        let target = service(spooler.clone(), Some("A"))
            .target_printer()
            .await
            .expect("list");
        assert_eq!(target.map(|p| p.name), Some("A".to_string()));

        let target = service(spooler.clone(), None)
            .target_printer()
            .await
            .expect("list");
        assert_eq!(target.map(|p| p.name), Some("B".to_string()));

        let target = service(spooler, Some("Missing"))
            .target_printer()
            .await
            .expect("list");
        assert!(target.is_none());
    }

    #[tokio::test]
    async fn listing_failure_propagates() {
        let spooler = Arc::new(ScriptedSpooler::new().failing_list());
        let err = service(spooler, None).printers().await.expect_err("must fail");
        assert!(matches!(err, GatewayError::UpstreamUnavailable(_)));
    }
}
