// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS spooler backend.
//
// Talks to the local scheduler through its command-line tools rather than
// the IPP socket, so it works with whatever queue setup `lpadmin` produced:
//
//   lpstat -p -d     destination states + system default
//   lpstat -a        accepting / not accepting flags
//   lp -d P -o O F   submit one job, prints "request id is P-42 (1 file(s))"
//
// Child processes run with LC_ALL=C so the output we parse is not localised,
// and with kill_on_drop so a caller-side timeout also reaps the child.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use printhook_core::error::{GatewayError, Result};
use printhook_core::types::{PrinterInfo, PrinterState};

use crate::spooler::Spooler;

/// Prefix of the `lp` success line that carries the job id.
const REQUEST_ID_MARKER: &str = "request id is";

/// Prefix of the `lpstat -d` line naming the default destination.
const DEFAULT_DEST_MARKER: &str = "system default destination:";

// ---------------------------------------------------------------------------
// CupsSpooler
// ---------------------------------------------------------------------------

/// Spooler backed by the CUPS `lp` / `lpstat` tools.
#[derive(Debug, Clone)]
pub struct CupsSpooler {
    lp: PathBuf,
    lpstat: PathBuf,
}

impl Default for CupsSpooler {
    fn default() -> Self {
        Self {
            lp: PathBuf::from("lp"),
            lpstat: PathBuf::from("lpstat"),
        }
    }
}

impl CupsSpooler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit tool paths instead of `$PATH` lookup.
    pub fn with_commands(lp: impl Into<PathBuf>, lpstat: impl Into<PathBuf>) -> Self {
        Self {
            lp: lp.into(),
            lpstat: lpstat.into(),
        }
    }

    /// Run `lpstat` with `args`.  Returns `None` when CUPS reports that no
    /// destinations exist at all.
    async fn lpstat(&self, args: &[&str]) -> Result<Option<String>> {
        let output = run(&self.lpstat, args.iter().map(OsString::from).collect()).await?;
        if output.status.success() {
            return Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_no_destinations(&stderr) {
            debug!("lpstat: no destinations configured");
            return Ok(None);
        }
        Err(classify_failure("lpstat", &output))
    }
}

#[async_trait]
impl Spooler for CupsSpooler {
    async fn list_printers(&self) -> Result<Vec<PrinterInfo>> {
        let Some(status) = self.lpstat(&["-p", "-d"]).await? else {
            return Ok(Vec::new());
        };
        let accepting = match self.lpstat(&["-a"]).await? {
            Some(out) => parse_accepting(&out),
            None => HashMap::new(),
        };

        let (states, default) = parse_printer_status(&status);
        let printers = states
            .into_iter()
            .map(|(name, state)| PrinterInfo {
                accepting_jobs: accepting.get(&name).copied().unwrap_or(false),
                is_default: default.as_deref() == Some(name.as_str()),
                name,
                state,
            })
            .collect::<Vec<_>>();

        debug!(count = printers.len(), default = ?default, "listed CUPS destinations");
        Ok(printers)
    }

    async fn submit(
        &self,
        file: &Path,
        printer: Option<&str>,
        options: &[String],
    ) -> Result<String> {
        let mut args: Vec<OsString> = Vec::with_capacity(3 + options.len() * 2);
        if let Some(printer) = printer {
            args.push("-d".into());
            args.push(printer.into());
        }
        for option in options {
            args.push("-o".into());
            args.push(option.into());
        }
        args.push(file.as_os_str().to_owned());

        let output = run(&self.lp, args).await?;
        if !output.status.success() {
            return Err(classify_failure("lp", &output));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match parse_request_id(&stdout) {
            Some(job_id) => {
                info!(job_id = %job_id, printer = printer.unwrap_or("<default>"), "job queued");
                Ok(job_id)
            }
            None => {
                warn!(stdout = %stdout.trim(), "lp succeeded without reporting a job id");
                Err(GatewayError::Spooler(format!(
                    "lp did not report a job id: {}",
                    stdout.trim()
                )))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Process helpers
// ---------------------------------------------------------------------------

/// Spawn `program` and collect its output.
async fn run(program: &Path, args: Vec<OsString>) -> Result<Output> {
    debug!(program = %program.display(), ?args, "running CUPS tool");
    Command::new(program)
        .args(&args)
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GatewayError::UpstreamUnavailable(format!(
                "{} not found; is CUPS installed?",
                program.display()
            )),
            _ => GatewayError::UpstreamUnavailable(format!(
                "failed to run {}: {e}",
                program.display()
            )),
        })
}

/// Map a non-zero exit to the error taxonomy.
///
/// A scheduler that cannot be reached is an availability problem; anything
/// else (unknown destination, rejected job, unreadable file) is a spooler
/// error for this job.
fn classify_failure(tool: &str, output: &Output) -> GatewayError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr.trim();
    let message = format!("{tool} exited with {}: {detail}", output.status);

    let lower = detail.to_ascii_lowercase();
    if lower.contains("scheduler is not running")
        || lower.contains("unable to connect")
        || lower.contains("connection refused")
    {
        GatewayError::UpstreamUnavailable(message)
    } else {
        GatewayError::Spooler(message)
    }
}

fn is_no_destinations(stderr: &str) -> bool {
    stderr.to_ascii_lowercase().contains("no destinations added")
}

// ---------------------------------------------------------------------------
// Output parsers
// ---------------------------------------------------------------------------

/// Extract the job id from `lp` output.
///
/// ```text
/// request id is Canon_G3010-42 (1 file(s))
/// ```
pub fn parse_request_id(stdout: &str) -> Option<String> {
    let (_, rest) = stdout.split_once(REQUEST_ID_MARKER)?;
    rest.split_whitespace().next().map(str::to_owned)
}

/// Parse `lpstat -p -d` into `(name, state)` pairs plus the default
/// destination.
///
/// ```text
/// printer Canon_G3010 is idle.  enabled since Sat 01 Jun 2024 10:00:00
/// printer Office now printing Office-7.  enabled since ...
/// printer Garage disabled since ... -
///         reason unknown
/// system default destination: Canon_G3010
/// ```
pub fn parse_printer_status(stdout: &str) -> (Vec<(String, PrinterState)>, Option<String>) {
    let mut printers = Vec::new();
    let mut default = None;

    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix("printer ") {
            let Some((name, tail)) = rest.split_once(' ') else {
                continue;
            };
            let state = if tail.starts_with("is idle") {
                PrinterState::Idle
            } else if tail.starts_with("now printing") {
                PrinterState::Printing
            } else if tail.starts_with("disabled") {
                PrinterState::Disabled
            } else {
                PrinterState::Unknown
            };
            printers.push((name.to_owned(), state));
        } else if let Some((_, name)) = line.split_once(DEFAULT_DEST_MARKER) {
            let name = name.trim();
            if !name.is_empty() {
                default = Some(name.to_owned());
            }
        }
    }

    (printers, default)
}

/// Parse `lpstat -a` into a name -> accepting map.
///
/// ```text
/// Canon_G3010 accepting requests since Sat 01 Jun 2024 10:00:00
/// Garage not accepting requests since ... -
///         Rejecting Jobs
/// ```
pub fn parse_accepting(stdout: &str) -> HashMap<String, bool> {
    stdout
        .lines()
        .filter(|line| !line.starts_with(char::is_whitespace))
        .filter_map(|line| {
            let (name, tail) = line.split_once(' ')?;
            if tail.starts_with("accepting") {
                Some((name.to_owned(), true))
            } else if tail.starts_with("not accepting") {
                Some((name.to_owned(), false))
            } else {
                None
            }
        })
        .collect()
}
