// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printhook-print: the downstream side of the gateway.  Defines the spooler
// capability, implements it on top of the CUPS command-line tools, and turns
// a copy count into independently accounted spooler submissions.

pub mod cups;
pub mod dispatch;
pub mod spooler;

#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

pub use cups::CupsSpooler;
pub use dispatch::{CopyFailure, FailureKind, PrintService, SubmissionReport};
pub use spooler::Spooler;

#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedSpooler;
