// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printhook-server: the HTTP face of the gateway.
//
// Three routes on a loopback-bound axum server:
//
//   GET  /health     unauthenticated, never fails, reports printer availability
//   GET  /printers   X-API-Key, lists spooler destinations
//   POST /print      X-API-Key, multipart `image` + optional `copies`
//
// Public exposure is the tunnel's job; nothing here terminates TLS.

pub mod auth;
pub mod deadline;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod upload;

pub use error::ApiError;
pub use router::build_router;
pub use server::serve;
pub use state::AppState;
