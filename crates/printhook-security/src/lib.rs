// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printhook-security: caller authentication and document fingerprinting.
//
// Every protected endpoint funnels through `verify_api_key`, which compares
// keys in constant time so response latency does not leak how much of a
// guessed key was correct.

pub mod auth;
pub mod integrity;

pub use auth::{API_KEY_HEADER, keys_match, verify_api_key};
pub use integrity::Fingerprint;
