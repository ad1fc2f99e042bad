// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload fingerprints.
//
// The gateway logs a digest of each accepted image instead of the
// caller-supplied file name, so a job can be traced from the request log to
// the spooler without recording untrusted strings.

use std::fmt;

use sha2::{Digest, Sha256};

/// Number of hex characters shown by [`Fingerprint::short`].
const SHORT_LEN: usize = 12;

/// SHA-256 digest of an uploaded payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full lowercase hex digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated form for human-facing log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..SHORT_LEN / 2])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_the_fips_abc_vector() {
        assert_eq!(
            Fingerprint::of(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn short_form_is_a_prefix_of_the_full_digest() {
        let fp = Fingerprint::of(b"\x89PNG\r\n\x1a\n");
        assert_eq!(fp.short().len(), SHORT_LEN);
        assert!(fp.to_hex().starts_with(&fp.short()));
        assert_eq!(format!("{fp}"), fp.to_hex());
        assert_eq!(format!("{fp:?}"), format!("Fingerprint({})", fp.short()));
    }

    #[test]
    fn one_changed_byte_changes_the_fingerprint() {
        let a = Fingerprint::of(b"photo-bytes-0");
        let b = Fingerprint::of(b"photo-bytes-1");
        assert_ne!(a, b);
        assert_eq!(a, Fingerprint::of(b"photo-bytes-0"));
    }
}
