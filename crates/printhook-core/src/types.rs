// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the printhook gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image formats the gateway accepts for printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Webp,
}

impl ImageKind {
    /// Every accepted kind, in the order used for error messages.
    pub const ALL: [ImageKind; 5] = [
        Self::Png,
        Self::Jpeg,
        Self::Gif,
        Self::Bmp,
        Self::Webp,
    ];

    /// Canonical MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Webp => "image/webp",
        }
    }

    /// File extension used when staging the upload for the spooler.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Webp => "webp",
        }
    }

    /// Resolve a declared `Content-Type`.  Parameters (`; charset=...`) are
    /// ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/bmp" | "image/x-bmp" | "image/x-ms-bmp" => Some(Self::Bmp),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Infer the kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Infer the kind from the extension of a client-supplied file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Comma-separated list of accepted extensions, for error messages.
    pub fn accepted_list() -> String {
        Self::ALL
            .iter()
            .map(|k| k.extension())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Operational state of a spooler destination as reported by `lpstat -p`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrinterState {
    Idle,
    Printing,
    Disabled,
    Unknown,
}

/// Read-only snapshot of one spooler destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterInfo {
    pub name: String,
    pub state: PrinterState,
    /// Whether the queue currently admits new jobs.
    pub accepting_jobs: bool,
    /// Whether this is the system default destination.
    pub is_default: bool,
}

impl PrinterInfo {
    /// A printer is usable when it is enabled and accepting jobs.
    pub fn is_available(&self) -> bool {
        self.accepting_jobs && self.state != PrinterState::Disabled
    }
}

/// Result of one successful spooler submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReceipt {
    /// Spooler-assigned job identifier (e.g. `Canon_G3010-42`).
    pub job_id: String,
    /// 1-based index of the copy this job carries.
    pub copy: u32,
    pub submitted_at: DateTime<Utc>,
}

/// Overall health reported by `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_parameters_are_ignored() {
        assert_eq!(
            ImageKind::from_mime("image/PNG; charset=binary"),
            Some(ImageKind::Png)
        );
        assert_eq!(ImageKind::from_mime("application/pdf"), None);
    }

    #[test]
    fn file_name_extension_lookup() {
        assert_eq!(ImageKind::from_file_name("holiday.JPEG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_file_name("archive.tar.webp"), Some(ImageKind::Webp));
        assert_eq!(ImageKind::from_file_name("README"), None);
        assert_eq!(ImageKind::from_file_name("notes.txt"), None);
    }

    #[test]
    fn accepted_list_covers_all_kinds() {
        assert_eq!(ImageKind::accepted_list(), "png, jpg, gif, bmp, webp");
    }

    #[test]
    fn disabled_printer_is_not_available() {
        let p = PrinterInfo {
            name: "Canon".into(),
            state: PrinterState::Disabled,
            accepting_jobs: true,
            is_default: true,
        };
        assert!(!p.is_available());
    }

    #[test]
    fn printer_info_serialises_lowercase_state() {
        let p = PrinterInfo {
            name: "Canon".into(),
            state: PrinterState::Idle,
            accepting_jobs: true,
            is_default: false,
        };
        let json = serde_json::to_value(&p).expect("serialise");
        assert_eq!(json["state"], "idle");
        assert_eq!(json["accepting_jobs"], true);
    }
}
