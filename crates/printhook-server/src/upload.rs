// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Multipart upload handling for `POST /print`.
//
// The form is read completely, then validated in a fixed order so the first
// failing check determines the response:
//
//   1. exactly one non-empty `image` part
//   2. content type in the accepted set, and bytes that really are an image
//   3. `copies` in [1, max_copies]
//
// A valid upload is staged in a `TempPath`, which removes the file when
// dropped.  Every exit path, including a cancelled request future, cleans
// up without an explicit call.

use std::io::Write;
use std::num::IntErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use tempfile::TempPath;
use tracing::{debug, warn};

use printhook_core::error::{GatewayError, Result};
use printhook_core::types::ImageKind;

/// Form field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Form field carrying the copy count.
pub const COPIES_FIELD: &str = "copies";

/// Content type browsers and curl send when they do not know better.
const OCTET_STREAM: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One file part named `image`, as received.
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Raw form contents before validation.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub images: Vec<ImagePart>,
    pub copies: Option<String>,
}

/// An image that passed validation.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Kind detected from the payload itself.
    pub kind: ImageKind,
    pub bytes: Bytes,
}

/// A validated print request.  Lives for the duration of one HTTP call.
#[derive(Debug, Clone)]
pub struct PrintRequest {
    pub image: UploadedImage,
    pub copies: u32,
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// Drain the multipart stream into an [`UploadForm`].  Unknown fields are
/// ignored.
pub async fn read_form(mut multipart: Multipart, max_bytes: usize) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        match field.name() {
            Some(IMAGE_FIELD) => {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, max_bytes))?;
                form.images.push(ImagePart {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some(COPIES_FIELD) => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_bytes))?;
                form.copies = Some(text);
            }
            other => {
                debug!(field = ?other, "ignoring unexpected form field");
            }
        }
    }

    Ok(form)
}

fn multipart_error(e: MultipartError, max_bytes: usize) -> GatewayError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge(max_bytes)
    } else {
        GatewayError::Validation(format!("malformed multipart body: {}", e.body_text()))
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Apply the ordered checks and build a [`PrintRequest`].
pub fn validate(form: UploadForm, max_copies: u32) -> Result<PrintRequest> {
    let UploadForm { mut images, copies } = form;

    let part = match images.len() {
        0 => return Err(GatewayError::Validation("No image file provided".into())),
        1 => images.remove(0),
        n => {
            return Err(GatewayError::Validation(format!(
                "Expected exactly one image file, got {n}"
            )));
        }
    };
    if part.bytes.is_empty() {
        return Err(GatewayError::Validation("No file selected".into()));
    }

    let kind = resolve_kind(&part)?;
    let copies = parse_copies(copies.as_deref(), max_copies)?;

    Ok(PrintRequest {
        image: UploadedImage {
            kind,
            bytes: part.bytes,
        },
        copies,
    })
}

/// Check the declared type against the accepted set and confirm the bytes
/// agree.
///
/// A missing or generic (`application/octet-stream`) declared type falls
/// back to the file-name extension.  The returned kind is what the payload
/// actually contains; a PNG uploaded as `image/jpeg` is still a PNG.
fn resolve_kind(part: &ImagePart) -> Result<ImageKind> {
    let not_allowed = || {
        GatewayError::Validation(format!(
            "File type not allowed. Allowed types: {}",
            ImageKind::accepted_list()
        ))
    };

    let declared_type = part
        .content_type
        .as_deref()
        .map(str::trim)
        .filter(|ct| !ct.is_empty() && !ct.eq_ignore_ascii_case(OCTET_STREAM));
    let declared = match declared_type {
        Some(ct) => ImageKind::from_mime(ct),
        None => part.file_name.as_deref().and_then(ImageKind::from_file_name),
    }
    .ok_or_else(not_allowed)?;

    let actual = sniff(&part.bytes).ok_or_else(|| {
        GatewayError::Validation(format!(
            "Uploaded file is not a valid {} image",
            declared.extension()
        ))
    })?;
    if actual != declared {
        debug!(?declared, ?actual, "declared image type differs from content");
    }
    Ok(actual)
}

/// Identify an accepted image format from its magic bytes.
fn sniff(bytes: &[u8]) -> Option<ImageKind> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Png => Some(ImageKind::Png),
        image::ImageFormat::Jpeg => Some(ImageKind::Jpeg),
        image::ImageFormat::Gif => Some(ImageKind::Gif),
        image::ImageFormat::Bmp => Some(ImageKind::Bmp),
        image::ImageFormat::WebP => Some(ImageKind::Webp),
        _ => None,
    }
}

/// Parse the optional `copies` field.  Absent or blank means one copy.
pub fn parse_copies(raw: Option<&str>, max_copies: u32) -> Result<u32> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(1);
    };

    let out_of_range =
        || GatewayError::Validation(format!("copies must be between 1 and {max_copies}"));

    let copies = match raw.parse::<i64>() {
        Ok(n) => n,
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            return Err(out_of_range());
        }
        Err(_) => {
            return Err(GatewayError::Validation(format!(
                "copies must be an integer, got {raw:?}"
            )));
        }
    };

    if copies < 1 || copies > i64::from(max_copies) {
        return Err(out_of_range());
    }
    u32::try_from(copies).map_err(|_| out_of_range())
}

// ---------------------------------------------------------------------------
// Staging
// ---------------------------------------------------------------------------

/// Write the image to a fresh temp file in `dir` within `limit`.
///
/// The write runs on the blocking pool.  If it outlives `limit` the
/// blocking task still owns the file and deletes it when it finishes.
pub async fn stage(image: &UploadedImage, dir: PathBuf, limit: Duration) -> Result<TempPath> {
    let bytes = image.bytes.clone();
    let suffix = format!(".{}", image.kind.extension());

    let write = tokio::task::spawn_blocking(move || -> std::io::Result<TempPath> {
        let mut file = tempfile::Builder::new()
            .prefix("printhook-")
            .suffix(&suffix)
            .tempfile_in(&dir)?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(file.into_temp_path())
    });

    match tokio::time::timeout(limit, write).await {
        Err(_) => Err(GatewayError::UpstreamTimeout(format!(
            "staging the upload took longer than {}ms",
            limit.as_millis()
        ))),
        Ok(Err(join)) => Err(GatewayError::Io(std::io::Error::other(join))),
        Ok(Ok(staged)) => {
            let path = staged?;
            debug!(path = %path.display(), "upload staged");
            Ok(path)
        }
    }
}

/// Remove a staged upload, logging rather than failing on error.
pub fn discard(path: TempPath) {
    let shown = path.display().to_string();
    if let Err(e) = path.close() {
        warn!(path = %shown, error = %e, "failed to remove staged upload");
    }
}
