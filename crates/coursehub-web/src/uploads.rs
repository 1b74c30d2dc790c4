//! Upload validation and storage.
//!
//! Every uploaded file lands in one flat directory under its sanitized name.
//! A later upload with the same name replaces the earlier file.

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

/// Lowercase extensions accepted for course videos and thumbnails.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["mp4", "txt", "png", "jpg", "jpeg", "gif"];

/// Reduce a client-supplied filename to a safe, flat, ASCII name.
///
/// Unicode is folded through NFKD and non-ASCII code points are dropped.
/// Path separators and runs of whitespace become a single `_`, anything
/// outside `[A-Za-z0-9._-]` is removed and leading or trailing `.`/`_` are
/// trimmed. The result may be empty.
pub fn sanitize_filename(raw: &str) -> String {
  let ascii: String = raw.nfkd().filter(char::is_ascii).collect();
  let spaced = ascii.replace(['/', '\\'], " ");
  let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
  let kept: String = joined
    .chars()
    .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    .collect();
  kept.trim_matches(|c: char| c == '.' || c == '_').to_owned()
}

/// Lowercased text after the last `.`, if there is one.
pub fn extension(name: &str) -> Option<String> {
  name
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase())
    .filter(|ext| !ext.is_empty())
}

pub fn is_allowed(name: &str) -> bool {
  extension(name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// `Content-Type` to serve a stored upload with.
pub fn content_type(name: &str) -> &'static str {
  match extension(name).as_deref() {
    Some("mp4") => "video/mp4",
    Some("png") => "image/png",
    Some("jpg" | "jpeg") => "image/jpeg",
    Some("gif") => "image/gif",
    Some("txt") => "text/plain; charset=utf-8",
    _ => "application/octet-stream",
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// A file part as it arrived in the request.
#[derive(Debug, Clone)]
pub struct Upload {
  pub file_name: String,
  pub data:      Bytes,
}

/// A file part that passed validation and may be written.
#[derive(Debug, Clone)]
pub struct AcceptedFile {
  pub name: String,
  data:     Bytes,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
  #[error("No {0} file part")]
  Missing(&'static str),
  #[error("No {0} file selected")]
  NothingSelected(&'static str),
  #[error("You cannot upload file {0:?}, its name has no usable characters")]
  UnusableName(String),
  #[error("You cannot upload file {0}, it has an invalid extension!")]
  Disallowed(String),
}

/// Check the part submitted as `field`. Nothing touches the disk here.
pub fn accept(
  field: &'static str,
  upload: Option<Upload>,
) -> Result<AcceptedFile, UploadError> {
  let upload = upload.ok_or(UploadError::Missing(field))?;
  if upload.file_name.is_empty() {
    return Err(UploadError::NothingSelected(field));
  }

  let name = sanitize_filename(&upload.file_name);
  if name.is_empty() {
    return Err(UploadError::UnusableName(upload.file_name));
  }
  if !is_allowed(&name) {
    return Err(UploadError::Disallowed(upload.file_name));
  }

  Ok(AcceptedFile {
    name,
    data: upload.data,
  })
}

/// Write an accepted file into `dir`, replacing any file of the same name.
pub async fn save(dir: &Path, file: &AcceptedFile) -> std::io::Result<()> {
  tokio::fs::write(dir.join(&file.name), &file.data).await
}

/// Remove files written for a request that then failed. Files already gone
/// are skipped.
pub async fn discard(dir: &Path, files: &[&AcceptedFile]) {
  for file in files {
    match tokio::fs::remove_file(dir.join(&file.name)).await {
      Ok(()) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
      Err(e) => warn!(file = %file.name, error = %e, "failed to remove orphaned upload"),
    }
  }
}
