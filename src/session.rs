//! Session context: the typed handoff between the upload view and the
//! dashboard view of one browser tab.
//!
//! A session owns at most one uploaded document and its dashboard. Replacing or
//! deleting the document, or tearing the session down, drops the bytes.
//! Sessions left idle longer than the configured window are evicted.

use std::time::{Duration, Instant};

use axum::body::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::dashboard::Dashboard;
use crate::util::{essence, trunc_for_log};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
  #[error("Please select a PDF file (got '{0}').")]
  UnsupportedMediaType(String),

  #[error("The uploaded file is empty.")]
  Empty,

  #[error("The uploaded file is {size} bytes; the limit is {limit} bytes.")]
  TooLarge { size: usize, limit: usize },

  #[error("No file was provided.")]
  MissingFile,

  #[error("Please upload a single file.")]
  MultipleFiles,
}

/// An accepted PDF held in memory for the viewer.
#[derive(Clone, Debug)]
pub struct UploadedDocument {
  pub file_name: String,
  pub bytes: Bytes,
}

impl UploadedDocument {
  pub fn size(&self) -> usize { self.bytes.len() }
}

pub fn is_pdf_media_type(media_type: &str) -> bool {
  essence(media_type) == PDF_MEDIA_TYPE
}

/// Accept a single uploaded file if it declares the PDF media type and fits the limit.
pub fn validate_upload(
  file_name: Option<&str>,
  media_type: Option<&str>,
  bytes: Bytes,
  limit: usize,
) -> Result<UploadedDocument, UploadError> {
  let media_type = media_type.unwrap_or("");
  if !is_pdf_media_type(media_type) {
    let shown = if media_type.is_empty() { "unknown" } else { media_type };
    return Err(UploadError::UnsupportedMediaType(shown.to_string()));
  }
  if bytes.is_empty() {
    return Err(UploadError::Empty);
  }
  if bytes.len() > limit {
    return Err(UploadError::TooLarge { size: bytes.len(), limit });
  }
  let file_name = file_name
    .map(str::trim)
    .filter(|n| !n.is_empty())
    .unwrap_or("document.pdf")
    .to_string();
  Ok(UploadedDocument { file_name, bytes })
}

#[derive(Debug)]
pub struct SessionContext {
  pub id: Uuid,
  pub document: Option<UploadedDocument>,
  pub dashboard: Dashboard,
  pub last_seen: Instant,
}

impl SessionContext {
  pub fn new(id: Uuid, dashboard: Dashboard) -> Self {
    Self { id, document: None, dashboard, last_seen: Instant::now() }
  }

  pub fn touch(&mut self) { self.last_seen = Instant::now(); }

  pub fn idle_for(&self, now: Instant) -> Duration {
    now.saturating_duration_since(self.last_seen)
  }

  pub fn document_url(&self) -> String {
    format!("/api/v1/sessions/{}/document", self.id)
  }

  /// Store `doc`, releasing whatever it supersedes.
  pub fn replace_document(&mut self, doc: UploadedDocument) {
    info!(
      target: "session",
      session = %self.id,
      file = %trunc_for_log(&doc.file_name, 80),
      size = doc.size(),
      "Document accepted"
    );
    if let Some(old) = self.document.replace(doc) {
      info!(target: "session", session = %self.id, file = %trunc_for_log(&old.file_name, 80), "Superseded document released");
    }
  }

  pub fn release_document(&mut self) -> bool {
    match self.document.take() {
      Some(old) => {
        info!(target: "session", session = %self.id, file = %trunc_for_log(&old.file_name, 80), "Document released");
        true
      }
      None => false,
    }
  }
}
