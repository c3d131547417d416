//! API error type. Converts into a JSON `{error, status}` response.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::session::UploadError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("unknown session: {0}")]
  SessionNotFound(Uuid),

  #[error("no document uploaded for this session")]
  DocumentNotFound,

  #[error("dataset is not available")]
  DatasetUnavailable,

  #[error("{0}")]
  Upload(#[from] UploadError),

  #[error("invalid upload: {0}")]
  Multipart(#[from] MultipartError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      Self::SessionNotFound(_) | Self::DocumentNotFound => StatusCode::NOT_FOUND,
      Self::DatasetUnavailable => StatusCode::SERVICE_UNAVAILABLE,
      Self::Upload(UploadError::UnsupportedMediaType(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
      Self::Upload(UploadError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
      Self::Upload(_) => StatusCode::BAD_REQUEST,
      Self::Multipart(e) => e.status(),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = serde_json::json!({
      "error": self.to_string(),
      "status": status.as_u16(),
    });
    (status, axum::Json(body)).into_response()
  }
}
