//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{
  body::Bytes,
  extract::{Multipart, Path, State},
  http::{header, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::logic::{self, Intent};
use crate::protocol::*;
use crate::session::{validate_upload, UploadError, PDF_MEDIA_TYPE};
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_dataset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let status = state.dataset_status().await;
  Json(DatasetOut { status: status.label(), data: status.dataset().map(|d| d.as_ref().clone()) })
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_outline(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::outline(&state).await)
}

#[instrument(level = "info", skip(state), fields(%topic_id))]
pub async fn http_get_topic_explanation(
  State(state): State<Arc<AppState>>,
  Path(topic_id): Path<String>,
) -> Result<Json<ExplanationOut>, ApiError> {
  Ok(Json(logic::topic_explanation(&state, &topic_id).await?))
}

#[instrument(level = "info", skip(state), fields(%topic_id))]
pub async fn http_get_topic_questions(
  State(state): State<Arc<AppState>>,
  Path(topic_id): Path<String>,
) -> Result<Json<QuestionsOut>, ApiError> {
  Ok(Json(logic::topic_questions(&state, &topic_id).await?))
}

#[instrument(level = "info", skip(state), fields(%subtopic_id))]
pub async fn http_get_subtopic_explanation(
  State(state): State<Arc<AppState>>,
  Path(subtopic_id): Path<String>,
) -> Result<Json<ExplanationOut>, ApiError> {
  Ok(Json(logic::subtopic_explanation(&state, &subtopic_id).await?))
}

#[instrument(level = "info", skip(state), fields(%subtopic_id))]
pub async fn http_get_subtopic_questions(
  State(state): State<Arc<AppState>>,
  Path(subtopic_id): Path<String>,
) -> Result<Json<QuestionsOut>, ApiError> {
  Ok(Json(logic::subtopic_questions(&state, &subtopic_id).await?))
}

#[instrument(level = "info", skip(state), fields(%topic_id))]
pub async fn http_get_topic_highlights(
  State(state): State<Arc<AppState>>,
  Path(topic_id): Path<String>,
) -> Result<Json<TopicHighlightsOut>, ApiError> {
  Ok(Json(logic::topic_highlights(&state, &topic_id).await?))
}

#[instrument(level = "info", skip(state), fields(%page))]
pub async fn http_get_page_highlights(
  State(state): State<Arc<AppState>>,
  Path(page): Path<u32>,
) -> Result<Json<HighlightsOut>, ApiError> {
  Ok(Json(logic::page_highlights(&state, page).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_post_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let session_id = state.create_session().await;
  (StatusCode::CREATED, Json(SessionOut { session_id }))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_session(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  if state.remove_session(id).await {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::SessionNotFound(id))
  }
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_dashboard(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<DashboardOut>, ApiError> {
  Ok(Json(logic::apply_intent(&state, id, Intent::View).await?))
}

#[instrument(level = "info", skip(state, body), fields(%id, subtopic_id = %body.subtopic_id))]
pub async fn http_post_select(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
  Json(body): Json<SelectIn>,
) -> Result<Json<DashboardOut>, ApiError> {
  let view = logic::apply_intent(&state, id, Intent::SelectSubtopic(body.subtopic_id)).await?;
  info!(target: "dashboard", session = %id, pdf_page = view.pdf_page, total = view.quiz.total, "HTTP subtopic selected");
  Ok(Json(view))
}

#[instrument(level = "info", skip(state, body), fields(%id, choice_id = %body.choice_id))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<DashboardOut>, ApiError> {
  Ok(Json(logic::apply_intent(&state, id, Intent::Answer(body.choice_id)).await?))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_post_advance(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Json<DashboardOut>, ApiError> {
  Ok(Json(logic::apply_intent(&state, id, Intent::Advance).await?))
}

/// Accepts exactly one file part. Rejections leave the stored document untouched.
#[instrument(level = "info", skip(state, multipart), fields(%id))]
pub async fn http_post_document(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
  mut multipart: Multipart,
) -> Result<Json<DocumentOut>, ApiError> {
  let mut file: Option<(Option<String>, Option<String>, Bytes)> = None;
  while let Some(field) = multipart.next_field().await? {
    if field.file_name().is_none() && field.name() != Some("file") {
      continue;
    }
    if file.is_some() {
      return Err(reject(id, UploadError::MultipleFiles));
    }
    let file_name = field.file_name().map(str::to_string);
    let media_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await?;
    file = Some((file_name, media_type, bytes));
  }

  let (file_name, media_type, bytes) = file.ok_or_else(|| reject(id, UploadError::MissingFile))?;
  let doc = validate_upload(file_name.as_deref(), media_type.as_deref(), bytes, state.config.max_upload_bytes)
    .map_err(|e| reject(id, e))?;
  Ok(Json(logic::store_document(&state, id, doc).await?))
}

fn reject(id: Uuid, e: UploadError) -> ApiError {
  warn!(target: "session", session = %id, reason = %e, "Upload rejected");
  ApiError::Upload(e)
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_document(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
  let doc = logic::load_document(&state, id).await?;
  let disposition = format!("inline; filename=\"{}\"", doc.file_name.replace('"', ""));
  let headers = [
    (header::CONTENT_TYPE, PDF_MEDIA_TYPE.to_string()),
    (header::CONTENT_DISPOSITION, disposition),
  ];
  Ok((headers, doc.bytes).into_response())
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_delete_document(
  State(state): State<Arc<AppState>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  logic::release_document(&state, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
