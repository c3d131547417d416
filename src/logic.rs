//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - session dashboard snapshots and intents (select, answer, advance)
//!   - document upload / release for a session
//!   - read-only dataset queries (outline, explanations, questions, highlights)

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::protocol::{
  dashboard_out, outline_out, DashboardOut, DocumentOut, ExplanationOut, HighlightsOut, OutlineOut,
  QuestionsOut, TopicHighlightsOut,
};
use crate::session::UploadedDocument;
use crate::state::AppState;
use crate::util::page_locator;

/// A user intent coming from either transport.
#[derive(Debug)]
pub enum Intent {
  View,
  SelectSubtopic(String),
  Answer(String),
  Advance,
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn apply_intent(state: &AppState, session_id: Uuid, intent: Intent) -> Result<DashboardOut, ApiError> {
  state
    .with_session(session_id, |ctx, status| {
      match &intent {
        Intent::View => {}
        Intent::SelectSubtopic(id) => ctx.dashboard.select_subtopic(id),
        Intent::Answer(choice_id) => {
          let accepted = ctx.dashboard.answer(choice_id);
          debug!(target: "dashboard", session = %session_id, %choice_id, accepted, "Answer submitted");
        }
        Intent::Advance => {
          let moved = ctx.dashboard.advance();
          debug!(target: "dashboard", session = %session_id, moved, "Advance requested");
        }
      }
      dashboard_out(ctx, status)
    })
    .await
}

#[instrument(level = "info", skip(state, doc), fields(%session_id, size = doc.size()))]
pub async fn store_document(state: &AppState, session_id: Uuid, doc: UploadedDocument) -> Result<DocumentOut, ApiError> {
  state
    .with_session(session_id, |ctx, _| {
      ctx.replace_document(doc);
      let url = ctx.document_url();
      DocumentOut {
        file_name: ctx.document.as_ref().map(|d| d.file_name.clone()).unwrap_or_default(),
        size_bytes: ctx.document.as_ref().map(UploadedDocument::size).unwrap_or_default(),
        viewer_url: page_locator(&url, ctx.dashboard.selection().pdf_page),
        url,
      }
    })
    .await
}

pub async fn load_document(state: &AppState, session_id: Uuid) -> Result<UploadedDocument, ApiError> {
  state
    .with_session(session_id, |ctx, _| ctx.document.clone())
    .await?
    .ok_or(ApiError::DocumentNotFound)
}

pub async fn release_document(state: &AppState, session_id: Uuid) -> Result<(), ApiError> {
  let released = state.with_session(session_id, |ctx, _| ctx.release_document()).await?;
  if released { Ok(()) } else { Err(ApiError::DocumentNotFound) }
}

pub async fn outline(state: &AppState) -> OutlineOut {
  let status = state.dataset_status().await;
  let data = status.dataset();
  OutlineOut {
    status: status.label(),
    document_title: data.map(|d| d.structure.document_title.clone()).unwrap_or_default(),
    overarching_explanation: data.and_then(|d| d.overarching_explanation()).map(str::to_string),
    topics: data.map(|d| outline_out(&d.structure.topics)).unwrap_or_default(),
  }
}

pub async fn topic_explanation(state: &AppState, topic_id: &str) -> Result<ExplanationOut, ApiError> {
  let data = state.current_dataset().await.ok_or(ApiError::DatasetUnavailable)?;
  Ok(ExplanationOut {
    id: topic_id.to_string(),
    explanation: data.topic_explanation(topic_id).map(str::to_string),
  })
}

pub async fn subtopic_explanation(state: &AppState, subtopic_id: &str) -> Result<ExplanationOut, ApiError> {
  let data = state.current_dataset().await.ok_or(ApiError::DatasetUnavailable)?;
  Ok(ExplanationOut {
    id: subtopic_id.to_string(),
    explanation: data
      .subtopic_explanation(subtopic_id, state.config.content_policy())
      .map(str::to_string),
  })
}

pub async fn topic_questions(state: &AppState, topic_id: &str) -> Result<QuestionsOut, ApiError> {
  let data = state.current_dataset().await.ok_or(ApiError::DatasetUnavailable)?;
  Ok(QuestionsOut {
    id: topic_id.to_string(),
    questions: data.topic_questions(topic_id).into_iter().cloned().collect(),
  })
}

pub async fn subtopic_questions(state: &AppState, subtopic_id: &str) -> Result<QuestionsOut, ApiError> {
  let data = state.current_dataset().await.ok_or(ApiError::DatasetUnavailable)?;
  Ok(QuestionsOut {
    id: subtopic_id.to_string(),
    questions: data
      .subtopic_questions(subtopic_id, state.config.content_policy())
      .into_iter()
      .cloned()
      .collect(),
  })
}

pub async fn topic_highlights(state: &AppState, topic_id: &str) -> Result<TopicHighlightsOut, ApiError> {
  let data = state.current_dataset().await.ok_or(ApiError::DatasetUnavailable)?;
  Ok(TopicHighlightsOut {
    id: topic_id.to_string(),
    highlights: data.topic_highlights(topic_id).into_iter().cloned().collect(),
  })
}

pub async fn page_highlights(state: &AppState, page: u32) -> Result<HighlightsOut, ApiError> {
  let data = state.current_dataset().await.ok_or(ApiError::DatasetUnavailable)?;
  let highlights: Vec<_> = data.page_highlights(page).into_iter().cloned().collect();
  info!(target: "dataset", page, count = highlights.len(), "Page highlights served");
  Ok(HighlightsOut { page, highlights })
}
