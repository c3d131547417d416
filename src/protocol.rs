//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dashboard::Dashboard;
use crate::domain::{Dataset, PageHighlight, Question, Topic};
use crate::progression::{QuestionStack, QuizState};
use crate::session::SessionContext;
use crate::state::DatasetStatus;
use crate::util::page_locator;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
  Ping,
  View,
  SelectSubtopic {
    #[serde(rename = "subtopicId")]
    subtopic_id: String,
  },
  Answer {
    #[serde(rename = "choiceId")]
    choice_id: String,
  },
  Advance,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
  Pong,
  Dashboard { view: DashboardOut },
  Error { message: String },
}

/// Everything the dashboard page renders, in one snapshot.
#[derive(Debug, Serialize)]
pub struct DashboardOut {
  pub session_id: Uuid,
  pub dataset: &'static str,
  pub document_title: Option<String>,
  pub outline: Vec<TopicOut>,
  pub selected_topic_id: Option<String>,
  pub selected_subtopic_id: Option<String>,
  pub pdf_page: u32,
  pub explanation: String,
  pub quiz: QuizOut,
  pub document: Option<DocumentOut>,
}

#[derive(Debug, Serialize)]
pub struct TopicOut {
  pub id: String,
  pub title: String,
  pub page_range: Vec<u32>,
  pub subtopics: Vec<SubtopicOut>,
}

#[derive(Debug, Serialize)]
pub struct SubtopicOut {
  pub id: String,
  pub title: String,
  pub page_reference: u32,
}

#[derive(Debug, Serialize)]
pub struct QuizOut {
  #[serde(flatten)]
  pub state: QuizState,
  pub total: usize,
  pub question: Option<QuestionOut>,
  pub can_advance: bool,
  /// Placeholder shown instead of a question when there is nothing to ask.
  pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionOut {
  pub question_id: String,
  pub question_text: String,
  pub difficulty: String,
  pub page_reference: u32,
  pub choices: Vec<ChoiceOut>,
}

/// `correct` is only revealed once the question has been answered.
#[derive(Debug, Serialize)]
pub struct ChoiceOut {
  pub choice_id: String,
  pub text: String,
  pub picked: bool,
  pub correct: bool,
}

#[derive(Debug, Serialize)]
pub struct DocumentOut {
  pub file_name: String,
  pub size_bytes: usize,
  pub url: String,
  pub viewer_url: String,
}

pub fn outline_out(topics: &[Topic]) -> Vec<TopicOut> {
  topics
    .iter()
    .map(|t| TopicOut {
      id: t.id.clone(),
      title: t.title.clone(),
      page_range: t.page_range.clone(),
      subtopics: t
        .subtopics
        .iter()
        .map(|s| SubtopicOut { id: s.id.clone(), title: s.title.clone(), page_reference: s.page_reference })
        .collect(),
    })
    .collect()
}

fn question_out(q: &Question, answered: Option<&str>) -> QuestionOut {
  let correct_id = answered.and(q.correct_choice()).map(|c| c.choice_id.as_str());
  QuestionOut {
    question_id: q.question_id.clone(),
    question_text: q.question_text.clone(),
    difficulty: q.difficulty.clone(),
    page_reference: q.page_reference,
    choices: q
      .choices
      .iter()
      .map(|c| ChoiceOut {
        choice_id: c.choice_id.clone(),
        text: c.text.clone(),
        picked: answered == Some(c.choice_id.as_str()),
        correct: correct_id == Some(c.choice_id.as_str()),
      })
      .collect(),
  }
}

fn quiz_out(stack: &QuestionStack, dashboard: &Dashboard) -> QuizOut {
  let answered = match stack.state() {
    QuizState::InProgress { answered, .. } => answered.as_deref(),
    _ => None,
  };
  let message = match stack.state() {
    QuizState::Empty => Some(dashboard.texts().quiz_placeholder.clone()),
    QuizState::Complete => Some(dashboard.texts().completion.clone()),
    QuizState::InProgress { .. } => None,
  };
  QuizOut {
    state: stack.state().clone(),
    total: stack.len(),
    question: stack.current_question().map(|q| question_out(q, answered)),
    can_advance: stack.can_advance(),
    message,
  }
}

/// Convert a session (internal) to the public dashboard snapshot.
pub fn dashboard_out(ctx: &SessionContext, status: &DatasetStatus) -> DashboardOut {
  let dashboard = &ctx.dashboard;
  let dataset: Option<&Dataset> = dashboard.dataset();
  let selection = dashboard.selection();
  let selected_topic_id = selection
    .subtopic_id
    .as_deref()
    .and_then(|id| dataset?.find_subtopic_by_id(id))
    .map(|(t, _)| t.id.clone());
  let document = ctx.document.as_ref().map(|doc| {
    let url = ctx.document_url();
    DocumentOut {
      file_name: doc.file_name.clone(),
      size_bytes: doc.size(),
      viewer_url: page_locator(&url, selection.pdf_page),
      url,
    }
  });

  DashboardOut {
    session_id: ctx.id,
    dataset: status.label(),
    document_title: dataset
      .map(|d| d.structure.document_title.clone())
      .filter(|t| !t.is_empty()),
    outline: dataset.map(|d| outline_out(&d.structure.topics)).unwrap_or_default(),
    selected_topic_id,
    selected_subtopic_id: selection.subtopic_id.clone(),
    pdf_page: selection.pdf_page,
    explanation: dashboard.explanation().to_string(),
    quiz: quiz_out(dashboard.stack(), dashboard),
    document,
  }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct SelectIn {
  #[serde(rename = "subtopicId")]
  pub subtopic_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
  #[serde(rename = "choiceId")]
  pub choice_id: String,
}

#[derive(Serialize)]
pub struct SessionOut {
  pub session_id: Uuid,
}

#[derive(Serialize)]
pub struct DatasetOut {
  pub status: &'static str,
  pub data: Option<Dataset>,
}

#[derive(Serialize)]
pub struct OutlineOut {
  pub status: &'static str,
  pub document_title: String,
  pub overarching_explanation: Option<String>,
  pub topics: Vec<TopicOut>,
}

#[derive(Serialize)]
pub struct ExplanationOut {
  pub id: String,
  pub explanation: Option<String>,
}

#[derive(Serialize)]
pub struct QuestionsOut {
  pub id: String,
  pub questions: Vec<Question>,
}

#[derive(Serialize)]
pub struct HighlightsOut {
  pub page: u32,
  pub highlights: Vec<PageHighlight>,
}

#[derive(Serialize)]
pub struct TopicHighlightsOut {
  pub id: String,
  pub highlights: Vec<PageHighlight>,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}
