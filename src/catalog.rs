//! Dataset accessor: one-shot loading of the static dataset plus lookups and
//! derivations over it (topic/subtopic resolution, explanations, questions,
//! highlights).
//!
//! All lookups are linear scans in document order. Subtopic ids live in one
//! global id space, so `find_subtopic_by_id` searches every topic.
//!
//! Subtopic-level content currently falls back to the owning topic. The
//! `ContentPolicy` passed to `subtopic_explanation` / `subtopic_questions` is the
//! single place where subtopic overrides are switched on.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, instrument};

use crate::domain::{Dataset, DatasetEnvelope, PageHighlight, Question, Subtopic, Topic};

/// Where the dataset document lives: a local file or an http(s) URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetSource {
  File(PathBuf),
  Url(String),
}

impl DatasetSource {
  pub fn parse(raw: &str) -> Self {
    let s = raw.trim();
    if s.starts_with("http://") || s.starts_with("https://") {
      DatasetSource::Url(s.to_string())
    } else {
      DatasetSource::File(PathBuf::from(s))
    }
  }
}

impl std::fmt::Display for DatasetSource {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      DatasetSource::File(p) => write!(f, "{}", p.display()),
      DatasetSource::Url(u) => f.write_str(u),
    }
  }
}

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to read dataset file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("dataset request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("dataset request returned HTTP {0}")]
  Status(u16),

  #[error("dataset is not valid JSON: {0}")]
  Parse(#[from] serde_json::Error),
}

/// Fetch the dataset once. Failures are logged and collapse to `None`, which the
/// dashboard renders exactly like an empty dataset.
#[instrument(level = "info", skip_all, fields(source = %source))]
pub async fn load(source: &DatasetSource) -> Option<Dataset> {
  match try_load(source).await {
    Ok(data) => {
      info!(
        target: "dataset",
        title = %data.structure.document_title,
        topics = data.structure.topics.len(),
        questions = data.quiz.questions.len(),
        highlights = data.highlights.highlights.len(),
        "Dataset loaded"
      );
      Some(data)
    }
    Err(e) => {
      error!(target: "dataset", error = %e, "Dataset unavailable; continuing with an empty dashboard");
      None
    }
  }
}

async fn try_load(source: &DatasetSource) -> Result<Dataset, LoadError> {
  let bytes = match source {
    DatasetSource::File(path) => tokio::fs::read(path)
      .await
      .map_err(|e| LoadError::Read { path: path.clone(), source: e })?,
    DatasetSource::Url(url) => {
      let client = reqwest::Client::builder().timeout(Duration::from_secs(20)).build()?;
      let res = client.get(url).send().await?;
      if !res.status().is_success() {
        return Err(LoadError::Status(res.status().as_u16()));
      }
      res.bytes().await?.to_vec()
    }
  };
  parse_envelope(&bytes)
}

/// Parse the `{ "data": Dataset }` envelope.
pub fn parse_envelope(bytes: &[u8]) -> Result<Dataset, LoadError> {
  let env: DatasetEnvelope = serde_json::from_slice(bytes)?;
  Ok(env.data)
}

/// How subtopic-level content is resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentPolicy {
  /// Subtopics always show their owning topic's explanation and questions.
  #[default]
  TopicFallback,
  /// Prefer subtopic-specific entries when the dataset carries them.
  SubtopicOverrides,
}

impl ContentPolicy {
  pub fn from_flag(subtopic_overrides: bool) -> Self {
    if subtopic_overrides { ContentPolicy::SubtopicOverrides } else { ContentPolicy::TopicFallback }
  }
}

impl Dataset {
  pub fn find_topic_by_id(&self, id: &str) -> Option<&Topic> {
    self.structure.topics.iter().find(|t| t.id == id)
  }

  /// First match in document order, paired with its owning topic.
  pub fn find_subtopic_by_id(&self, id: &str) -> Option<(&Topic, &Subtopic)> {
    self.structure.topics.iter().find_map(|t| {
      t.subtopics.iter().find(|s| s.id == id).map(|s| (t, s))
    })
  }

  /// The initial selection: first subtopic of the first topic, if both exist.
  pub fn first_subtopic(&self) -> Option<&Subtopic> {
    self.structure.topics.first().and_then(|t| t.subtopics.first())
  }

  pub fn overarching_explanation(&self) -> Option<&str> {
    let s = self.explanations.overarching_explanation.as_str();
    if s.trim().is_empty() { None } else { Some(s) }
  }

  pub fn topic_explanation(&self, topic_id: &str) -> Option<&str> {
    self.explanations
      .topic_explanations
      .iter()
      .find(|e| e.topic_id == topic_id)
      .map(|e| e.explanation.as_str())
  }

  pub fn subtopic_explanation(&self, subtopic_id: &str, policy: ContentPolicy) -> Option<&str> {
    let (topic, _) = self.find_subtopic_by_id(subtopic_id)?;
    if policy == ContentPolicy::SubtopicOverrides {
      let own = self.explanations
        .subtopic_explanations
        .iter()
        .find(|e| e.subtopic_id == subtopic_id);
      if let Some(e) = own {
        return Some(e.explanation.as_str());
      }
    }
    self.topic_explanation(&topic.id)
  }

  /// Questions whose `topic_id` matches, in dataset order.
  pub fn topic_questions(&self, topic_id: &str) -> Vec<&Question> {
    self.quiz.questions.iter().filter(|q| q.topic_id == topic_id).collect()
  }

  pub fn subtopic_questions(&self, subtopic_id: &str, policy: ContentPolicy) -> Vec<&Question> {
    let Some((topic, _)) = self.find_subtopic_by_id(subtopic_id) else {
      return Vec::new();
    };
    if policy == ContentPolicy::SubtopicOverrides {
      let own: Vec<&Question> = self.quiz
        .questions
        .iter()
        .filter(|q| q.subtopic_id.as_deref() == Some(subtopic_id))
        .collect();
      if !own.is_empty() {
        return own;
      }
    }
    self.topic_questions(&topic.id)
  }

  pub fn topic_highlights(&self, topic_id: &str) -> Vec<&PageHighlight> {
    self.highlights.highlights.iter().filter(|h| h.topic_id == topic_id).collect()
  }

  pub fn page_highlights(&self, page: u32) -> Vec<&PageHighlight> {
    self.highlights.highlights.iter().filter(|h| h.page_number == page).collect()
  }
}
