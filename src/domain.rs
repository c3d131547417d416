//! Dataset models consumed by the dashboard: document structure, highlights,
//! explanations and quiz.
//!
//! Everything here is produced by the external content pipeline and is read-only
//! once loaded. Fields the pipeline may omit are defaulted so a partial dataset
//! still deserializes.

use serde::{Deserialize, Deserializer, Serialize};

/// Wire envelope of the static dataset resource: `{ "data": Dataset }`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatasetEnvelope {
  #[serde(default)] pub success: Option<bool>,
  pub data: Dataset,
}

/// Root of the pre-computed learning dataset.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
  #[serde(default)] pub structure: DocumentStructure,
  #[serde(default)] pub highlights: HighlightedDocument,
  #[serde(default)] pub explanations: DocumentExplanations,
  #[serde(default)] pub quiz: Quiz,
  #[serde(default)] pub metadata: Option<DatasetMetadata>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DocumentStructure {
  #[serde(default)] pub document_title: String,
  #[serde(default)] pub topics: Vec<Topic>,
}

/// A main topic of the lecture with its ordered subtopics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topic {
  pub id: String,
  pub title: String,
  #[serde(default, deserialize_with = "lenient_pages")] pub page_range: Vec<u32>,
  #[serde(default)] pub subtopics: Vec<Subtopic>,
}

/// Subtopic ids are unique across the whole dataset, not just within a topic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subtopic {
  pub id: String,
  pub title: String,
  /// 1-based page; 0 means "no navigation target".
  #[serde(default, deserialize_with = "lenient_page")] pub page_reference: u32,
  #[serde(default, deserialize_with = "lenient_offset")] pub char_start: Option<u64>,
  #[serde(default, deserialize_with = "lenient_offset")] pub char_end: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HighlightedDocument {
  #[serde(default)] pub highlights: Vec<PageHighlight>,
  #[serde(default)] pub total_pages: u32,
}

/// A highlighted passage of the source document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageHighlight {
  pub page_number: u32,
  #[serde(default)] pub start_char: u64,
  #[serde(default)] pub end_char: u64,
  pub text: String,
  pub topic_id: String,
  #[serde(default = "default_importance")] pub importance: String,
}

fn default_importance() -> String { "medium".into() }

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DocumentExplanations {
  #[serde(default)] pub overarching_explanation: String,
  #[serde(default)] pub topic_explanations: Vec<TopicExplanation>,
  /// Optional per-subtopic texts; only consulted when subtopic overrides are enabled.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub subtopic_explanations: Vec<SubtopicExplanation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicExplanation {
  pub topic_id: String,
  #[serde(default)] pub topic_title: String,
  pub explanation: String,
  #[serde(default)] pub prerequisite_concepts: Vec<String>,
  #[serde(default)] pub next_steps: Vec<String>,
  #[serde(default)] pub related_topics: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubtopicExplanation {
  pub subtopic_id: String,
  pub explanation: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Quiz {
  #[serde(default)] pub questions: Vec<Question>,
  #[serde(default)] pub total_questions: usize,
}

/// Multiple choice question. `topic_id` is a foreign key into the structure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub question_id: String,
  pub question_text: String,
  #[serde(default)] pub topic_id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subtopic_id: Option<String>,
  #[serde(default)] pub choices: Vec<Choice>,
  #[serde(default = "default_difficulty")] pub difficulty: String,
  #[serde(default, deserialize_with = "lenient_page")] pub page_reference: u32,
}

fn default_difficulty() -> String { "medium".into() }

impl Question {
  pub fn choice(&self, choice_id: &str) -> Option<&Choice> {
    self.choices.iter().find(|c| c.choice_id == choice_id)
  }

  /// The first choice flagged correct. Datasets with zero correct choices yield `None`.
  pub fn correct_choice(&self) -> Option<&Choice> {
    self.choices.iter().find(|c| c.is_correct)
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Choice {
  pub choice_id: String,
  pub text: String,
  #[serde(default)] pub is_correct: bool,
  #[serde(default)] pub explanation: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DatasetMetadata {
  #[serde(default)] pub total_pages: u32,
  #[serde(default)] pub total_topics: usize,
  #[serde(default)] pub total_highlights: usize,
  #[serde(default)] pub total_questions: usize,
}

// The pipeline emits plain signed ints for pages and offsets. A null or
// negative value on one entry must not reject the whole dataset.

fn clamp_page(raw: i64) -> u32 {
  u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

/// `null`, missing or negative pages collapse to 0.
fn lenient_page<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
  Ok(Option::<i64>::deserialize(d)?.map(clamp_page).unwrap_or(0))
}

fn lenient_pages<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u32>, D::Error> {
  let raw = Option::<Vec<Option<i64>>>::deserialize(d)?.unwrap_or_default();
  Ok(raw.into_iter().map(|p| p.map(clamp_page).unwrap_or(0)).collect())
}

/// Negative character offsets are treated as unknown.
fn lenient_offset<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
  Ok(Option::<i64>::deserialize(d)?.and_then(|v| u64::try_from(v).ok()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_dataset_deserializes_with_defaults() {
    let raw = r#"{
      "data": {
        "structure": { "topics": [ { "id": "t1", "title": "Intro",
          "subtopics": [ { "id": "s1", "title": "Basics" } ] } ] },
        "quiz": { "questions": [ { "question_id": "q1", "question_text": "?",
          "topic_id": "t1", "choices": [ { "choice_id": "a", "text": "A" } ] } ] }
      }
    }"#;
    let env: DatasetEnvelope = serde_json::from_str(raw).unwrap();
    let data = env.data;
    assert_eq!(data.structure.topics[0].subtopics[0].page_reference, 0);
    assert!(data.explanations.topic_explanations.is_empty());
    let q = &data.quiz.questions[0];
    assert_eq!(q.difficulty, "medium");
    assert!(!q.choices[0].is_correct);
    assert!(q.correct_choice().is_none());
    assert!(data.metadata.is_none());
  }

  #[test]
  fn null_and_negative_pages_do_not_reject_the_dataset() {
    let raw = r#"{
      "data": {
        "structure": { "topics": [ { "id": "t1", "title": "Intro", "page_range": [null, -2, 5],
          "subtopics": [
            { "id": "s1", "title": "Basics", "page_reference": 4 },
            { "id": "s2", "title": "Gaps", "page_reference": null, "char_start": null, "char_end": -1 },
            { "id": "s3", "title": "Odd", "page_reference": -1, "char_start": 10 }
          ] } ] },
        "quiz": { "questions": [ { "question_id": "q1", "question_text": "?",
          "topic_id": "t1", "page_reference": -7 } ] }
      }
    }"#;
    let data = serde_json::from_str::<DatasetEnvelope>(raw).unwrap().data;
    let topic = &data.structure.topics[0];
    assert_eq!(topic.page_range, vec![0, 0, 5]);
    let pages: Vec<u32> = topic.subtopics.iter().map(|s| s.page_reference).collect();
    assert_eq!(pages, vec![4, 0, 0]);
    assert_eq!((topic.subtopics[1].char_start, topic.subtopics[1].char_end), (None, None));
    assert_eq!(topic.subtopics[2].char_start, Some(10));
    assert_eq!(data.quiz.questions[0].page_reference, 0);
  }

  #[test]
  fn correct_choice_picks_first_flagged() {
    let q = Question {
      question_id: "q".into(),
      question_text: "?".into(),
      topic_id: "t".into(),
      subtopic_id: None,
      choices: vec![
        Choice { choice_id: "a".into(), text: "A".into(), is_correct: false, explanation: String::new() },
        Choice { choice_id: "b".into(), text: "B".into(), is_correct: true, explanation: String::new() },
        Choice { choice_id: "c".into(), text: "C".into(), is_correct: true, explanation: String::new() },
      ],
      difficulty: "easy".into(),
      page_reference: 1,
    };
    assert_eq!(q.correct_choice().map(|c| c.choice_id.as_str()), Some("b"));
    assert!(q.choice("z").is_none());
  }
}
