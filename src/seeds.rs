//! Small built-in datasets used by unit and router tests.

use crate::domain::{
  Choice, Dataset, DocumentExplanations, DocumentStructure, HighlightedDocument, PageHighlight,
  Question, Quiz, Subtopic, Topic, TopicExplanation,
};

pub fn subtopic(id: &str, page_reference: u32) -> Subtopic {
  Subtopic {
    id: id.into(),
    title: format!("Subtopic {id}"),
    page_reference,
    char_start: None,
    char_end: None,
  }
}

pub fn topic(id: &str, subtopics: Vec<Subtopic>) -> Topic {
  Topic { id: id.into(), title: format!("Topic {id}"), page_range: vec![1, 4], subtopics }
}

/// Four choices, the second one correct. Each choice explains itself.
pub fn question(id: &str, topic_id: &str) -> Question {
  let choices = ["a", "b", "c", "d"]
    .iter()
    .map(|c| Choice {
      choice_id: format!("{id}_{c}"),
      text: format!("Choice {c}"),
      is_correct: *c == "b",
      explanation: format!("{id}: picked {c}"),
    })
    .collect();
  Question {
    question_id: id.into(),
    question_text: format!("Question {id}?"),
    topic_id: topic_id.into(),
    subtopic_id: None,
    choices,
    difficulty: "medium".into(),
    page_reference: 2,
  }
}

pub fn topic_explanation(topic_id: &str, text: &str) -> TopicExplanation {
  TopicExplanation {
    topic_id: topic_id.into(),
    topic_title: format!("Topic {topic_id}"),
    explanation: text.into(),
    prerequisite_concepts: vec![],
    next_steps: vec![],
    related_topics: vec![],
  }
}

/// One topic `t1` with subtopic `s1` (page 3) and two questions for `t1`.
pub fn single_topic() -> Dataset {
  Dataset {
    structure: DocumentStructure {
      document_title: "Lecture 1".into(),
      topics: vec![topic("t1", vec![subtopic("s1", 3)])],
    },
    highlights: HighlightedDocument::default(),
    explanations: DocumentExplanations {
      overarching_explanation: "Overview".into(),
      topic_explanations: vec![topic_explanation("t1", "About t1")],
      subtopic_explanations: vec![],
    },
    quiz: Quiz { questions: vec![question("q1", "t1"), question("q2", "t1")], total_questions: 2 },
    metadata: None,
  }
}

/// Two topics, interleaved questions, a page-0 subtopic and a few highlights.
pub fn two_topics() -> Dataset {
  Dataset {
    structure: DocumentStructure {
      document_title: "Lecture 2".into(),
      topics: vec![
        topic("t1", vec![subtopic("s1", 3), subtopic("s2", 0)]),
        topic("t2", vec![subtopic("s3", 5), subtopic("s4", 7)]),
      ],
    },
    highlights: HighlightedDocument {
      highlights: vec![
        highlight(3, "t1", "alpha"),
        highlight(5, "t2", "beta"),
        highlight(3, "t2", "gamma"),
      ],
      total_pages: 8,
    },
    explanations: DocumentExplanations {
      overarching_explanation: "Two topics".into(),
      topic_explanations: vec![
        topic_explanation("t1", "About t1"),
        topic_explanation("t2", "About t2"),
      ],
      subtopic_explanations: vec![],
    },
    quiz: Quiz {
      questions: vec![
        question("q1", "t1"),
        question("q2", "t2"),
        question("q3", "t1"),
        question("q4", "t2"),
        question("q5", "t2"),
      ],
      total_questions: 5,
    },
    metadata: None,
  }
}

fn highlight(page_number: u32, topic_id: &str, text: &str) -> PageHighlight {
  PageHighlight {
    page_number,
    start_char: 0,
    end_char: text.len() as u64,
    text: text.into(),
    topic_id: topic_id.into(),
    importance: "high".into(),
  }
}
