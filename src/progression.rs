//! Question progression over the question list of the current selection.
//!
//! `transition` is the whole state machine: a pure function of
//! (state, event, questions). `QuestionStack` pairs the machine with its
//! question list and reports which explanation the dashboard should show next.

use serde::Serialize;

use crate::domain::{Choice, Question};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuizState {
  /// No questions for the current selection.
  Empty,
  /// Showing `questions[index]`; `answered` holds the picked choice id.
  InProgress { index: usize, answered: Option<String> },
  /// Every question answered. Left only through a selection change.
  Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizEvent<'a> {
  /// The selection changed and `questions` is the new list.
  Reset,
  Answer { choice_id: &'a str },
  Advance,
}

pub fn transition(state: &QuizState, event: QuizEvent<'_>, questions: &[Question]) -> QuizState {
  match (state, event) {
    (_, QuizEvent::Reset) => {
      if questions.is_empty() {
        QuizState::Empty
      } else {
        QuizState::InProgress { index: 0, answered: None }
      }
    }

    (QuizState::InProgress { index, answered: None }, QuizEvent::Answer { choice_id }) => {
      let known = questions.get(*index).and_then(|q| q.choice(choice_id)).is_some();
      if known {
        QuizState::InProgress { index: *index, answered: Some(choice_id.to_string()) }
      } else {
        state.clone()
      }
    }

    (QuizState::InProgress { index, answered: Some(_) }, QuizEvent::Advance) => {
      let next = index + 1;
      if next < questions.len() {
        QuizState::InProgress { index: next, answered: None }
      } else {
        QuizState::Complete
      }
    }

    // Repeated answers, advancing an unanswered question, and anything in
    // Empty/Complete leave the state untouched.
    _ => state.clone(),
  }
}

/// What the explanation panel should show after an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelEffect {
  Unchanged,
  /// Explanation text of the picked choice.
  ChoiceExplanation(String),
  /// Back to the subtopic/topic explanation.
  SelectionExplanation,
  Completed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestionStack {
  questions: Vec<Question>,
  state: QuizState,
}

impl Default for QuestionStack {
  fn default() -> Self {
    Self { questions: Vec::new(), state: QuizState::Empty }
  }
}

impl QuestionStack {
  pub fn new(questions: Vec<Question>) -> Self {
    let state = transition(&QuizState::Empty, QuizEvent::Reset, &questions);
    Self { questions, state }
  }

  pub fn state(&self) -> &QuizState { &self.state }

  pub fn len(&self) -> usize { self.questions.len() }

  pub fn current_question(&self) -> Option<&Question> {
    match &self.state {
      QuizState::InProgress { index, .. } => self.questions.get(*index),
      _ => None,
    }
  }

  pub fn answered_choice(&self) -> Option<&Choice> {
    match &self.state {
      QuizState::InProgress { answered: Some(id), .. } => self.current_question()?.choice(id),
      _ => None,
    }
  }

  pub fn can_advance(&self) -> bool {
    matches!(self.state, QuizState::InProgress { answered: Some(_), .. })
  }

  pub fn apply(&mut self, event: QuizEvent<'_>) -> PanelEffect {
    let next = transition(&self.state, event, &self.questions);
    if next == self.state {
      return PanelEffect::Unchanged;
    }
    self.state = next;
    match (&self.state, event) {
      (QuizState::Complete, _) => PanelEffect::Completed,
      (QuizState::InProgress { .. }, QuizEvent::Answer { .. }) => self
        .answered_choice()
        .map(|c| PanelEffect::ChoiceExplanation(c.explanation.clone()))
        .unwrap_or(PanelEffect::Unchanged),
      _ => PanelEffect::SelectionExplanation,
    }
  }
}
