//! Per-session dashboard: selection state, question progression and the text
//! currently shown in the explanation panel.
//!
//! Every dataset or selection change re-runs `selection::derive` and rebuilds
//! the question stack from scratch. Quiz events only touch the stack and the
//! explanation text.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::ContentPolicy;
use crate::config::PanelTexts;
use crate::domain::Dataset;
use crate::progression::{PanelEffect, QuestionStack, QuizEvent};
use crate::selection::{Derived, Selection};

#[derive(Clone, Debug)]
pub struct Dashboard {
  dataset: Option<Arc<Dataset>>,
  policy: ContentPolicy,
  texts: PanelTexts,
  selection: Selection,
  stack: QuestionStack,
  /// Explanation derived for the selection, restored when advancing.
  selection_explanation: Option<String>,
  explanation: String,
}

impl Dashboard {
  pub fn new(dataset: Option<Arc<Dataset>>, policy: ContentPolicy, texts: PanelTexts) -> Self {
    let explanation = texts.explanation_placeholder.clone();
    let mut d = Self {
      dataset: None,
      policy,
      texts,
      selection: Selection::default(),
      stack: QuestionStack::default(),
      selection_explanation: None,
      explanation,
    };
    d.set_dataset(dataset);
    d
  }

  pub fn dataset(&self) -> Option<&Dataset> { self.dataset.as_deref() }

  pub fn selection(&self) -> &Selection { &self.selection }

  pub fn stack(&self) -> &QuestionStack { &self.stack }

  pub fn explanation(&self) -> &str { &self.explanation }

  pub fn texts(&self) -> &PanelTexts { &self.texts }

  /// Install a (new) dataset and re-run the initial selection policy.
  pub fn set_dataset(&mut self, dataset: Option<Arc<Dataset>>) {
    self.dataset = dataset;
    self.selection.initialize(self.dataset.as_deref());
    let derived = self.selection.derive(self.dataset.as_deref(), self.policy);
    self.apply_derived(derived);
  }

  /// Adopt `current` if it differs from the dataset this dashboard was built on.
  pub fn sync_dataset(&mut self, current: Option<&Arc<Dataset>>) -> bool {
    let same = match (&self.dataset, current) {
      (Some(a), Some(b)) => Arc::ptr_eq(a, b),
      (None, None) => true,
      _ => false,
    };
    if !same {
      self.set_dataset(current.cloned());
    }
    !same
  }

  pub fn select_subtopic(&mut self, subtopic_id: &str) {
    let derived = self.selection.select_subtopic(self.dataset.as_deref(), subtopic_id, self.policy);
    debug!(
      target: "dashboard",
      %subtopic_id,
      questions = derived.questions.len(),
      pdf_page = self.selection.pdf_page,
      "Subtopic selected"
    );
    self.apply_derived(derived);
  }

  /// Returns whether the answer was accepted.
  pub fn answer(&mut self, choice_id: &str) -> bool {
    let effect = self.stack.apply(QuizEvent::Answer { choice_id });
    self.show(effect)
  }

  /// Returns whether the quiz moved forward.
  pub fn advance(&mut self) -> bool {
    let effect = self.stack.apply(QuizEvent::Advance);
    self.show(effect)
  }

  fn apply_derived(&mut self, derived: Derived) {
    self.selection_explanation = derived.explanation;
    self.stack = QuestionStack::new(derived.questions);
    self.explanation = self.selection_text();
  }

  fn selection_text(&self) -> String {
    match (&self.selection.subtopic_id, &self.selection_explanation) {
      (None, _) => self.texts.explanation_placeholder.clone(),
      (Some(_), Some(text)) => text.clone(),
      (Some(_), None) => self.texts.missing_explanation.clone(),
    }
  }

  fn show(&mut self, effect: PanelEffect) -> bool {
    match effect {
      PanelEffect::Unchanged => return false,
      PanelEffect::ChoiceExplanation(text) => self.explanation = text,
      PanelEffect::SelectionExplanation => self.explanation = self.selection_text(),
      PanelEffect::Completed => self.explanation = self.texts.completion.clone(),
    }
    true
  }
}
