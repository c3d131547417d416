//! Selection state: which subtopic the user is looking at, the PDF page it
//! points the viewer to, and the pure derivation of everything shown for it.

use serde::Serialize;

use crate::catalog::ContentPolicy;
use crate::domain::{Dataset, Question};

/// Page the embedded viewer opens on before any explicit navigation.
pub const DEFAULT_PDF_PAGE: u32 = 1;

/// View data derived from (dataset, selected subtopic). Recomputed from scratch
/// on every change of either input.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Derived {
  pub explanation: Option<String>,
  pub questions: Vec<Question>,
  /// Positive `page_reference` of the selected subtopic, if any.
  pub page_intent: Option<u32>,
}

pub fn derive(dataset: Option<&Dataset>, subtopic_id: Option<&str>, policy: ContentPolicy) -> Derived {
  let (Some(data), Some(id)) = (dataset, subtopic_id) else {
    return Derived::default();
  };
  Derived {
    explanation: data.subtopic_explanation(id, policy).map(str::to_string),
    questions: data.subtopic_questions(id, policy).into_iter().cloned().collect(),
    page_intent: data
      .find_subtopic_by_id(id)
      .map(|(_, s)| s.page_reference)
      .filter(|p| *p > 0),
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
  pub subtopic_id: Option<String>,
  pub pdf_page: u32,
}

impl Default for Selection {
  fn default() -> Self {
    Self { subtopic_id: None, pdf_page: DEFAULT_PDF_PAGE }
  }
}

impl Selection {
  /// Selection right after a dataset arrives: first subtopic of the first topic.
  /// The PDF page is left where it was.
  pub fn initialize(&mut self, dataset: Option<&Dataset>) {
    self.subtopic_id = dataset.and_then(Dataset::first_subtopic).map(|s| s.id.clone());
  }

  /// Set the selection unconditionally and return the derived view data.
  /// Unknown ids are accepted and simply derive to empty content.
  pub fn select_subtopic(&mut self, dataset: Option<&Dataset>, id: &str, policy: ContentPolicy) -> Derived {
    self.subtopic_id = Some(id.to_string());
    let derived = derive(dataset, Some(id), policy);
    if let Some(page) = derived.page_intent {
      self.pdf_page = page;
    }
    derived
  }

  pub fn derive(&self, dataset: Option<&Dataset>, policy: ContentPolicy) -> Derived {
    derive(dataset, self.subtopic_id.as_deref(), policy)
  }
}
