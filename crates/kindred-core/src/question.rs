//! Onboarding questions and a user's stored answers.
//!
//! Questions are owned by the onboarding side; the engine only ever reads
//! the `category` and `weight` carried on each stored answer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a question is answered in the onboarding UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
  MultipleChoice,
  MultiSelect,
  Scale,
  Text,
}

/// An onboarding question with English and optional Spanish prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
  pub question_id: Uuid,
  pub category:    String,
  pub prompt_en:   String,
  pub prompt_es:   Option<String>,
  pub kind:        QuestionKind,
  pub options:     Vec<String>,
  pub weight:      f64,
  pub required:    bool,
}

impl Question {
  /// Localized prompt; anything other than `es` falls back to English.
  pub fn prompt(&self, lang: &str) -> &str {
    match lang {
      "es" => self.prompt_es.as_deref().unwrap_or(&self.prompt_en),
      _ => &self.prompt_en,
    }
  }
}

/// Input for creating a question. The id is assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
  pub category:  String,
  pub prompt_en: String,
  pub prompt_es: Option<String>,
  pub kind:      QuestionKind,
  #[serde(default)]
  pub options:   Vec<String>,
  pub weight:    f64,
  #[serde(default = "default_required")]
  pub required:  bool,
}

fn default_required() -> bool { true }

/// One stored answer, joined with its question's category and weight.
///
/// Multi-select answers are stored as a single comma-joined string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnsweredQuestion {
  pub question_id: Uuid,
  pub category:    String,
  pub weight:      f64,
  pub value:       String,
}

/// A user's answers keyed by question id.
///
/// An ordered map, so the scorer's per-question iteration (and with it the
/// order of produced match reasons) is deterministic.
pub type ResponseSet = BTreeMap<Uuid, AnsweredQuestion>;

/// A single answer submitted during onboarding.
#[derive(Debug, Clone, Deserialize)]
pub struct NewResponse {
  pub question_id: Uuid,
  pub value:       String,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn question(prompt_es: Option<&str>) -> Question {
    Question {
      question_id: Uuid::new_v4(),
      category:    "interests".into(),
      prompt_en:   "What are your main hobbies?".into(),
      prompt_es:   prompt_es.map(str::to_owned),
      kind:        QuestionKind::MultiSelect,
      options:     vec!["Cooking".into(), "Reading".into()],
      weight:      1.0,
      required:    true,
    }
  }

  #[test]
  fn prompt_prefers_spanish_when_present() {
    let q = question(Some("¿Cuáles son tus principales aficiones?"));
    assert_eq!(q.prompt("es"), "¿Cuáles son tus principales aficiones?");
    assert_eq!(q.prompt("en"), "What are your main hobbies?");
  }

  #[test]
  fn prompt_falls_back_to_english() {
    let q = question(None);
    assert_eq!(q.prompt("es"), "What are your main hobbies?");
    assert_eq!(q.prompt("fr"), "What are your main hobbies?");
  }
}
