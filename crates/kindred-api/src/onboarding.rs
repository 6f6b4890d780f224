//! Handlers for the onboarding endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/questions` | Optional `?lang=en\|es`, falls back to `en` |
//! | `POST` | `/users/:id/onboarding` | Body: `{"responses":[...],"profile":{...}}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use kindred_core::{
  onboarding::submit_onboarding,
  profile::{ProfileUpdate, UserProfile},
  question::{NewResponse, Question, QuestionKind},
  store::MatchStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Questions ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct QuestionParams {
  pub lang: Option<String>,
}

/// A question with its prompt resolved to the requested language.
#[derive(Debug, Serialize)]
pub struct QuestionView {
  pub question_id: Uuid,
  pub category:    String,
  pub prompt:      String,
  pub kind:        QuestionKind,
  pub options:     Vec<String>,
  pub weight:      f64,
  pub required:    bool,
}

impl QuestionView {
  fn localized(question: Question, lang: &str) -> Self {
    let prompt = question.prompt(lang).to_string();
    Self {
      question_id: question.question_id,
      category:    question.category,
      prompt,
      kind:        question.kind,
      options:     question.options,
      weight:      question.weight,
      required:    question.required,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
  pub questions:   Vec<QuestionView>,
  pub total_count: usize,
  pub language:    String,
}

/// `GET /questions[?lang=<lang>]`
pub async fn list_questions<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<QuestionParams>,
) -> Result<Json<QuestionsResponse>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // Unsupported languages fall back to English rather than erroring.
  let lang = match params.lang.as_deref() {
    Some("es") => "es",
    _ => "en",
  };

  let questions: Vec<QuestionView> = store
    .list_questions()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .into_iter()
    .map(|q| QuestionView::localized(q, lang))
    .collect();

  Ok(Json(QuestionsResponse {
    total_count: questions.len(),
    language: lang.to_string(),
    questions,
  }))
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OnboardingBody {
  pub responses: Vec<NewResponse>,
  /// Optional profile attributes; submitting marks the profile complete
  /// either way.
  #[serde(default)]
  pub profile:   ProfileUpdate,
}

#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
  pub responses_count: usize,
  pub profile:         UserProfile,
}

/// `POST /users/:id/onboarding`
pub async fn submit<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
  Json(body): Json<OnboardingBody>,
) -> Result<Json<OnboardingResponse>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let responses_count = body.responses.len();
  let profile =
    submit_onboarding(store.as_ref(), user_id, body.responses, body.profile)
      .await?;

  tracing::debug!(%user_id, responses_count, "onboarding submission stored");
  Ok(Json(OnboardingResponse { responses_count, profile }))
}
