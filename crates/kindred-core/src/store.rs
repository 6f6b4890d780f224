//! The `MatchStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `kindred-store-sqlite`). The engine and the API surface depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  matching::{MatchCandidate, MatchPage, MatchRecord, MatchStatus, PairKey},
  profile::{ProfileUpdate, UserProfile},
  question::{NewQuestion, NewResponse, Question, ResponseSet},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Default page size for [`MatchStore::list_matches`].
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Hard ceiling on the page size.
pub const MAX_PAGE_LIMIT: usize = 50;

/// Pagination parameters for [`MatchStore::list_matches`].
#[derive(Debug, Clone, Copy)]
pub struct MatchQuery {
  pub limit:  usize,
  pub offset: usize,
}

impl Default for MatchQuery {
  fn default() -> Self {
    Self { limit: DEFAULT_PAGE_LIMIT, offset: 0 }
  }
}

impl MatchQuery {
  /// Clamp the limit to [`MAX_PAGE_LIMIT`].
  pub fn clamped(self) -> Self {
    Self { limit: self.limit.min(MAX_PAGE_LIMIT), offset: self.offset }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Kindred storage backend.
///
/// Questions, responses, and profiles are owned by the onboarding side;
/// the engine reads them and exclusively owns the score/reasons/timestamp
/// write path of match records. A record's `status` is only ever written
/// through [`MatchStore::set_match_status`].
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait MatchStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Questions ─────────────────────────────────────────────────────────

  /// Create and persist a new onboarding question.
  fn add_question(
    &self,
    input: NewQuestion,
  ) -> impl Future<Output = Result<Question, Self::Error>> + Send + '_;

  /// List all questions, ordered by category then question id.
  fn list_questions(
    &self,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;

  // ── Onboarding writes ─────────────────────────────────────────────────

  /// Upsert each response on its (user, question) pair. All writes of one
  /// submission happen in a single transaction.
  fn submit_responses(
    &self,
    user_id: Uuid,
    responses: Vec<NewResponse>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Field-wise profile upsert: absent fields keep their stored values.
  /// Marks the profile completed and returns the stored row.
  fn upsert_profile(
    &self,
    user_id: Uuid,
    update: ProfileUpdate,
  ) -> impl Future<Output = Result<UserProfile, Self::Error>> + Send + '_;

  // ── Engine reads ──────────────────────────────────────────────────────

  /// A user's answers with question category and weight joined in.
  /// Empty map if the user has answered nothing.
  fn responses_for(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<ResponseSet, Self::Error>> + Send + '_;

  /// A user's profile, or `None` if onboarding never created one.
  fn profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  /// Every user with a completed profile except `exclude`, in stable
  /// (ascending id) order.
  fn completed_profile_ids(
    &self,
    exclude: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  // ── Match writes ──────────────────────────────────────────────────────

  /// Idempotent insert-or-update of one pair's record: a new row starts
  /// `pending`; an existing row only refreshes score, reasons, and
  /// `updated_at`, leaving `status` and `created_at` untouched.
  fn upsert_match<'a>(
    &'a self,
    pair: PairKey,
    score: f64,
    reasons: &'a [String],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Upsert one generation call's whole batch in a single transaction.
  fn record_matches<'a>(
    &'a self,
    user_id: Uuid,
    candidates: &'a [MatchCandidate],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Set a record's user-driven status. Returns the updated record, or
  /// `None` if the pair has no record.
  fn set_match_status(
    &self,
    pair: PairKey,
    status: MatchStatus,
  ) -> impl Future<Output = Result<Option<MatchRecord>, Self::Error>> + Send + '_;

  // ── Match reads ───────────────────────────────────────────────────────

  /// Fetch one pair's record, if any.
  fn get_match(
    &self,
    pair: PairKey,
  ) -> impl Future<Output = Result<Option<MatchRecord>, Self::Error>> + Send + '_;

  /// Paginate the matches involving `user_id`, excluding blocked pairs,
  /// ordered by score descending then creation time descending, with the
  /// counterpart's display profile joined in. `has_more` is exact.
  fn list_matches(
    &self,
    user_id: Uuid,
    query: MatchQuery,
  ) -> impl Future<Output = Result<MatchPage, Self::Error>> + Send + '_;
}
