//! Onboarding submission: validated writes of answers and profile.
//!
//! Validation lives here rather than in the store so every backend gets
//! the same rules and the API surface can map failures to client errors.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::{
  error::{Error, Result},
  profile::{ProfileUpdate, UserProfile},
  question::NewResponse,
  store::MatchStore,
};

/// Persist a user's onboarding submission.
///
/// Every response must reference a known question; coordinates, if given,
/// must be valid degrees. Responses upsert on (user, question), the
/// profile upserts field-wise, and the profile is marked completed.
pub async fn submit_onboarding<S: MatchStore>(
  store: &S,
  user_id: Uuid,
  responses: Vec<NewResponse>,
  profile: ProfileUpdate,
) -> Result<UserProfile> {
  // Fail before any write.
  profile.location()?;

  let known: BTreeSet<Uuid> = store
    .list_questions()
    .await
    .map_err(Error::store)?
    .into_iter()
    .map(|q| q.question_id)
    .collect();
  for response in &responses {
    if !known.contains(&response.question_id) {
      return Err(Error::UnknownQuestion(response.question_id));
    }
  }

  store
    .submit_responses(user_id, responses)
    .await
    .map_err(Error::store)?;
  store
    .upsert_profile(user_id, profile)
    .await
    .map_err(Error::store)
}
