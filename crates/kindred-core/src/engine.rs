//! Candidate ranking and match generation.
//!
//! The engine is invoked synchronously per request; there is no background
//! scheduler. Candidates are scored one at a time on the request task (the
//! loop is read-only per candidate and could be parallelised later, but the
//! store round-trips dominate at current pool sizes).

use serde::Serialize;
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  matching::MatchCandidate,
  scorer::score_pair,
  store::MatchStore,
};

/// Minimum blended score for a candidate to be kept. Strict: a pair
/// scoring exactly the threshold is excluded.
pub const SCORE_THRESHOLD: f64 = 0.3;

/// Top slice of the ranking handed to the fairness filter.
const FAIRNESS_POOL: usize = 50;

/// At or below this many kept candidates the fairness filter is a no-op.
const FAIRNESS_MIN: usize = 10;

/// Upper bound on candidates returned from one generation call.
const FAIRNESS_TAKE: usize = 20;

/// Rank every eligible candidate for `user_id`, best first.
///
/// Returns an empty list, not an error, when the target has no stored
/// answers or no completed profile; the API surface turns that into a
/// "complete your profile first" response before persisting anything.
pub async fn rank<S: MatchStore>(
  store: &S,
  user_id: Uuid,
) -> Result<Vec<MatchCandidate>> {
  let target_responses =
    store.responses_for(user_id).await.map_err(Error::store)?;
  let target_profile =
    match store.profile(user_id).await.map_err(Error::store)? {
      Some(p) if p.completed => p,
      _ => return Ok(Vec::new()),
    };
  if target_responses.is_empty() {
    return Ok(Vec::new());
  }

  let candidate_ids = store
    .completed_profile_ids(user_id)
    .await
    .map_err(Error::store)?;

  let mut kept = Vec::new();
  for candidate_id in candidate_ids {
    let responses =
      store.responses_for(candidate_id).await.map_err(Error::store)?;
    if responses.is_empty() {
      continue;
    }
    let Some(profile) =
      store.profile(candidate_id).await.map_err(Error::store)?
    else {
      continue;
    };

    let verdict =
      score_pair(&target_responses, &target_profile, &responses, &profile);
    if verdict.score > SCORE_THRESHOLD {
      kept.push(MatchCandidate {
        user_id: candidate_id,
        score:   verdict.score,
        reasons: verdict.reasons,
      });
    }
  }

  // Stable sort keeps equal scores in candidate-id order.
  kept.sort_by(|a, b| b.score.total_cmp(&a.score));
  kept.truncate(FAIRNESS_POOL);
  Ok(diversity_sample(kept))
}

/// Down-sample a score-ordered list for variety.
///
/// Picks every `step`-th entry, deliberately discarding some of the
/// strictly highest-scored candidates in favour of spread across the score
/// range. Selection preserves relative order, so the result is still a
/// score-ordered subsequence.
fn diversity_sample(candidates: Vec<MatchCandidate>) -> Vec<MatchCandidate> {
  if candidates.len() <= FAIRNESS_MIN {
    return candidates;
  }
  let step = (candidates.len() / FAIRNESS_TAKE).max(1);
  candidates.into_iter().step_by(step).take(FAIRNESS_TAKE).collect()
}

/// Outcome of one generation call: the ranked candidates as they were
/// scored, before persistence.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedMatches {
  pub matches_count: usize,
  pub matches:       Vec<MatchCandidate>,
}

/// Generate and persist matches for `user_id`.
///
/// The whole batch is written in one store transaction: a persistence
/// failure leaves no partial set of this call's matches behind. Re-running
/// is safe; existing records keep their status and creation time.
pub async fn generate_matches<S: MatchStore>(
  store: &S,
  user_id: Uuid,
) -> Result<GeneratedMatches> {
  match store.profile(user_id).await.map_err(Error::store)? {
    Some(p) if p.completed => {}
    _ => return Err(Error::ProfileIncomplete(user_id)),
  }

  let matches = rank(store, user_id).await?;
  store
    .record_matches(user_id, &matches)
    .await
    .map_err(Error::store)?;

  Ok(GeneratedMatches { matches_count: matches.len(), matches })
}
