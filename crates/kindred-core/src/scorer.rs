//! The compatibility scorer: a weighted blend of location, language, and
//! per-question answer similarity, with human-readable reasons.
//!
//! Pure over its four inputs; all storage access happens in the caller.

use crate::{
  profile::UserProfile,
  question::ResponseSet,
  similarity::{answer_similarity, distance_km},
};

/// Reasons kept per pair.
const MAX_REASONS: usize = 5;

/// Answer similarity above which a shared question earns a reason line.
const REASON_THRESHOLD: f64 = 0.7;

const LOCATION_WEIGHT: f64 = 1.0;
const LANGUAGE_WEIGHT: f64 = 0.7;

/// A compatibility verdict for one pair of users.
#[derive(Debug, Clone, PartialEq)]
pub struct Compatibility {
  /// Weighted blend in `[0, 1]`. Zero when no signal was comparable.
  pub score:   f64,
  /// At most [`MAX_REASONS`] entries, location and language first, then
  /// per-question reasons in ascending question-id order.
  pub reasons: Vec<String>,
}

/// One weighted term of the blended score.
struct Signal {
  similarity: f64,
  weight:     f64,
  reason:     Option<String>,
}

/// Score `a` against `b`.
///
/// Each comparable signal contributes `similarity * weight` to a running
/// sum that is normalised by the total weight at the end, so skipped
/// signals (no coordinates, pair too far apart, unanswered questions)
/// neither help nor hurt.
pub fn score_pair(
  a_responses: &ResponseSet,
  a_profile: &UserProfile,
  b_responses: &ResponseSet,
  b_profile: &UserProfile,
) -> Compatibility {
  let mut signals = Vec::new();
  if let Some(s) = location_signal(a_profile, b_profile) {
    signals.push(s);
  }
  if let Some(s) = language_signal(a_profile, b_profile) {
    signals.push(s);
  }
  signals.extend(answer_signals(a_responses, b_responses));

  let (sum, weight) = signals.iter().fold((0.0, 0.0), |(s, w), sig| {
    (s + sig.similarity * sig.weight, w + sig.weight)
  });

  let score = if weight == 0.0 { 0.0 } else { (sum / weight).min(1.0) };
  let reasons = signals
    .into_iter()
    .filter_map(|s| s.reason)
    .take(MAX_REASONS)
    .collect();

  Compatibility { score, reasons }
}

/// Location term: proximity relative to the stricter of the two radii.
///
/// A pair beyond the shared radius is a zero-weight skip, not a
/// disqualifier: the two can still match on language and answers alone.
fn location_signal(a: &UserProfile, b: &UserProfile) -> Option<Signal> {
  let distance = distance_km(a.location?, b.location?);
  let max_dist = a.max_distance_km.min(b.max_distance_km);
  if distance > max_dist {
    return None;
  }
  Some(Signal {
    similarity: (1.0 - distance / max_dist).max(0.0),
    weight:     LOCATION_WEIGHT,
    reason:     Some(format!("Within {distance:.1}km distance")),
  })
}

fn language_signal(a: &UserProfile, b: &UserProfile) -> Option<Signal> {
  (a.preferred_language == b.preferred_language).then(|| Signal {
    similarity: 1.0,
    weight:     LANGUAGE_WEIGHT,
    reason:     Some("Same preferred language".to_string()),
  })
}

/// One signal per question answered by both users, in ascending
/// question-id order, weighted by the requesting side's stored weight.
fn answer_signals(a: &ResponseSet, b: &ResponseSet) -> Vec<Signal> {
  a.iter()
    .filter_map(|(question_id, answer_a)| {
      let answer_b = b.get(question_id)?;
      let similarity = answer_similarity(&answer_a.value, &answer_b.value);
      let reason = (similarity > REASON_THRESHOLD)
        .then(|| format!("Similar {} preferences", answer_a.category));
      Some(Signal { similarity, weight: answer_a.weight, reason })
    })
    .collect()
}
