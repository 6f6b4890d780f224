//! Pairwise match records and their canonical identity.
//!
//! A match between two users is symmetric: it is stored as exactly one row
//! regardless of which side triggered generation. [`PairKey`] owns that
//! canonicalization; no other code orders a pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Pair identity ───────────────────────────────────────────────────────────

/// Canonical identity of a user pair: `low < high` under lexicographic
/// comparison of the hyphenated lowercase UUID strings, matching the
/// ordering the store's pair-key columns are compared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
  low:  Uuid,
  high: Uuid,
}

impl PairKey {
  /// The single canonicalization point for every write path.
  pub fn new(a: Uuid, b: Uuid) -> Self {
    if a.hyphenated().to_string() <= b.hyphenated().to_string() {
      Self { low: a, high: b }
    } else {
      Self { low: b, high: a }
    }
  }

  pub fn low(&self) -> Uuid { self.low }

  pub fn high(&self) -> Uuid { self.high }

  /// The side of the pair that is not `user_id`.
  pub fn counterpart(&self, user_id: Uuid) -> Uuid {
    if self.low == user_id { self.high } else { self.low }
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// User-driven lifecycle of a stored match. The engine creates records as
/// `Pending` and never mutates the status afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
  Pending,
  Accepted,
  Declined,
  Blocked,
}

// ─── Candidates and records ──────────────────────────────────────────────────

/// A scored candidate produced by the ranker. Never persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
  pub user_id: Uuid,
  pub score:   f64,
  pub reasons: Vec<String>,
}

/// A persisted pairwise match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
  pub pair:                PairKey,
  pub compatibility_score: f64,
  pub match_reasons:       Vec<String>,
  pub status:              MatchStatus,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Counterpart display attributes joined into a match listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedUser {
  pub user_id:       Uuid,
  pub display_name:  Option<String>,
  pub bio:           Option<String>,
  pub location_city: Option<String>,
}

/// One row of a paginated match listing, seen from the requesting user's
/// side of the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListedMatch {
  pub matched_user:        MatchedUser,
  pub compatibility_score: f64,
  pub match_reasons:       Vec<String>,
  pub status:              MatchStatus,
  pub created_at:          DateTime<Utc>,
}

/// A page of matches with an exact has-more flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPage {
  pub matches:  Vec<ListedMatch>,
  pub has_more: bool,
}
