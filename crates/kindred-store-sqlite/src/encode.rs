//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. List-shaped fields
//! (question options, match reasons) are stored as compact JSON. UUIDs are
//! stored as hyphenated lowercase strings, which also makes the matches
//! table's `user_id_low < user_id_high` CHECK agree with [`PairKey`]'s
//! lexicographic ordering.

use chrono::{DateTime, Utc};
use kindred_core::{
  matching::{ListedMatch, MatchRecord, MatchStatus, MatchedUser, PairKey},
  profile::{Coordinates, DEFAULT_MAX_DISTANCE_KM, UserProfile},
  question::{Question, QuestionKind},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── MatchStatus ─────────────────────────────────────────────────────────────

pub fn encode_match_status(s: MatchStatus) -> &'static str {
  match s {
    MatchStatus::Pending => "pending",
    MatchStatus::Accepted => "accepted",
    MatchStatus::Declined => "declined",
    MatchStatus::Blocked => "blocked",
  }
}

pub fn decode_match_status(s: &str) -> Result<MatchStatus> {
  match s {
    "pending" => Ok(MatchStatus::Pending),
    "accepted" => Ok(MatchStatus::Accepted),
    "declined" => Ok(MatchStatus::Declined),
    "blocked" => Ok(MatchStatus::Blocked),
    other => Err(Error::Decode(format!("unknown match status: {other:?}"))),
  }
}

// ─── QuestionKind ────────────────────────────────────────────────────────────

pub fn encode_question_kind(k: QuestionKind) -> &'static str {
  match k {
    QuestionKind::MultipleChoice => "multiple_choice",
    QuestionKind::MultiSelect => "multi_select",
    QuestionKind::Scale => "scale",
    QuestionKind::Text => "text",
  }
}

pub fn decode_question_kind(s: &str) -> Result<QuestionKind> {
  match s {
    "multiple_choice" => Ok(QuestionKind::MultipleChoice),
    "multi_select" => Ok(QuestionKind::MultiSelect),
    "scale" => Ok(QuestionKind::Scale),
    "text" => Ok(QuestionKind::Text),
    other => Err(Error::Decode(format!("unknown question kind: {other:?}"))),
  }
}

// ─── String lists ────────────────────────────────────────────────────────────

pub fn encode_string_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_string_list(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `questions` row.
pub struct RawQuestion {
  pub question_id: String,
  pub category:    String,
  pub prompt_en:   String,
  pub prompt_es:   Option<String>,
  pub kind:        String,
  pub options:     String,
  pub weight:      f64,
  pub required:    bool,
}

impl RawQuestion {
  pub fn into_question(self) -> Result<Question> {
    Ok(Question {
      question_id: decode_uuid(&self.question_id)?,
      category:    self.category,
      prompt_en:   self.prompt_en,
      prompt_es:   self.prompt_es,
      kind:        decode_question_kind(&self.kind)?,
      options:     decode_string_list(&self.options)?,
      weight:      self.weight,
      required:    self.required,
    })
  }
}

/// Raw values read directly from a `profiles` row.
pub struct RawProfile {
  pub user_id:            String,
  pub display_name:       Option<String>,
  pub bio:                Option<String>,
  pub location_city:      Option<String>,
  pub location_lat:       Option<f64>,
  pub location_lng:       Option<f64>,
  pub max_distance_km:    f64,
  pub age_range_min:      Option<i64>,
  pub age_range_max:      Option<i64>,
  pub preferred_language: String,
  pub completed:          bool,
  pub created_at:         String,
  pub updated_at:         String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<UserProfile> {
    // Stored degrees that fail validation degrade to "no location" so one
    // bad row cannot fail matching for the whole pool.
    let location = match (self.location_lat, self.location_lng) {
      (Some(lat), Some(lng)) => Coordinates::new(lat, lng).ok(),
      _ => None,
    };

    // A zero or negative radius falls back to the default.
    let max_distance_km = if self.max_distance_km > 0.0 {
      self.max_distance_km
    } else {
      DEFAULT_MAX_DISTANCE_KM
    };

    Ok(UserProfile {
      user_id: decode_uuid(&self.user_id)?,
      display_name: self.display_name,
      bio: self.bio,
      location_city: self.location_city,
      location,
      max_distance_km,
      age_range_min: self.age_range_min,
      age_range_max: self.age_range_max,
      preferred_language: self.preferred_language,
      completed: self.completed,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `matches` row.
pub struct RawMatchRecord {
  pub user_id_low:         String,
  pub user_id_high:        String,
  pub compatibility_score: f64,
  pub match_reasons:       String,
  pub status:              String,
  pub created_at:          String,
  pub updated_at:          String,
}

impl RawMatchRecord {
  pub fn into_record(self) -> Result<MatchRecord> {
    Ok(MatchRecord {
      pair:                PairKey::new(
        decode_uuid(&self.user_id_low)?,
        decode_uuid(&self.user_id_high)?,
      ),
      compatibility_score: self.compatibility_score,
      match_reasons:       decode_string_list(&self.match_reasons)?,
      status:              decode_match_status(&self.status)?,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
    })
  }
}

/// One row of the match-listing join: the record plus the counterpart's
/// display columns.
pub struct RawListedMatch {
  pub matched_user_id:     String,
  pub display_name:        Option<String>,
  pub bio:                 Option<String>,
  pub location_city:       Option<String>,
  pub compatibility_score: f64,
  pub match_reasons:       String,
  pub status:              String,
  pub created_at:          String,
}

impl RawListedMatch {
  pub fn into_listed(self) -> Result<ListedMatch> {
    Ok(ListedMatch {
      matched_user:        MatchedUser {
        user_id:       decode_uuid(&self.matched_user_id)?,
        display_name:  self.display_name,
        bio:           self.bio,
        location_city: self.location_city,
      },
      compatibility_score: self.compatibility_score,
      match_reasons:       decode_string_list(&self.match_reasons)?,
      status:              decode_match_status(&self.status)?,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}
