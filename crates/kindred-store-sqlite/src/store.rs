//! [`SqliteStore`] — the SQLite implementation of [`MatchStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use kindred_core::{
  matching::{MatchCandidate, MatchPage, MatchRecord, MatchStatus, PairKey},
  profile::{ProfileUpdate, UserProfile},
  question::{
    AnsweredQuestion, NewQuestion, NewResponse, Question, ResponseSet,
  },
  store::{MatchQuery, MatchStore},
};

use crate::{
  encode::{
    RawListedMatch, RawMatchRecord, RawProfile, RawQuestion, encode_dt,
    encode_match_status, encode_question_kind, encode_string_list,
    encode_uuid,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Kindred match store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── MatchStore impl ─────────────────────────────────────────────────────────

impl MatchStore for SqliteStore {
  type Error = Error;

  // ── Questions ─────────────────────────────────────────────────────────────

  async fn add_question(&self, input: NewQuestion) -> Result<Question> {
    let question = Question {
      question_id: Uuid::new_v4(),
      category:    input.category,
      prompt_en:   input.prompt_en,
      prompt_es:   input.prompt_es,
      kind:        input.kind,
      options:     input.options,
      weight:      input.weight,
      required:    input.required,
    };

    let id_str      = encode_uuid(question.question_id);
    let category    = question.category.clone();
    let prompt_en   = question.prompt_en.clone();
    let prompt_es   = question.prompt_es.clone();
    let kind_str    = encode_question_kind(question.kind).to_owned();
    let options_str = encode_string_list(&question.options)?;
    let weight      = question.weight;
    let required    = question.required;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO questions (
             question_id, category, prompt_en, prompt_es, kind,
             options, weight, required
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            category,
            prompt_en,
            prompt_es,
            kind_str,
            options_str,
            weight,
            required,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(question)
  }

  async fn list_questions(&self) -> Result<Vec<Question>> {
    let raws: Vec<RawQuestion> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT question_id, category, prompt_en, prompt_es, kind,
                  options, weight, required
           FROM questions
           ORDER BY category, question_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawQuestion {
              question_id: row.get(0)?,
              category:    row.get(1)?,
              prompt_en:   row.get(2)?,
              prompt_es:   row.get(3)?,
              kind:        row.get(4)?,
              options:     row.get(5)?,
              weight:      row.get(6)?,
              required:    row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawQuestion::into_question).collect()
  }

  // ── Onboarding writes ─────────────────────────────────────────────────────

  async fn submit_responses(
    &self,
    user_id: Uuid,
    responses: Vec<NewResponse>,
  ) -> Result<()> {
    let user_id_str = encode_uuid(user_id);
    let now_str     = encode_dt(Utc::now());
    let rows: Vec<(String, String)> = responses
      .into_iter()
      .map(|r| (encode_uuid(r.question_id), r.value))
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO responses (user_id, question_id, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (user_id, question_id) DO UPDATE SET
               value      = excluded.value,
               updated_at = excluded.updated_at",
          )?;
          for (question_id_str, value) in &rows {
            stmt.execute(rusqlite::params![
              user_id_str,
              question_id_str,
              value,
              now_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn upsert_profile(
    &self,
    user_id: Uuid,
    update: ProfileUpdate,
  ) -> Result<UserProfile> {
    let user_id_str = encode_uuid(user_id);
    let now_str     = encode_dt(Utc::now());

    // Both degrees or neither; a lone latitude is not a location update.
    let (lat, lng) = match (update.location_lat, update.location_lng) {
      (Some(lat), Some(lng)) => (Some(lat), Some(lng)),
      _ => (None, None),
    };

    let ProfileUpdate {
      display_name,
      bio,
      location_city,
      max_distance_km,
      age_range_min,
      age_range_max,
      preferred_language,
      ..
    } = update;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO profiles (
             user_id, display_name, bio, location_city,
             location_lat, location_lng, max_distance_km,
             age_range_min, age_range_max, preferred_language,
             completed, created_at, updated_at
           ) VALUES (
             ?1, ?2, ?3, ?4, ?5, ?6, COALESCE(?7, 50),
             ?8, ?9, COALESCE(?10, 'en'), 1, ?11, ?11
           )
           ON CONFLICT (user_id) DO UPDATE SET
             display_name       = COALESCE(?2, profiles.display_name),
             bio                = COALESCE(?3, profiles.bio),
             location_city      = COALESCE(?4, profiles.location_city),
             location_lat       = COALESCE(?5, profiles.location_lat),
             location_lng       = COALESCE(?6, profiles.location_lng),
             max_distance_km    = COALESCE(?7, profiles.max_distance_km),
             age_range_min      = COALESCE(?8, profiles.age_range_min),
             age_range_max      = COALESCE(?9, profiles.age_range_max),
             preferred_language = COALESCE(?10, profiles.preferred_language),
             completed          = 1,
             updated_at         = ?11",
          rusqlite::params![
            user_id_str,
            display_name,
            bio,
            location_city,
            lat,
            lng,
            max_distance_km,
            age_range_min,
            age_range_max,
            preferred_language,
            now_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    // Read back the stored row; it must exist after the upsert.
    self.profile(user_id).await?.ok_or_else(|| {
      Error::Decode(format!("profile for {user_id} vanished after upsert"))
    })
  }

  // ── Engine reads ──────────────────────────────────────────────────────────

  async fn responses_for(&self, user_id: Uuid) -> Result<ResponseSet> {
    let user_id_str = encode_uuid(user_id);

    let rows: Vec<(String, String, f64, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT r.question_id, q.category, q.weight, r.value
           FROM responses r
           JOIN questions q ON q.question_id = r.question_id
           WHERE r.user_id = ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut responses = ResponseSet::new();
    for (question_id_str, category, weight, value) in rows {
      let question_id = crate::encode::decode_uuid(&question_id_str)?;
      responses.insert(question_id, AnsweredQuestion {
        question_id,
        category,
        weight,
        value,
      });
    }
    Ok(responses)
  }

  async fn profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
    let user_id_str = encode_uuid(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, display_name, bio, location_city,
                      location_lat, location_lng, max_distance_km,
                      age_range_min, age_range_max, preferred_language,
                      completed, created_at, updated_at
               FROM profiles WHERE user_id = ?1",
              rusqlite::params![user_id_str],
              |row| {
                Ok(RawProfile {
                  user_id:            row.get(0)?,
                  display_name:       row.get(1)?,
                  bio:                row.get(2)?,
                  location_city:      row.get(3)?,
                  location_lat:       row.get(4)?,
                  location_lng:       row.get(5)?,
                  max_distance_km:    row.get(6)?,
                  age_range_min:      row.get(7)?,
                  age_range_max:      row.get(8)?,
                  preferred_language: row.get(9)?,
                  completed:          row.get(10)?,
                  created_at:         row.get(11)?,
                  updated_at:         row.get(12)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn completed_profile_ids(&self, exclude: Uuid) -> Result<Vec<Uuid>> {
    let exclude_str = encode_uuid(exclude);

    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id FROM profiles
           WHERE completed = 1 AND user_id != ?1
           ORDER BY user_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![exclude_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| crate::encode::decode_uuid(s)).collect()
  }

  // ── Match writes ──────────────────────────────────────────────────────────

  async fn upsert_match(
    &self,
    pair: PairKey,
    score: f64,
    reasons: &[String],
  ) -> Result<()> {
    let low_str     = encode_uuid(pair.low());
    let high_str    = encode_uuid(pair.high());
    let reasons_str = encode_string_list(reasons)?;
    let now_str     = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          UPSERT_MATCH_SQL,
          rusqlite::params![low_str, high_str, score, reasons_str, now_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn record_matches(
    &self,
    user_id: Uuid,
    candidates: &[MatchCandidate],
  ) -> Result<()> {
    let now_str = encode_dt(Utc::now());
    let rows: Vec<(String, String, f64, String)> = candidates
      .iter()
      .map(|c| {
        let pair = PairKey::new(user_id, c.user_id);
        Ok((
          encode_uuid(pair.low()),
          encode_uuid(pair.high()),
          c.score,
          encode_string_list(&c.reasons)?,
        ))
      })
      .collect::<Result<_>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(UPSERT_MATCH_SQL)?;
          for (low_str, high_str, score, reasons_str) in &rows {
            stmt.execute(rusqlite::params![
              low_str,
              high_str,
              score,
              reasons_str,
              now_str,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn set_match_status(
    &self,
    pair: PairKey,
    status: MatchStatus,
  ) -> Result<Option<MatchRecord>> {
    let low_str    = encode_uuid(pair.low());
    let high_str   = encode_uuid(pair.high());
    let status_str = encode_match_status(status).to_owned();
    let now_str    = encode_dt(Utc::now());

    let updated: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE matches SET status = ?3, updated_at = ?4
           WHERE user_id_low = ?1 AND user_id_high = ?2",
          rusqlite::params![low_str, high_str, status_str, now_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Ok(None);
    }
    self.get_match(pair).await
  }

  // ── Match reads ───────────────────────────────────────────────────────────

  async fn get_match(&self, pair: PairKey) -> Result<Option<MatchRecord>> {
    let low_str  = encode_uuid(pair.low());
    let high_str = encode_uuid(pair.high());

    let raw: Option<RawMatchRecord> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id_low, user_id_high, compatibility_score,
                      match_reasons, status, created_at, updated_at
               FROM matches
               WHERE user_id_low = ?1 AND user_id_high = ?2",
              rusqlite::params![low_str, high_str],
              |row| {
                Ok(RawMatchRecord {
                  user_id_low:         row.get(0)?,
                  user_id_high:        row.get(1)?,
                  compatibility_score: row.get(2)?,
                  match_reasons:       row.get(3)?,
                  status:              row.get(4)?,
                  created_at:          row.get(5)?,
                  updated_at:          row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMatchRecord::into_record).transpose()
  }

  async fn list_matches(
    &self,
    user_id: Uuid,
    query: MatchQuery,
  ) -> Result<MatchPage> {
    let query       = query.clamped();
    let user_id_str = encode_uuid(user_id);
    // Fetch one extra row so has_more is exact at page boundaries.
    let probe_limit = (query.limit + 1) as i64;
    let offset_val  = query.offset as i64;

    let raws: Vec<RawListedMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             CASE WHEN m.user_id_low = ?1
                  THEN m.user_id_high ELSE m.user_id_low END
               AS matched_user_id,
             p.display_name, p.bio, p.location_city,
             m.compatibility_score, m.match_reasons, m.status, m.created_at
           FROM matches m
           LEFT JOIN profiles p ON p.user_id =
             CASE WHEN m.user_id_low = ?1
                  THEN m.user_id_high ELSE m.user_id_low END
           WHERE (m.user_id_low = ?1 OR m.user_id_high = ?1)
             AND m.status != 'blocked'
           ORDER BY m.compatibility_score DESC, m.created_at DESC
           LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![user_id_str, probe_limit, offset_val],
            |row| {
              Ok(RawListedMatch {
                matched_user_id:     row.get(0)?,
                display_name:        row.get(1)?,
                bio:                 row.get(2)?,
                location_city:       row.get(3)?,
                compatibility_score: row.get(4)?,
                match_reasons:       row.get(5)?,
                status:              row.get(6)?,
                created_at:          row.get(7)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let has_more = raws.len() > query.limit;
    let matches = raws
      .into_iter()
      .take(query.limit)
      .map(RawListedMatch::into_listed)
      .collect::<Result<Vec<_>>>()?;

    Ok(MatchPage { matches, has_more })
  }
}

/// Shared by the single and batch match write paths: a new row starts
/// `pending`; an existing row keeps its status and creation time.
const UPSERT_MATCH_SQL: &str =
  "INSERT INTO matches (
     user_id_low, user_id_high, compatibility_score, match_reasons,
     status, created_at, updated_at
   ) VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?5)
   ON CONFLICT (user_id_low, user_id_high) DO UPDATE SET
     compatibility_score = excluded.compatibility_score,
     match_reasons       = excluded.match_reasons,
     updated_at          = excluded.updated_at";
