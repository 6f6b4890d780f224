//! SQL schema for the Kindred SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated
//! on the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS questions (
    question_id TEXT PRIMARY KEY,
    category    TEXT NOT NULL,
    prompt_en   TEXT NOT NULL,
    prompt_es   TEXT,
    kind        TEXT NOT NULL,   -- 'multiple_choice' | 'multi_select' | 'scale' | 'text'
    options     TEXT NOT NULL DEFAULT '[]',   -- JSON array of option labels
    weight      REAL NOT NULL DEFAULT 1.0,
    required    INTEGER NOT NULL DEFAULT 1
);

-- One stored answer per (user, question); onboarding re-submissions
-- overwrite in place. Multi-select answers are comma-joined.
CREATE TABLE IF NOT EXISTS responses (
    user_id     TEXT NOT NULL,
    question_id TEXT NOT NULL REFERENCES questions(question_id),
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (user_id, question_id)
);

CREATE TABLE IF NOT EXISTS profiles (
    user_id            TEXT PRIMARY KEY,
    display_name       TEXT,
    bio                TEXT,
    location_city      TEXT,
    location_lat       REAL,
    location_lng       REAL,
    max_distance_km    REAL NOT NULL DEFAULT 50,
    age_range_min      INTEGER,
    age_range_max      INTEGER,
    preferred_language TEXT NOT NULL DEFAULT 'en',
    completed          INTEGER NOT NULL DEFAULT 0,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

-- One row per unordered user pair. The low/high ordering is produced by
-- PairKey on every write path and enforced here under TEXT comparison.
CREATE TABLE IF NOT EXISTS matches (
    user_id_low         TEXT NOT NULL,
    user_id_high        TEXT NOT NULL,
    compatibility_score REAL NOT NULL,
    match_reasons       TEXT NOT NULL DEFAULT '[]',
    status              TEXT NOT NULL DEFAULT 'pending',
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL,
    PRIMARY KEY (user_id_low, user_id_high),
    CHECK  (user_id_low < user_id_high)
);

CREATE INDEX IF NOT EXISTS responses_user_idx     ON responses(user_id);
CREATE INDEX IF NOT EXISTS profiles_completed_idx ON profiles(completed);
CREATE INDEX IF NOT EXISTS matches_low_idx        ON matches(user_id_low);
CREATE INDEX IF NOT EXISTS matches_high_idx       ON matches(user_id_high);

PRAGMA user_version = 1;
";
