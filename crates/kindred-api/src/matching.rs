//! Handlers for the matching endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/:id/matches` | Score, filter, and persist matches |
//! | `GET`  | `/users/:id/matches` | `?limit=` (max 50) and `?offset=` |
//! | `PUT`  | `/matches/:a/:b/status` | Body: `{"status":"accepted"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use kindred_core::{
  engine::{self, GeneratedMatches},
  matching::{MatchPage, MatchRecord, MatchStatus, PairKey},
  store::{DEFAULT_PAGE_LIMIT, MatchQuery, MatchStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Generate ────────────────────────────────────────────────────────────────

/// `POST /users/:id/matches`
pub async fn generate<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<GeneratedMatches>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let generated = engine::generate_matches(store.as_ref(), user_id).await?;
  tracing::info!(
    %user_id,
    matches_count = generated.matches_count,
    "match generation complete"
  );
  Ok(Json(generated))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PageParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /users/:id/matches[?limit=<n>&offset=<n>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<MatchPage>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = MatchQuery {
    limit:  params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
    offset: params.offset.unwrap_or(0),
  }
  .clamped();

  let page = store
    .list_matches(user_id, query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(page))
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: MatchStatus,
}

/// `PUT /matches/:a/:b/status` — the user-driven accept/decline/block
/// path. The generation engine never touches a record's status.
pub async fn set_status<S>(
  State(store): State<Arc<S>>,
  Path((user_a, user_b)): Path<(Uuid, Uuid)>,
  Json(body): Json<StatusBody>,
) -> Result<Json<MatchRecord>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let pair = PairKey::new(user_a, user_b);
  let record = store
    .set_match_status(pair, body.status)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no match between {user_a} and {user_b}"))
    })?;
  Ok(Json(record))
}
