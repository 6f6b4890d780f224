//! Handlers for `/users/:id/profile`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use kindred_core::{profile::UserProfile, store::MatchStore};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /users/:id/profile` — 404 until onboarding has created one.
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: MatchStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let profile = store
    .profile(user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("profile for user {user_id} not found"))
    })?;
  Ok(Json(profile))
}
