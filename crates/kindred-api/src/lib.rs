//! JSON REST API for Kindred.
//!
//! Exposes an axum [`Router`] backed by any [`kindred_core::store::MatchStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", kindred_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod matching;
pub mod onboarding;
pub mod profiles;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use kindred_core::store::MatchStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: MatchStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Onboarding
    .route("/questions", get(onboarding::list_questions::<S>))
    .route("/users/{id}/onboarding", post(onboarding::submit::<S>))
    .route("/users/{id}/profile", get(profiles::get_one::<S>))
    // Matching
    .route(
      "/users/{id}/matches",
      post(matching::generate::<S>).get(matching::list::<S>),
    )
    .route("/matches/{a}/{b}/status", put(matching::set_status::<S>))
    .with_state(store)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use kindred_core::{
    question::{NewQuestion, QuestionKind},
    store::MatchStore as _,
  };
  use kindred_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn setup() -> (Arc<SqliteStore>, Router) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let router = api_router(store.clone());
    (store, router)
  }

  async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        builder.body(Body::from(json.to_string())).unwrap()
      }
      None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn seed_question(store: &SqliteStore, category: &str) -> Uuid {
    store
      .add_question(NewQuestion {
        category:  category.to_string(),
        prompt_en: format!("Tell us about your {category} preferences"),
        prompt_es: Some(format!("Cuéntanos sobre tus preferencias de {category}")),
        kind:      QuestionKind::MultiSelect,
        options:   Vec::new(),
        weight:    1.0,
        required:  true,
      })
      .await
      .unwrap()
      .question_id
  }

  fn onboarding_body(
    question_id: Uuid,
    value: &str,
    name: &str,
    lat: f64,
    lng: f64,
  ) -> Value {
    json!({
      "responses": [{ "question_id": question_id, "value": value }],
      "profile": {
        "display_name": name,
        "location_lat": lat,
        "location_lng": lng,
        "max_distance_km": 50.0,
        "preferred_language": "en",
      },
    })
  }

  // ── Questions ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn questions_localize_with_english_fallback() {
    let (store, router) = setup().await;
    seed_question(&store, "dining").await;

    let (status, body) = send(&router, "GET", "/questions?lang=es", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "es");
    assert_eq!(body["total_count"], 1);
    assert!(
      body["questions"][0]["prompt"]
        .as_str()
        .unwrap()
        .starts_with("Cuéntanos"),
      "body: {body}"
    );

    // Unsupported language falls back to English.
    let (_, body) = send(&router, "GET", "/questions?lang=de", None).await;
    assert_eq!(body["language"], "en");
    assert!(
      body["questions"][0]["prompt"]
        .as_str()
        .unwrap()
        .starts_with("Tell us"),
    );
  }

  // ── Onboarding ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn onboarding_creates_profile() {
    let (store, router) = setup().await;
    let q = seed_question(&store, "interests").await;
    let user = Uuid::new_v4();

    let (status, body) = send(
      &router,
      "POST",
      &format!("/users/{user}/onboarding"),
      Some(onboarding_body(q, "Hiking", "Alice", 37.7749, -122.4194)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["responses_count"], 1);
    assert_eq!(body["profile"]["completed"], true);

    let (status, body) =
      send(&router, "GET", &format!("/users/{user}/profile"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_name"], "Alice");
  }

  #[tokio::test]
  async fn onboarding_with_unknown_question_is_rejected() {
    let (_store, router) = setup().await;
    let user = Uuid::new_v4();

    let (status, body) = send(
      &router,
      "POST",
      &format!("/users/{user}/onboarding"),
      Some(json!({
        "responses": [{ "question_id": Uuid::new_v4(), "value": "x" }],
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
      body["error"].as_str().unwrap().contains("unknown question"),
      "body: {body}"
    );
  }

  #[tokio::test]
  async fn onboarding_with_invalid_coordinates_is_rejected() {
    let (_store, router) = setup().await;
    let user = Uuid::new_v4();

    let (status, _body) = send(
      &router,
      "POST",
      &format!("/users/{user}/onboarding"),
      Some(json!({
        "responses": [],
        "profile": { "location_lat": 123.0, "location_lng": 0.0 },
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn missing_profile_is_404() {
    let (_store, router) = setup().await;
    let (status, _) = send(
      &router,
      "GET",
      &format!("/users/{}/profile", Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Matching ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn generate_requires_completed_profile() {
    let (_store, router) = setup().await;
    let (status, body) = send(
      &router,
      "POST",
      &format!("/users/{}/matches", Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
      body["error"].as_str().unwrap().contains("incomplete"),
      "body: {body}"
    );
  }

  #[tokio::test]
  async fn generate_and_list_round_trip() {
    let (store, router) = setup().await;
    let q = seed_question(&store, "interests").await;
    let x = Uuid::new_v4();
    let y = Uuid::new_v4();

    send(
      &router,
      "POST",
      &format!("/users/{x}/onboarding"),
      Some(onboarding_body(q, "Hiking", "X", 37.7749, -122.4194)),
    )
    .await;
    send(
      &router,
      "POST",
      &format!("/users/{y}/onboarding"),
      Some(onboarding_body(q, "Hiking", "Y", 37.7849, -122.4094)),
    )
    .await;

    let (status, body) =
      send(&router, "POST", &format!("/users/{x}/matches"), None).await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["matches_count"], 1);
    assert_eq!(body["matches"][0]["user_id"], y.to_string());
    assert!(body["matches"][0]["score"].as_f64().unwrap() >= 0.9);

    let (status, body) =
      send(&router, "GET", &format!("/users/{x}/matches"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_more"], false);
    assert_eq!(body["matches"][0]["matched_user"]["display_name"], "Y");
    assert_eq!(body["matches"][0]["status"], "pending");
  }

  #[tokio::test]
  async fn status_update_hides_blocked_matches() {
    let (store, router) = setup().await;
    let q = seed_question(&store, "interests").await;
    let x = Uuid::new_v4();
    let y = Uuid::new_v4();

    send(
      &router,
      "POST",
      &format!("/users/{x}/onboarding"),
      Some(onboarding_body(q, "Hiking", "X", 37.7749, -122.4194)),
    )
    .await;
    send(
      &router,
      "POST",
      &format!("/users/{y}/onboarding"),
      Some(onboarding_body(q, "Hiking", "Y", 37.7849, -122.4094)),
    )
    .await;
    send(&router, "POST", &format!("/users/{x}/matches"), None).await;

    let (status, body) = send(
      &router,
      "PUT",
      &format!("/matches/{x}/{y}/status"),
      Some(json!({ "status": "blocked" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["status"], "blocked");

    let (_, body) =
      send(&router, "GET", &format!("/users/{x}/matches"), None).await;
    assert_eq!(body["matches"].as_array().unwrap().len(), 0);
  }

  #[tokio::test]
  async fn status_update_on_unknown_pair_is_404() {
    let (_store, router) = setup().await;
    let (status, _) = send(
      &router,
      "PUT",
      &format!("/matches/{}/{}/status", Uuid::new_v4(), Uuid::new_v4()),
      Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn list_respects_limit_parameter() {
    let (store, router) = setup().await;
    let q = seed_question(&store, "interests").await;
    let me = Uuid::new_v4();

    send(
      &router,
      "POST",
      &format!("/users/{me}/onboarding"),
      Some(onboarding_body(q, "Hiking", "Me", 37.7749, -122.4194)),
    )
    .await;
    for i in 0..3 {
      let other = Uuid::new_v4();
      send(
        &router,
        "POST",
        &format!("/users/{other}/onboarding"),
        Some(onboarding_body(
          q,
          "Hiking",
          &format!("Other {i}"),
          37.7849,
          -122.4094,
        )),
      )
      .await;
    }
    send(&router, "POST", &format!("/users/{me}/matches"), None).await;

    let (status, body) = send(
      &router,
      "GET",
      &format!("/users/{me}/matches?limit=2"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches"].as_array().unwrap().len(), 2);
    assert_eq!(body["has_more"], true);

    let (_, body) = send(
      &router,
      "GET",
      &format!("/users/{me}/matches?limit=2&offset=2"),
      None,
    )
    .await;
    assert_eq!(body["matches"].as_array().unwrap().len(), 1);
    assert_eq!(body["has_more"], false);
  }
}
