//! Error types for `kindred-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// The requesting user has no profile, or has not finished onboarding.
  /// Surfaced verbatim to the caller; everything else is an internal fault.
  #[error("profile for user {0} is missing or incomplete")]
  ProfileIncomplete(Uuid),

  #[error("invalid coordinates: lat {lat}, lng {lng}")]
  InvalidCoordinate { lat: f64, lng: f64 },

  #[error("unknown question: {0}")]
  UnknownQuestion(Uuid),

  #[error("storage error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a storage-backend error.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
