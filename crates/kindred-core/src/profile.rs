//! User profiles and validated geographic coordinates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Matching radius applied when a profile does not set one.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;

/// A pair of WGS-84 degrees, validated on construction.
///
/// Out-of-range or non-finite degrees never reach the distance metric; a
/// profile carrying them simply has no location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub lat: f64,
  pub lng: f64,
}

impl Coordinates {
  pub fn new(lat: f64, lng: f64) -> Result<Self> {
    let valid = lat.is_finite()
      && lng.is_finite()
      && (-90.0..=90.0).contains(&lat)
      && (-180.0..=180.0).contains(&lng);
    if !valid {
      return Err(Error::InvalidCoordinate { lat, lng });
    }
    Ok(Self { lat, lng })
  }
}

/// A user's matching profile.
///
/// Must exist and be `completed` before the user can be scored or matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id:            Uuid,
  pub display_name:       Option<String>,
  pub bio:                Option<String>,
  pub location_city:      Option<String>,
  pub location:           Option<Coordinates>,
  pub max_distance_km:    f64,
  pub age_range_min:      Option<i64>,
  pub age_range_max:      Option<i64>,
  pub preferred_language: String,
  pub completed:          bool,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

/// Partial profile update submitted during onboarding.
///
/// `None` fields keep their stored values; submitting any update marks the
/// profile as completed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
  pub display_name:       Option<String>,
  pub bio:                Option<String>,
  pub location_city:      Option<String>,
  pub location_lat:       Option<f64>,
  pub location_lng:       Option<f64>,
  pub max_distance_km:    Option<f64>,
  pub age_range_min:      Option<i64>,
  pub age_range_max:      Option<i64>,
  pub preferred_language: Option<String>,
}

impl ProfileUpdate {
  /// Validate the submitted coordinates, if any.
  ///
  /// Both degrees must be provided together; a lone latitude or longitude
  /// is treated as no location update at all.
  pub fn location(&self) -> Result<Option<Coordinates>> {
    match (self.location_lat, self.location_lng) {
      (Some(lat), Some(lng)) => Coordinates::new(lat, lng).map(Some),
      _ => Ok(None),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn coordinates_accept_valid_degrees() {
    assert!(Coordinates::new(37.7749, -122.4194).is_ok());
    assert!(Coordinates::new(-90.0, 180.0).is_ok());
  }

  #[test]
  fn coordinates_reject_out_of_range_or_non_finite() {
    assert!(Coordinates::new(91.0, 0.0).is_err());
    assert!(Coordinates::new(0.0, -180.1).is_err());
    assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    assert!(Coordinates::new(0.0, f64::INFINITY).is_err());
  }

  #[test]
  fn update_location_requires_both_degrees() {
    let update = ProfileUpdate {
      location_lat: Some(37.0),
      ..Default::default()
    };
    assert!(update.location().unwrap().is_none());

    let update = ProfileUpdate {
      location_lat: Some(37.0),
      location_lng: Some(-122.0),
      ..Default::default()
    };
    assert!(update.location().unwrap().is_some());
  }
}
