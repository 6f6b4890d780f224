//! Pure similarity metrics: great-circle distance and answer-value
//! similarity. No dependencies beyond the coordinate type.

use std::collections::BTreeSet;

use crate::profile::Coordinates;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed span of numeric answers (a 1-5 ordinal scale). Values are not
/// range-checked.
const SCALE_SPAN: f64 = 5.0;

/// Great-circle distance between two points in kilometers (haversine).
///
/// Inputs are degrees. Missing coordinates are unrepresentable here;
/// callers guard with `Option<Coordinates>` on the profile.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
  let lat1 = a.lat.to_radians();
  let lat2 = b.lat.to_radians();
  let dlat = (b.lat - a.lat).to_radians();
  let dlng = (b.lng - a.lng).to_radians();

  let h = (dlat / 2.0).sin().powi(2)
    + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
  2.0 * h.sqrt().asin() * EARTH_RADIUS_KM
}

/// Similarity in `[0, 1]` between two stored answer values.
///
/// A cascade of increasingly weak signals; a later rule only fires when the
/// earlier ones are structurally inapplicable, not merely false:
///
/// 1. exact string equality
/// 2. comma-separated multi-select on either side: Jaccard over the sets
/// 3. both numeric: linear falloff over the ordinal scale
/// 4. case-insensitive substring either way: 0.5
/// 5. otherwise 0.1, residual uncertainty rather than certain mismatch
pub fn answer_similarity(a: &str, b: &str) -> f64 {
  if a == b {
    return 1.0;
  }

  let set_a: BTreeSet<&str> = a.split(',').map(str::trim).collect();
  let set_b: BTreeSet<&str> = b.split(',').map(str::trim).collect();
  if set_a.len() > 1 || set_b.len() > 1 {
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    return if union == 0 {
      0.0
    } else {
      intersection as f64 / union as f64
    };
  }

  if let (Ok(n1), Ok(n2)) = (a.trim().parse::<f64>(), b.trim().parse::<f64>())
  {
    return (1.0 - (n1 - n2).abs() / SCALE_SPAN).max(0.0);
  }

  let (la, lb) = (a.to_lowercase(), b.to_lowercase());
  if la.contains(&lb) || lb.contains(&la) {
    return 0.5;
  }

  0.1
}

#[cfg(test)]
mod tests {
  use super::*;

  fn coords(lat: f64, lng: f64) -> Coordinates {
    Coordinates::new(lat, lng).unwrap()
  }

  // ── distance_km ───────────────────────────────────────────────────────────

  #[test]
  fn distance_to_self_is_zero() {
    let p = coords(37.7749, -122.4194);
    assert_eq!(distance_km(p, p), 0.0);
  }

  #[test]
  fn distance_is_symmetric() {
    let a = coords(37.7749, -122.4194);
    let b = coords(34.0522, -118.2437);
    assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
  }

  #[test]
  fn distance_sf_to_la_is_roughly_560km() {
    let sf = coords(37.7749, -122.4194);
    let la = coords(34.0522, -118.2437);
    let d = distance_km(sf, la);
    assert!((550.0..570.0).contains(&d), "got {d}");
  }

  // ── answer_similarity ─────────────────────────────────────────────────────

  #[test]
  fn identical_answers_score_one() {
    assert_eq!(answer_similarity("Hiking", "Hiking"), 1.0);
    assert_eq!(answer_similarity("Cooking,Reading", "Cooking,Reading"), 1.0);
  }

  #[test]
  fn similarity_is_symmetric() {
    let pairs = [
      ("Cooking,Reading", "Reading,Music"),
      ("3", "5"),
      ("vegetarian", "Vegetarian food"),
      ("jazz", "metal"),
    ];
    for (a, b) in pairs {
      assert_eq!(answer_similarity(a, b), answer_similarity(b, a), "{a} vs {b}");
    }
  }

  #[test]
  fn multi_select_uses_jaccard() {
    // Intersection {Reading}, union {Cooking, Reading, Music}.
    let s = answer_similarity("Cooking,Reading", "Reading,Music");
    assert!((s - 1.0 / 3.0).abs() < 1e-9, "got {s}");
  }

  #[test]
  fn multi_select_tolerates_whitespace() {
    assert_eq!(answer_similarity("Cooking, Reading", "Reading,Cooking"), 1.0);
  }

  #[test]
  fn multi_select_fires_when_either_side_has_multiple() {
    // "Reading" alone is a one-element set; the other side forces Jaccard.
    let s = answer_similarity("Cooking,Reading", "Reading");
    assert!((s - 0.5).abs() < 1e-9, "got {s}");
  }

  #[test]
  fn numeric_answers_fall_off_linearly() {
    let s = answer_similarity("3", "5");
    assert!((s - 0.6).abs() < 1e-9, "got {s}");
    let s = answer_similarity("1", "5");
    assert!((s - 0.2).abs() < 1e-9, "got {s}");
  }

  #[test]
  fn numeric_difference_beyond_scale_floors_at_zero() {
    assert_eq!(answer_similarity("1", "9"), 0.0);
  }

  #[test]
  fn substring_match_scores_half() {
    assert_eq!(answer_similarity("vegetarian", "Vegetarian food"), 0.5);
  }

  #[test]
  fn unrelated_answers_keep_residual_similarity() {
    // Never exactly zero: acknowledges uncertainty, not certain mismatch.
    assert_eq!(answer_similarity("jazz", "metal"), 0.1);
  }

  #[test]
  fn numeric_rule_only_fires_for_single_values() {
    // "1,2" is multi-select, so Jaccard applies before numeric parsing.
    let s = answer_similarity("1,2", "2,3");
    assert!((s - 1.0 / 3.0).abs() < 1e-9, "got {s}");
  }
}
