//! Geographic coordinates and great-circle distance.

use serde::Serialize;

/// Mean Earth radius used by the Haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Error returned for a latitude or longitude outside its valid range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum CoordinatesError {
    #[error("latitude must be between -90 and 90 (got {0})")]
    Latitude(f64),
    #[error("longitude must be between -180 and 180 (got {0})")]
    Longitude(f64),
}

/// A validated WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Create coordinates, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatesError`] naming the offending axis.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in kilometres.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        distance_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Haversine distance between two points given in decimal degrees.
///
/// ```
/// use chequealo_core::distance_km;
///
/// let d = distance_km(18.4861, -69.9312, 18.5000, -69.9000);
/// assert!(d > 2.0 && d < 4.0);
/// ```
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        assert!(distance_km(18.4861, -69.9312, 18.4861, -69.9312).abs() < f64::EPSILON);
    }

    #[test]
    fn test_symmetric() {
        let there = distance_km(18.4861, -69.9312, 19.4517, -70.6970);
        let back = distance_km(19.4517, -70.6970, 18.4861, -69.9312);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_santo_domingo_to_santiago() {
        // Roughly 130 km as the crow flies.
        let d = distance_km(18.4861, -69.9312, 19.4517, -70.6970);
        assert!((125.0..140.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_near_me_scenario_distance() {
        let shop = Coordinates::new(18.4861, -69.9312).unwrap();
        let user = Coordinates::new(18.5000, -69.9000).unwrap();
        let d = user.distance_to(&shop);
        assert!(d > 2.0 && d < 4.0, "got {d}");
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(
            Coordinates::new(91.0, 0.0),
            Err(CoordinatesError::Latitude(91.0))
        );
        assert_eq!(
            Coordinates::new(0.0, -180.5),
            Err(CoordinatesError::Longitude(-180.5))
        );
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }
}
