//! Geographic coordinates and great-circle distance
//!
//! Distances are computed on a sphere with the IUGG mean Earth radius using
//! the haversine formula. This is accurate to well under a meter at the
//! studio scale (tens to hundreds of meters) and stays numerically stable
//! for very small separations, where the spherical law of cosines does not.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Mean Earth radius in meters (IUGG)
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_008.8;

/// A point on the Earth's surface in decimal degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a validated coordinate
    ///
    /// Latitude must lie in [-90, 90] and longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coordinate = Self { latitude, longitude };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check range and finiteness
    ///
    /// Coordinates deserialized from a media library manifest bypass
    /// [`Coordinate::new`], so callers that need the guarantee call this.
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidInput(format!(
                "latitude out of range: {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidInput(format!(
                "longitude out of range: {}",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Great-circle distance to `other` in meters
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        great_circle_distance(self, other)
    }
}

/// Haversine great-circle distance between two coordinates, in meters
///
/// Symmetric: `great_circle_distance(a, b) == great_circle_distance(b, a)`.
pub fn great_circle_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let half_dphi = (b.latitude - a.latitude).to_radians() / 2.0;
    let half_dlambda = (b.longitude - a.longitude).to_radians() / 2.0;

    let h = half_dphi.sin().powi(2) + phi1.cos() * phi2.cos() * half_dlambda.sin().powi(2);

    // Rounding can push h a hair above 1.0 for antipodal points
    2.0 * EARTH_MEAN_RADIUS_M * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STUDIO: Coordinate = Coordinate {
        latitude: 37.47567,
        longitude: -122.21316,
    };

    #[test]
    fn test_distance_to_self_is_zero() {
        assert_eq!(great_circle_distance(&STUDIO, &STUDIO), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let other = Coordinate::new(37.484778, -122.228150).unwrap();
        assert_eq!(
            great_circle_distance(&STUDIO, &other),
            great_circle_distance(&other, &STUDIO)
        );
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // One degree of arc along a meridian: R * pi / 180
        let north = Coordinate::new(STUDIO.latitude + 1.0, STUDIO.longitude).unwrap();
        let expected = EARTH_MEAN_RADIUS_M * std::f64::consts::PI / 180.0;
        let d = STUDIO.distance_to(&north);
        assert!((d - expected).abs() < 1e-6, "got {d}, expected {expected}");
    }

    #[test]
    fn test_known_city_pair() {
        // San Francisco to Los Angeles, roughly 559 km on a sphere
        let sf = Coordinate::new(37.7749, -122.4194).unwrap();
        let la = Coordinate::new(34.0522, -118.2437).unwrap();
        let d = sf.distance_to(&la);
        assert!((d - 559_000.0).abs() < 2_000.0, "got {d}");
    }

    #[test]
    fn test_longitude_scales_with_latitude() {
        // The same longitude step is shorter away from the equator
        let eq_a = Coordinate::new(0.0, 0.0).unwrap();
        let eq_b = Coordinate::new(0.0, 0.001).unwrap();
        let hi_a = Coordinate::new(60.0, 0.0).unwrap();
        let hi_b = Coordinate::new(60.0, 0.001).unwrap();
        let ratio = hi_a.distance_to(&hi_b) / eq_a.distance_to(&eq_b);
        assert!((ratio - 0.5).abs() < 1e-3, "ratio {ratio}");
    }

    #[test]
    fn test_antipodal_points_do_not_nan() {
        let a = Coordinate::new(0.0, 0.0).unwrap();
        let b = Coordinate::new(0.0, 180.0).unwrap();
        let d = a.distance_to(&b);
        assert!(d.is_finite());
        assert!((d - EARTH_MEAN_RADIUS_M * std::f64::consts::PI).abs() < 1e-3);
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(-91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, 180.1).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(90.0, -180.0).is_ok());
    }
}
