use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{CoordinateError, Result};

/// Geodetic position on the WGS84 ellipsoid
///
/// Tuple and array conversions use (longitude, latitude, altitude) order,
/// which is the order telemetry logs carry them in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPoint {
    pub lon: f64, // degrees
    pub lat: f64, // degrees
    pub alt: f64, // meters, positive up
}

impl GeodeticPoint {
    pub fn new(lon: f64, lat: f64, alt: f64) -> Self {
        Self { lon, lat, alt }
    }

    /// Check that all components are finite and lat/lon are in range
    pub fn validate(&self) -> std::result::Result<(), CoordinateError> {
        check_finite("longitude", self.lon)?;
        check_finite("latitude", self.lat)?;
        check_finite("altitude", self.alt)?;

        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoordinateError::InvalidLatitude(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(CoordinateError::InvalidLongitude(self.lon));
        }

        Ok(())
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.lon, self.lat, self.alt]
    }
}

impl From<[f64; 3]> for GeodeticPoint {
    fn from([lon, lat, alt]: [f64; 3]) -> Self {
        Self::new(lon, lat, alt)
    }
}

impl From<(f64, f64, f64)> for GeodeticPoint {
    fn from((lon, lat, alt): (f64, f64, f64)) -> Self {
        Self::new(lon, lat, alt)
    }
}

/// Position in a north/east/down frame relative to some [`HomeAnchor`]
///
/// The anchor is not stored; pairing a local point with the anchor it was
/// produced from is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalPoint {
    pub north: f64, // meters
    pub east: f64,  // meters
    pub down: f64,  // meters, positive down
}

impl LocalPoint {
    pub fn new(north: f64, east: f64, down: f64) -> Self {
        Self { north, east, down }
    }

    pub fn validate(&self) -> std::result::Result<(), CoordinateError> {
        check_finite("north", self.north)?;
        check_finite("east", self.east)?;
        check_finite("down", self.down)
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.north, self.east, self.down]
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.north, self.east, self.down)
    }
}

impl From<Vector3<f64>> for LocalPoint {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<LocalPoint> for Vector3<f64> {
    fn from(p: LocalPoint) -> Self {
        p.to_vector()
    }
}

impl From<[f64; 3]> for LocalPoint {
    fn from([north, east, down]: [f64; 3]) -> Self {
        Self::new(north, east, down)
    }
}

/// Origin of a local NED frame
///
/// Only constructible from a valid [`GeodeticPoint`], so holding one means
/// the anchor has already been resolved and checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HomeAnchor(GeodeticPoint);

impl HomeAnchor {
    pub fn new(point: GeodeticPoint) -> Result<Self> {
        point.validate()?;
        Ok(Self(point))
    }

    pub fn point(&self) -> GeodeticPoint {
        self.0
    }
}

impl TryFrom<GeodeticPoint> for HomeAnchor {
    type Error = crate::error::NedError;

    fn try_from(point: GeodeticPoint) -> Result<Self> {
        Self::new(point)
    }
}

fn check_finite(field: &'static str, value: f64) -> std::result::Result<(), CoordinateError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoordinateError::NonFinite { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NedError;

    #[test]
    fn test_geodetic_array_order() {
        let p = GeodeticPoint::from([-122.0, 37.0, 15.0]);
        assert_eq!(p.lon, -122.0);
        assert_eq!(p.lat, 37.0);
        assert_eq!(p.alt, 15.0);
        assert_eq!(p.to_array(), [-122.0, 37.0, 15.0]);
    }

    #[test]
    fn test_local_vector_roundtrip() {
        let p = LocalPoint::new(1.0, -2.0, 3.0);
        let v: Vector3<f64> = p.into();
        assert_eq!(v, Vector3::new(1.0, -2.0, 3.0));
        assert_eq!(LocalPoint::from(v), p);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let err = GeodeticPoint::new(0.0, 95.0, 0.0).validate().unwrap_err();
        assert_eq!(err, CoordinateError::InvalidLatitude(95.0));

        let err = GeodeticPoint::new(-181.0, 0.0, 0.0).validate().unwrap_err();
        assert_eq!(err, CoordinateError::InvalidLongitude(-181.0));
    }

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(GeodeticPoint::new(180.0, 90.0, 0.0).validate().is_ok());
        assert!(GeodeticPoint::new(-180.0, -90.0, -430.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nan() {
        let err = GeodeticPoint::new(0.0, 0.0, f64::NAN).validate().unwrap_err();
        assert!(matches!(
            err,
            CoordinateError::NonFinite {
                field: "altitude",
                ..
            }
        ));

        let err = LocalPoint::new(0.0, f64::INFINITY, 0.0).validate().unwrap_err();
        assert!(matches!(err, CoordinateError::NonFinite { field: "east", .. }));
    }

    #[test]
    fn test_home_anchor_requires_valid_point() {
        let home = HomeAnchor::new(GeodeticPoint::new(-122.0, 37.0, 0.0)).unwrap();
        assert_eq!(home.point().lat, 37.0);

        let result = HomeAnchor::try_from(GeodeticPoint::new(-122.0, 137.0, 0.0));
        assert!(matches!(result, Err(NedError::CoordinateTransform(_))));
    }
}
