use rayon::prelude::*;

use super::types::{GeodeticPoint, HomeAnchor, LocalPoint};
use super::utm::{self, ProjectedPoint};
use crate::error::{NedError, Result};

/// Convert a geodetic position to north/east/down relative to `home`
///
/// North and east are UTM offsets from the home anchor, with `point`
/// projected in its own zone. Down is the negated altitude of `point`
/// itself, not its height relative to the anchor.
pub fn global_to_local(point: GeodeticPoint, home: &HomeAnchor) -> Result<LocalPoint> {
    FrameConverter::new(*home).to_local(point)
}

/// Convert a north/east/down position relative to `home` back to geodetic
///
/// The inverse projection always runs in the home anchor's zone.
pub fn local_to_global(point: LocalPoint, home: &HomeAnchor) -> Result<GeodeticPoint> {
    FrameConverter::new(*home).to_global(point)
}

/// Frame converter bound to one home anchor
///
/// Holds the anchor's forward projection so it is computed once per
/// batch instead of once per point. Immutable and safe to share between
/// threads.
#[derive(Debug, Clone, Copy)]
pub struct FrameConverter {
    home: HomeAnchor,
    origin: ProjectedPoint,
}

impl FrameConverter {
    pub fn new(home: HomeAnchor) -> Self {
        let anchor = home.point();
        Self {
            home,
            origin: utm::project(anchor.lat, anchor.lon),
        }
    }

    pub fn home(&self) -> &HomeAnchor {
        &self.home
    }

    pub fn to_local(&self, point: GeodeticPoint) -> Result<LocalPoint> {
        point.validate()?;

        let projected = utm::project(point.lat, point.lon);

        let local = LocalPoint::new(
            projected.northing - self.origin.northing,
            projected.easting - self.origin.easting,
            -point.alt,
        );

        if !local.north.is_finite() || !local.east.is_finite() {
            return Err(NedError::Numerical(format!(
                "projection of ({}, {}) is not finite",
                point.lon, point.lat
            )));
        }

        Ok(local)
    }

    pub fn to_global(&self, point: LocalPoint) -> Result<GeodeticPoint> {
        point.validate()?;

        let easting = self.origin.easting + point.east;
        let northing = self.origin.northing + point.north;
        let (lat, lon) = utm::unproject(easting, northing, self.origin.zone);

        if !lat.is_finite() || !lon.is_finite() {
            return Err(NedError::Numerical(format!(
                "inverse projection of ({easting}, {northing}) is not finite"
            )));
        }

        Ok(GeodeticPoint::new(lon, lat, -point.down))
    }

    /// Convert many geodetic points in parallel, preserving input order
    pub fn to_local_batch(&self, points: &[GeodeticPoint]) -> Result<Vec<LocalPoint>> {
        points.par_iter().map(|p| self.to_local(*p)).collect()
    }

    /// Convert many local points in parallel, preserving input order
    pub fn to_global_batch(&self, points: &[LocalPoint]) -> Result<Vec<GeodeticPoint>> {
        points.par_iter().map(|p| self.to_global(*p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> HomeAnchor {
        HomeAnchor::new(GeodeticPoint::new(-122.0, 37.0, 0.0)).unwrap()
    }

    fn assert_geodetic_close(a: GeodeticPoint, b: GeodeticPoint) {
        assert!((a.lon - b.lon).abs() < 1e-6, "lon {} vs {}", a.lon, b.lon);
        assert!((a.lat - b.lat).abs() < 1e-6, "lat {} vs {}", a.lat, b.lat);
        assert!((a.alt - b.alt).abs() < 1e-3, "alt {} vs {}", a.alt, b.alt);
    }

    #[test]
    fn test_point_due_north() {
        let point = GeodeticPoint::new(-122.0, 37.001, 10.0);
        let local = global_to_local(point, &home()).unwrap();

        assert!((local.north - 111.0).abs() < 1.0);
        // Grid convergence 1 degree off zone 10's central meridian
        assert!((local.east - -1.1654).abs() < 1e-3);
        assert_eq!(local.down, -10.0);
    }

    #[test]
    fn test_origin_maps_to_home() {
        let home = home();
        let global = local_to_global(LocalPoint::new(0.0, 0.0, 0.0), &home).unwrap();

        assert!((global.lon - -122.0).abs() < 1e-8);
        assert!((global.lat - 37.0).abs() < 1e-8);
        assert_eq!(global.alt, 0.0);
    }

    #[test]
    fn test_anchor_at_home() {
        let home = HomeAnchor::new(GeodeticPoint::new(151.2093, -33.8688, 25.0)).unwrap();
        let local = global_to_local(home.point(), &home).unwrap();

        assert!(local.north.abs() < f64::EPSILON);
        assert!(local.east.abs() < f64::EPSILON);
        assert_eq!(local.down, -25.0);
    }

    #[test]
    fn test_down_is_absolute_altitude() {
        // Home altitude does not enter the vertical axis
        let home = HomeAnchor::new(GeodeticPoint::new(-122.0, 37.0, 500.0)).unwrap();
        let local = global_to_local(GeodeticPoint::new(-122.0, 37.0, 520.0), &home).unwrap();
        assert_eq!(local.down, -520.0);
    }

    #[test]
    fn test_translation_consistency() {
        let home = home();
        let p1 = GeodeticPoint::new(-121.99, 37.02, 12.5);
        let p2 = GeodeticPoint::new(-121.99, 37.02, 47.25);

        let l1 = global_to_local(p1, &home).unwrap();
        let l2 = global_to_local(p2, &home).unwrap();

        assert_eq!(l1.north, l2.north);
        assert_eq!(l1.east, l2.east);
        assert!(((l1.down - l2.down) - (p2.alt - p1.alt)).abs() < 1e-12);
    }

    #[test]
    fn test_roundtrip_within_zone() {
        let home = home();
        let points = [
            GeodeticPoint::new(-122.0, 37.0, 0.0),
            GeodeticPoint::new(-122.4194, 37.7749, 16.0),
            GeodeticPoint::new(-121.8863, 37.3382, 25.0),
            GeodeticPoint::new(-123.5, 36.2, -3.5),
            GeodeticPoint::new(-120.1, 38.9, 1897.0),
        ];

        for p in points {
            let local = global_to_local(p, &home).unwrap();
            let back = local_to_global(local, &home).unwrap();
            assert_geodetic_close(p, back);
        }
    }

    #[test]
    fn test_roundtrip_southern_hemisphere() {
        let home = HomeAnchor::new(GeodeticPoint::new(151.2093, -33.8688, 50.0)).unwrap();
        let p = GeodeticPoint::new(151.25, -33.9, 120.0);

        let local = global_to_local(p, &home).unwrap();
        assert!(local.north < 0.0);
        assert!(local.east > 0.0);

        let back = local_to_global(local, &home).unwrap();
        assert_geodetic_close(p, back);
    }

    #[test]
    fn test_equator_crossing_carries_false_northing() {
        // Home in the north, point just south in its own southern zone
        let home = HomeAnchor::new(GeodeticPoint::new(3.0, 0.01, 0.0)).unwrap();
        let p = GeodeticPoint::new(3.01, -0.01, 5.0);

        let local = global_to_local(p, &home).unwrap();
        assert!(local.north > 9_000_000.0);
        assert_eq!(local.down, -5.0);
    }

    #[test]
    fn test_roundtrip_widened_svalbard_zone() {
        // Zone 31X spans 0E..9E, so points near its edge sit ~6 degrees
        // from the central meridian where the series loses precision
        let home = HomeAnchor::new(GeodeticPoint::new(8.9, 78.0, 0.0)).unwrap();
        let p = GeodeticPoint::new(8.95, 78.01, 0.0);

        let back = local_to_global(global_to_local(p, &home).unwrap(), &home).unwrap();
        assert!((back.lat - p.lat).abs() < 1e-5);
        let lon_err = (back.lon - p.lon).abs();
        assert!(lon_err > 1e-7 && lon_err < 1e-5, "lon error {lon_err}");
    }

    #[test]
    fn test_cross_zone_forward_uses_point_zone() {
        // ~1.8 km apart but on either side of the 120W zone boundary
        let home = HomeAnchor::new(GeodeticPoint::new(-120.01, 37.0, 0.0)).unwrap();
        let p = GeodeticPoint::new(-119.99, 37.0, 0.0);

        let local = global_to_local(p, &home).unwrap();
        assert!(local.east < -100_000.0);
    }

    #[test]
    fn test_call_order_independence() {
        let home = home();
        let p1 = GeodeticPoint::new(-122.01, 37.01, 3.0);
        let p2 = GeodeticPoint::new(-121.97, 36.98, 9.0);

        let a1 = global_to_local(p1, &home).unwrap();
        let a2 = global_to_local(p2, &home).unwrap();
        let b2 = global_to_local(p2, &home).unwrap();
        let b1 = global_to_local(p1, &home).unwrap();

        assert_eq!(a1, b1);
        assert_eq!(a2, b2);
    }

    #[test]
    fn test_converter_matches_free_functions() {
        let home = home();
        let converter = FrameConverter::new(home);
        let p = GeodeticPoint::new(-122.05, 37.03, 40.0);
        let l = LocalPoint::new(-250.0, 310.0, -12.0);

        assert_eq!(converter.to_local(p).unwrap(), global_to_local(p, &home).unwrap());
        assert_eq!(converter.to_global(l).unwrap(), local_to_global(l, &home).unwrap());
        assert_eq!(converter.home(), &home);
    }

    #[test]
    fn test_batch_preserves_order() {
        let converter = FrameConverter::new(home());
        let points: Vec<GeodeticPoint> = (0..200)
            .map(|i| GeodeticPoint::new(-122.0 + i as f64 * 1e-4, 37.0 + i as f64 * 1e-4, i as f64))
            .collect();

        let locals = converter.to_local_batch(&points).unwrap();
        assert_eq!(locals.len(), points.len());
        for (p, l) in points.iter().zip(&locals) {
            assert_eq!(*l, converter.to_local(*p).unwrap());
        }

        let back = converter.to_global_batch(&locals).unwrap();
        for (p, g) in points.iter().zip(back) {
            assert_geodetic_close(*p, g);
        }
    }

    #[test]
    fn test_batch_reports_invalid_point() {
        let converter = FrameConverter::new(home());
        let points = [
            GeodeticPoint::new(-122.0, 37.0, 0.0),
            GeodeticPoint::new(-122.0, 91.0, 0.0),
        ];
        let result = converter.to_local_batch(&points);
        assert!(matches!(result, Err(NedError::CoordinateTransform(_))));
    }

    #[test]
    fn test_concurrent_conversions() {
        let converter = FrameConverter::new(home());
        let p = GeodeticPoint::new(-121.9, 37.1, 30.0);
        let expected = converter.to_local(p).unwrap();

        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| converter.to_local(p).unwrap()))
                .collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_invalid_inputs_are_errors() {
        let home = home();

        let result = global_to_local(GeodeticPoint::new(-122.0, -95.0, 0.0), &home);
        assert!(matches!(result, Err(NedError::CoordinateTransform(_))));

        let result = local_to_global(LocalPoint::new(f64::NAN, 0.0, 0.0), &home);
        assert!(matches!(result, Err(NedError::CoordinateTransform(_))));
    }

    #[test]
    fn test_pole_is_not_an_error() {
        let home = home();
        assert!(global_to_local(GeodeticPoint::new(0.0, 90.0, 0.0), &home).is_ok());
    }
}
