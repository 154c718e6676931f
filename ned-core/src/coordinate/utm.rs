//! Universal Transverse Mercator projection on the WGS84 ellipsoid

use std::f64::consts::PI;

// WGS84 ellipsoid parameters
const WGS84_A: f64 = 6378137.0; // semi-major axis (meters)
const WGS84_E2: f64 = 0.00669437999014; // first eccentricity squared

const K0: f64 = 0.9996; // central meridian scale factor
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING: f64 = 10_000_000.0; // southern hemisphere only

// 8 degree latitude bands from -80, the last band (X) spans 12 degrees
const ZONE_LETTERS: &[u8] = b"CDEFGHJKLMNPQRSTUVWXX";

/// UTM grid zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UtmZone {
    pub number: u8,
    pub letter: char,
}

impl UtmZone {
    /// Zone that naturally contains the given position
    pub fn containing(lat: f64, lon: f64) -> Self {
        Self {
            number: zone_number(lat, lon),
            letter: zone_letter(lat),
        }
    }

    /// Longitude of the zone's central meridian in degrees
    pub fn central_meridian(&self) -> f64 {
        f64::from(self.number - 1) * 6.0 - 180.0 + 3.0
    }

    pub fn is_northern(&self) -> bool {
        self.letter >= 'N'
    }
}

/// Easting/northing within a UTM zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ProjectedPoint {
    pub easting: f64,
    pub northing: f64,
    pub zone: UtmZone,
}

fn zone_number(lat: f64, lon: f64) -> u8 {
    // 180 and -180 are the same meridian
    let lon = if lon >= 180.0 { lon - 360.0 } else { lon };

    // Southwest Norway
    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        return 32;
    }

    // Svalbard
    if (72.0..=84.0).contains(&lat) && lon >= 0.0 {
        if lon < 9.0 {
            return 31;
        } else if lon < 21.0 {
            return 33;
        } else if lon < 33.0 {
            return 35;
        } else if lon < 42.0 {
            return 37;
        }
    }

    (((lon + 180.0) / 6.0).floor() as u8 + 1).min(60)
}

fn zone_letter(lat: f64) -> char {
    // Outside [-80, 84] UTM is undefined; clamp so the hemisphere stays right
    let band = ((lat.clamp(-80.0, 84.0) + 80.0) as usize) >> 3;
    char::from(ZONE_LETTERS[band.min(ZONE_LETTERS.len() - 1)])
}

/// Wrap an angle in radians into [-pi, pi)
fn wrap_angle(value: f64) -> f64 {
    (value + PI).rem_euclid(2.0 * PI) - PI
}

/// Project a geodetic position (degrees) into its own UTM zone
pub(crate) fn project(lat: f64, lon: f64) -> ProjectedPoint {
    let zone = UtmZone::containing(lat, lon);

    let e2 = WGS84_E2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let lat_rad = lat.to_radians();
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let tan_lat = lat_rad.tan();
    let t2 = tan_lat * tan_lat;
    let t4 = t2 * t2;

    let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let c = ep2 * cos_lat * cos_lat;

    let a = cos_lat * wrap_angle(lon.to_radians() - zone.central_meridian().to_radians());
    let a2 = a * a;
    let a3 = a2 * a;
    let a4 = a3 * a;
    let a5 = a4 * a;
    let a6 = a5 * a;

    // Meridian arc length from the equator
    let m = WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * lat_rad
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * lat_rad).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * lat_rad).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * lat_rad).sin());

    let easting = K0
        * n
        * (a + a3 / 6.0 * (1.0 - t2 + c)
            + a5 / 120.0 * (5.0 - 18.0 * t2 + t4 + 72.0 * c - 58.0 * ep2))
        + FALSE_EASTING;

    let mut northing = K0
        * (m + n
            * tan_lat
            * (a2 / 2.0
                + a4 / 24.0 * (5.0 - t2 + 9.0 * c + 4.0 * c * c)
                + a6 / 720.0 * (61.0 - 58.0 * t2 + t4 + 600.0 * c - 330.0 * ep2)));

    if lat < 0.0 {
        northing += FALSE_NORTHING;
    }

    ProjectedPoint {
        easting,
        northing,
        zone,
    }
}

/// Invert a projection in the given zone, returning (lat, lon) in degrees
///
/// The zone is taken as given even when easting/northing lie outside it.
pub(crate) fn unproject(easting: f64, northing: f64, zone: UtmZone) -> (f64, f64) {
    let e2 = WGS84_E2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let x = easting - FALSE_EASTING;
    let y = if zone.is_northern() {
        northing
    } else {
        northing - FALSE_NORTHING
    };

    let m = y / K0;
    let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

    // Footpoint latitude
    let sqrt_1me2 = (1.0 - e2).sqrt();
    let e1 = (1.0 - sqrt_1me2) / (1.0 + sqrt_1me2);
    let e1_2 = e1 * e1;
    let e1_3 = e1_2 * e1;
    let e1_4 = e1_3 * e1;
    let e1_5 = e1_4 * e1;

    let phi1 = mu
        + (3.0 / 2.0 * e1 - 27.0 / 32.0 * e1_3) * (2.0 * mu).sin()
        + (21.0 / 16.0 * e1_2 - 55.0 / 32.0 * e1_4) * (4.0 * mu).sin()
        + (151.0 / 96.0 * e1_3 - 417.0 / 128.0 * e1_5) * (6.0 * mu).sin()
        + (1097.0 / 512.0 * e1_4) * (8.0 * mu).sin();

    let (sin_phi, cos_phi) = phi1.sin_cos();
    let tan_phi = phi1.tan();
    let t2 = tan_phi * tan_phi;
    let t4 = t2 * t2;

    let w = 1.0 - e2 * sin_phi * sin_phi;
    let n = WGS84_A / w.sqrt();
    let r = (1.0 - e2) / w; // meridional over prime vertical radius
    let c = ep2 * cos_phi * cos_phi;
    let c2 = c * c;

    let d = x / (n * K0);
    let d2 = d * d;
    let d3 = d2 * d;
    let d4 = d3 * d;
    let d5 = d4 * d;
    let d6 = d5 * d;

    let lat = phi1
        - (tan_phi / r)
            * (d2 / 2.0 - d4 / 24.0 * (5.0 + 3.0 * t2 + 10.0 * c - 4.0 * c2 - 9.0 * ep2)
                + d6 / 720.0 * (61.0 + 90.0 * t2 + 298.0 * c + 45.0 * t4 - 252.0 * ep2 - 3.0 * c2));

    let lon = (d - d3 / 6.0 * (1.0 + 2.0 * t2 + c)
        + d5 / 120.0 * (5.0 - 2.0 * c + 28.0 * t2 - 3.0 * c2 + 8.0 * ep2 + 24.0 * t4))
        / cos_phi;
    let lon = wrap_angle(lon + zone.central_meridian().to_radians());

    (lat.to_degrees(), lon.to_degrees())
}
