use thiserror::Error;

/// Errors surfaced by the frame converter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NedError {
    #[error("Coordinate transform error: {0}")]
    CoordinateTransform(#[from] CoordinateError),

    #[error("Numerical error: {0}")]
    Numerical(String),
}

/// Precondition violations on caller-supplied coordinates
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinateError {
    #[error("Invalid latitude: {0} (must be -90 to 90)")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be -180 to 180)")]
    InvalidLongitude(f64),

    #[error("Non-finite {field}: {value}")]
    NonFinite { field: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, NedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_error_display() {
        let err = CoordinateError::InvalidLatitude(95.0);
        assert_eq!(err.to_string(), "Invalid latitude: 95 (must be -90 to 90)");

        let err = CoordinateError::InvalidLongitude(200.0);
        assert_eq!(err.to_string(), "Invalid longitude: 200 (must be -180 to 180)");

        let err = CoordinateError::NonFinite {
            field: "down",
            value: f64::NAN,
        };
        assert_eq!(err.to_string(), "Non-finite down: NaN");
    }

    #[test]
    fn test_ned_error_from_coordinate_error() {
        let coord_err = CoordinateError::InvalidLatitude(95.0);
        let ned_err: NedError = coord_err.into();
        assert!(matches!(ned_err, NedError::CoordinateTransform(_)));
        assert_eq!(
            ned_err.to_string(),
            "Coordinate transform error: Invalid latitude: 95 (must be -90 to 90)"
        );
    }

    #[test]
    fn test_ned_error_numerical() {
        let err = NedError::Numerical("easting is NaN".to_string());
        assert_eq!(err.to_string(), "Numerical error: easting is NaN");
    }
}
