//! Validation for geographic coordinates.

use crate::error::{NearJobsError, Result};
use nearjobs_types::GeoPoint;

/// Validates a point has a finite longitude in [-180, 180] and a finite
/// latitude in [-90, 90].
///
/// # Examples
///
/// ```
/// use nearjobs::compute::validation::validate_geographic_point;
/// use nearjobs::GeoPoint;
///
/// assert!(validate_geographic_point(&GeoPoint::new(3.3792, 6.5244)).is_ok());
/// assert!(validate_geographic_point(&GeoPoint::new(200.0, 6.5)).is_err());
/// assert!(validate_geographic_point(&GeoPoint::new(3.3, 95.0)).is_err());
/// ```
pub fn validate_geographic_point(point: &GeoPoint) -> Result<()> {
    validate_longitude(point.longitude)?;
    validate_latitude(point.latitude)
}

pub fn validate_longitude(longitude: f64) -> Result<()> {
    if !longitude.is_finite() {
        return Err(NearJobsError::InvalidInput(format!(
            "Longitude must be finite, got: {}",
            longitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(NearJobsError::InvalidInput(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            longitude
        )));
    }

    Ok(())
}

pub fn validate_latitude(latitude: f64) -> Result<()> {
    if !latitude.is_finite() {
        return Err(NearJobsError::InvalidInput(format!(
            "Latitude must be finite, got: {}",
            latitude
        )));
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(NearJobsError::InvalidInput(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            latitude
        )));
    }

    Ok(())
}

/// Validates a search radius in kilometres: finite and non-negative.
pub fn validate_radius_km(radius_km: f64) -> Result<()> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(NearJobsError::InvalidInput(format!(
            "Radius must be a finite, non-negative number of kilometres, got: {}",
            radius_km
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_valid() {
        for point in [
            GeoPoint::new(180.0, 90.0),
            GeoPoint::new(-180.0, -90.0),
            GeoPoint::new(0.0, 0.0),
        ] {
            assert!(validate_geographic_point(&point).is_ok());
        }
    }

    #[test]
    fn test_rejects_out_of_range_and_non_finite() {
        assert!(validate_geographic_point(&GeoPoint::new(180.0001, 0.0)).is_err());
        assert!(validate_geographic_point(&GeoPoint::new(0.0, -90.5)).is_err());
        assert!(validate_geographic_point(&GeoPoint::new(f64::NAN, 0.0)).is_err());
        assert!(validate_geographic_point(&GeoPoint::new(0.0, f64::NEG_INFINITY)).is_err());
    }

    #[test]
    fn test_error_message_names_the_axis() {
        let err = validate_geographic_point(&GeoPoint::new(0.0, 100.0)).unwrap_err();
        assert!(err.to_string().contains("Latitude"));
    }

    #[test]
    fn test_radius() {
        assert!(validate_radius_km(0.0).is_ok());
        assert!(validate_radius_km(12.5).is_ok());
        assert!(validate_radius_km(-1.0).is_err());
        assert!(validate_radius_km(f64::INFINITY).is_err());
    }
}
