use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic location in degrees.
///
/// The only invariant is that both coordinates are finite numbers; range checks
/// (longitude in [-180, 180], latitude in [-90, 90]) are left to callers that
/// accept untrusted input.
///
/// # Examples
///
/// ```
/// use nearjobs_types::GeoPoint;
///
/// let nyc = GeoPoint::new(-74.0060, 40.7128);
/// assert_eq!(nyc.longitude, -74.0060);
/// assert_eq!(nyc.to_string(), "-74.006000,40.712800");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl GeoPoint {
    /// Create a point from longitude and latitude, in that order.
    #[inline]
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Returns true when both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }

    /// Convert to a `geo::Point` (x = longitude, y = latitude).
    #[inline]
    pub fn to_geo(self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

impl From<geo::Point<f64>> for GeoPoint {
    fn from(point: geo::Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        point.to_geo()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.longitude, self.latitude)
    }
}
