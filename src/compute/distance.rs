//! Great-circle distances and the radius-to-degrees conversion used to build
//! coarse query rectangles.

use geo::{Distance, Haversine, HaversineMeasure};
use nearjobs_types::GeoPoint;
use std::f64::consts::FRAC_PI_2;

/// Haversine distance between two points, in kilometres.
#[inline]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine.distance(a.to_geo(), b.to_geo()) / 1000.0
}

/// Degree offsets that bound a circle on the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeDelta {
    pub latitude: f64,
    /// `None` when the circle reaches a pole, so every longitude is possible.
    pub longitude: Option<f64>,
}

/// Convert `radius_km` around `center` into latitude/longitude offsets.
///
/// The offsets never under-estimate: every point within `radius_km` of
/// `center` lies within `center ± delta`. The conversion uses the smaller GRS80
/// mean radius, which only widens the box relative to [`haversine_km`].
pub fn radius_to_degrees(center: GeoPoint, radius_km: f64) -> DegreeDelta {
    let earth_radius_km = HaversineMeasure::GRS80_MEAN_RADIUS.radius() / 1000.0;
    let angular = radius_km.max(0.0) / earth_radius_km;

    let latitude = angular.to_degrees();
    let lat = center.latitude.to_radians();
    if angular >= FRAC_PI_2 || lat + angular >= FRAC_PI_2 || lat - angular <= -FRAC_PI_2 {
        return DegreeDelta {
            latitude,
            longitude: None,
        };
    }

    let ratio = (angular.sin() / lat.cos()).min(1.0);
    DegreeDelta {
        latitude,
        longitude: Some(ratio.asin().to_degrees()),
    }
}
