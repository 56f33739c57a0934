//! Radius search over an [`RTree`] with envelope-based pruning.
//!
//! 1. **Query rectangle**: convert the radius into degree offsets around the
//!    center that never under-estimate the circle, then pad by the same amount
//!    points are padded with.
//! 2. **Pruning**: descend only into subtrees whose rectangle overlaps the
//!    query rectangle and collect the entries of the surviving leaves.
//! 3. **Exact filtering**: keep candidates whose haversine distance to the
//!    center is within the radius, and whose title matches when a title filter
//!    is given.
//!
//! Over-estimating the rectangle only costs extra candidates in step 3; it
//! never drops a true match.

use crate::compute::distance::{haversine_km, radius_to_degrees};
use crate::index::{RTree, Rect};
use nearjobs_types::{GeoPoint, Job};

/// Executes radius searches against a borrowed tree.
#[derive(Debug, Clone, Copy)]
pub struct QueryExecutor<'a> {
    tree: &'a RTree,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(tree: &'a RTree) -> Self {
        Self { tree }
    }

    /// Coarse rectangle guaranteed to contain every point within `radius_km`
    /// of `center`.
    pub fn query_rect(&self, center: GeoPoint, radius_km: f64) -> Rect {
        let pad = self.tree.config().pad_degrees;
        let delta = radius_to_degrees(center, effective_radius(radius_km));

        let lat_reach = delta.latitude + pad;
        let (min_y, max_y) = match delta.longitude {
            Some(lon_delta)
                if center.longitude - lon_delta >= -180.0
                    && center.longitude + lon_delta <= 180.0 =>
            {
                (
                    center.longitude - lon_delta - pad,
                    center.longitude + lon_delta + pad,
                )
            }
            // Reaches a pole or wraps across the antimeridian.
            _ => (f64::NEG_INFINITY, f64::INFINITY),
        };

        Rect::new(
            center.latitude - lat_reach,
            center.latitude + lat_reach,
            min_y,
            max_y,
        )
    }

    /// Jobs within `radius_km` of `center`.
    pub fn radius_search(&self, center: GeoPoint, radius_km: f64) -> Vec<Job> {
        self.search(center, radius_km, None)
    }

    /// Jobs within `radius_km` of `center` whose title equals `title`,
    /// ignoring case.
    pub fn radius_search_with_title(&self, center: GeoPoint, radius_km: f64, title: &str) -> Vec<Job> {
        self.search(center, radius_km, Some(title))
    }

    pub fn search(&self, center: GeoPoint, radius_km: f64, title: Option<&str>) -> Vec<Job> {
        self.matches(center, radius_km, title)
            .into_iter()
            .map(|(job, _)| job.clone())
            .collect()
    }

    /// Matching jobs paired with their distance from `center` in kilometres,
    /// sorted nearest first.
    pub fn search_with_distances(
        &self,
        center: GeoPoint,
        radius_km: f64,
        title: Option<&str>,
    ) -> Vec<(Job, f64)> {
        let mut results: Vec<_> = self
            .matches(center, radius_km, title)
            .into_iter()
            .map(|(job, distance)| (job.clone(), distance))
            .collect();
        results.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        results
    }

    fn matches(&self, center: GeoPoint, radius_km: f64, title: Option<&str>) -> Vec<(&'a Job, f64)> {
        if !center.is_finite() {
            log::warn!("Rejecting radius search around non-finite center {}", center);
            return Vec::new();
        }

        let radius_km = effective_radius(radius_km);
        let query = self.query_rect(center, radius_km);
        let candidates = self.tree.candidates(&query);
        let title = title.map(str::to_lowercase);

        let examined = candidates.len();
        let results: Vec<_> = candidates
            .into_iter()
            .filter_map(|entry| {
                let job = entry.job();
                let distance = haversine_km(center, job.location);
                if distance > radius_km {
                    return None;
                }
                if let Some(title) = &title
                    && job.title.to_lowercase() != *title
                {
                    return None;
                }
                Some((job, distance))
            })
            .collect();

        log::trace!(
            "Radius search around {} ({} km): {} candidates, {} matches",
            center,
            radius_km,
            examined,
            results.len()
        );
        results
    }
}

/// Negative, NaN and infinite radii all mean radius 0.
#[inline]
fn effective_radius(radius_km: f64) -> f64 {
    if radius_km.is_finite() && radius_km > 0.0 {
        radius_km
    } else {
        0.0
    }
}
