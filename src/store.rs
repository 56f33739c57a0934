//! Data-access store backing the HTTP API.
//!
//! A [`JobStore`] pairs the shared spatial index with a title map, so that
//! "which jobs exist" and "which jobs are near here" are both answered without
//! a full scan.

use crate::config::Config;
use crate::error::Result;
use crate::index::TreeStats;
use crate::sync::SyncIndex;
use nearjobs_types::{GeoPoint, Job};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Jobs indexed by location and by lowercased title.
#[derive(Debug)]
pub struct JobStore {
    index: SyncIndex,
    titles: RwLock<FxHashMap<String, Vec<Job>>>,
    config: Config,
}

impl JobStore {
    /// Build a store over `jobs`. Fails with `EmptyInput` when there are none.
    pub fn from_jobs(jobs: Vec<Job>, config: Config) -> Result<Self> {
        config.validate()?;

        let mut titles: FxHashMap<String, Vec<Job>> = FxHashMap::default();
        for job in &jobs {
            titles
                .entry(job.title.to_lowercase())
                .or_default()
                .push(job.clone());
        }

        let index = SyncIndex::build(jobs, config.index.clone())?;
        log::debug!(
            "Job store ready: {} jobs, {} distinct titles",
            index.len(),
            titles.len()
        );

        Ok(Self {
            index,
            titles: RwLock::new(titles),
            config,
        })
    }

    /// Insert a job into both views. The title map stays locked across the index
    /// insert, so a reader never sees the job nearby but missing by title.
    pub fn insert(&self, job: Job) -> Result<()> {
        let mut titles = self.titles.write();
        self.index.insert(job.clone())?;
        titles.entry(job.title.to_lowercase()).or_default().push(job);
        Ok(())
    }

    /// Snapshot of every job grouped by lowercased title.
    pub fn title_jobs(&self) -> FxHashMap<String, Vec<Job>> {
        self.titles.read().clone()
    }

    /// Jobs whose title equals `title`, ignoring case.
    pub fn search_by_title(&self, title: &str) -> Vec<Job> {
        self.titles
            .read()
            .get(&title.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Jobs within `radius_km` of `center`. A radius of 0 means the configured
    /// default radius.
    pub fn find_jobs_nearby(&self, center: GeoPoint, radius_km: f64) -> Vec<Job> {
        let radius_km = if radius_km == 0.0 {
            self.config.default_radius_km
        } else {
            radius_km
        };
        self.index.radius_search(center, radius_km)
    }

    /// Jobs titled `title` within the default radius of `center`.
    pub fn search_by_title_and_location(&self, title: &str, center: GeoPoint) -> Vec<Job> {
        self.index
            .radius_search_with_title(center, self.config.default_radius_km, title)
    }

    /// The nearest jobs titled `title` within the default radius, at most
    /// `top_jobs_limit` of them.
    pub fn top_jobs_around(&self, title: &str, center: GeoPoint) -> Vec<Job> {
        self.index
            .search_with_distances(center, self.config.default_radius_km, Some(title))
            .into_iter()
            .take(self.config.top_jobs_limit)
            .map(|(job, _)| job)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn stats(&self) -> TreeStats {
        self.index.stats()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared index, for callers that need raw queries.
    pub fn index(&self) -> &SyncIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NearJobsError;

    fn job(title: &str, lon: f64, lat: f64) -> Job {
        Job::new(title, GeoPoint::new(lon, lat))
    }

    fn lagos_store() -> JobStore {
        let jobs = vec![
            job("Chef", 3.3792, 6.5244),
            job("chef", 3.3800, 6.5250),
            job("Chef", 3.4000, 6.5300),
            job("Driver", 3.3795, 6.5246),
            job("Chef", 3.9000, 7.3800),
        ];
        JobStore::from_jobs(jobs, Config::default()).unwrap()
    }

    #[test]
    fn test_empty_store_is_rejected() {
        let err = JobStore::from_jobs(Vec::new(), Config::default()).unwrap_err();
        assert!(matches!(err, NearJobsError::EmptyInput));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config::default().with_top_jobs_limit(0);
        let err = JobStore::from_jobs(vec![job("Chef", 0.0, 0.0)], config).unwrap_err();
        assert!(matches!(err, NearJobsError::InvalidConfig(_)));
    }

    #[test]
    fn test_title_map_groups_case_insensitively() {
        let store = lagos_store();
        let titles = store.title_jobs();
        assert_eq!(titles.len(), 2);
        assert_eq!(titles["chef"].len(), 4);
        assert_eq!(titles["driver"].len(), 1);

        assert_eq!(store.search_by_title("CHEF").len(), 4);
        assert!(store.search_by_title("pilot").is_empty());
    }

    #[test]
    fn test_nearby_uses_default_radius_for_zero() {
        let store = lagos_store();
        let center = GeoPoint::new(3.3792, 6.5244);

        // Ibadan is ~100 km away; everything else is within 5 km.
        assert_eq!(store.find_jobs_nearby(center, 0.0).len(), 4);
        assert_eq!(store.find_jobs_nearby(center, 200.0).len(), 5);
        assert_eq!(store.find_jobs_nearby(center, 0.01).len(), 1);
    }

    #[test]
    fn test_title_and_location_search() {
        let store = lagos_store();
        let center = GeoPoint::new(3.3792, 6.5244);
        let chefs = store.search_by_title_and_location("chef", center);
        assert_eq!(chefs.len(), 3);
        assert!(chefs.iter().all(|j| j.title_matches("CHEF")));
    }

    #[test]
    fn test_top_jobs_sorted_and_limited() {
        let jobs = (0..10)
            .map(|i| job("Chef", 3.3792 + 0.001 * f64::from(10 - i), 6.5244))
            .collect();
        let config = Config::default().with_top_jobs_limit(3);
        let store = JobStore::from_jobs(jobs, config).unwrap();

        let top = store.top_jobs_around("chef", GeoPoint::new(3.3792, 6.5244));
        let longitudes: Vec<_> = top.iter().map(|j| j.location.longitude).collect();
        assert_eq!(top.len(), 3);
        assert!(longitudes.windows(2).all(|w| w[0] < w[1]));
        assert!((longitudes[0] - 3.3802).abs() < 1e-9);
    }

    #[test]
    fn test_nearby_jobs_are_always_listed_by_title() {
        let store = std::sync::Arc::new(lagos_store());
        let center = GeoPoint::new(3.3792, 6.5244);

        let writer = {
            let store = std::sync::Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..200 {
                    let lon = 3.3792 + 0.00001 * f64::from(i);
                    store.insert(job(&format!("Tailor{i}"), lon, 6.5244)).unwrap();
                }
            })
        };

        while !writer.is_finished() {
            for found in store.find_jobs_nearby(center, 1.0) {
                let listed = store.search_by_title(&found.title);
                assert!(listed.contains(&found), "{} missing by title", found.title);
            }
        }
        writer.join().unwrap();
        assert_eq!(store.len(), 205);
    }

    #[test]
    fn test_insert_updates_both_views() {
        let store = lagos_store();
        store.insert(job("Pilot", 3.3793, 6.5245)).unwrap();

        assert_eq!(store.len(), 6);
        assert_eq!(store.search_by_title("pilot").len(), 1);
        let near = store.search_by_title_and_location("Pilot", GeoPoint::new(3.3792, 6.5244));
        assert_eq!(near.len(), 1);
        assert!(store.index().check_invariants().is_ok());
    }
}
