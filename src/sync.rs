//! Thread-safe wrapper for concurrent index access.
//!
//! `SyncIndex` puts a single [`RTree`] behind `Arc<RwLock<_>>`. Inserts take the
//! write lock, so no reader or other writer observes a half-finished split;
//! searches take the read lock and run concurrently. There is no per-node
//! locking: both inserts and searches touch `O(height)` nodes.
//!
//! # Examples
//!
//! ```rust
//! use nearjobs::{GeoPoint, IndexConfig, Job, SyncIndex};
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let index = SyncIndex::build(
//!     vec![Job::new("Nurse", GeoPoint::new(3.38, 6.52))],
//!     IndexConfig::default(),
//! )?;
//!
//! let writer = index.clone();
//! let handle = thread::spawn(move || {
//!     writer.insert(Job::new("Driver", GeoPoint::new(3.39, 6.53))).unwrap();
//! });
//! handle.join().unwrap();
//!
//! let nearby = index.radius_search(GeoPoint::new(3.38, 6.52), 5.0);
//! assert_eq!(nearby.len(), 2);
//! # Ok(())
//! # }
//! ```

use crate::config::IndexConfig;
use crate::error::Result;
use crate::index::{RTree, TreeStats};
use crate::query::QueryExecutor;
use nearjobs_types::{GeoPoint, Job};
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe, cheaply cloneable handle to one shared [`RTree`].
#[derive(Clone, Debug)]
pub struct SyncIndex {
    inner: Arc<RwLock<RTree>>,
}

impl SyncIndex {
    /// Bulk-load `jobs` before the index is shared.
    pub fn build<I>(jobs: I, config: IndexConfig) -> Result<Self>
    where
        I: IntoIterator<Item = Job>,
    {
        Ok(Self::from_tree(RTree::build(jobs, config)?))
    }

    pub fn from_tree(tree: RTree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Insert a job under exclusive access.
    pub fn insert(&self, job: Job) -> Result<()> {
        self.inner.write().insert(job)
    }

    /// Jobs within `radius_km` of `center`.
    pub fn radius_search(&self, center: GeoPoint, radius_km: f64) -> Vec<Job> {
        QueryExecutor::new(&self.inner.read()).radius_search(center, radius_km)
    }

    /// Jobs within `radius_km` of `center` whose title matches, ignoring case.
    pub fn radius_search_with_title(&self, center: GeoPoint, radius_km: f64, title: &str) -> Vec<Job> {
        QueryExecutor::new(&self.inner.read()).radius_search_with_title(center, radius_km, title)
    }

    /// Matches with their distance in kilometres, nearest first.
    pub fn search_with_distances(
        &self,
        center: GeoPoint,
        radius_km: f64,
        title: Option<&str>,
    ) -> Vec<(Job, f64)> {
        QueryExecutor::new(&self.inner.read()).search_with_distances(center, radius_km, title)
    }

    /// Run `f` against the tree under the read lock.
    pub fn with_tree<R>(&self, f: impl FnOnce(&RTree) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn stats(&self) -> TreeStats {
        self.inner.read().stats()
    }

    pub fn check_invariants(&self) -> Result<()> {
        self.inner.read().check_invariants()
    }
}
