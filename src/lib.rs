//! In-memory R-tree index for answering "which jobs are near this point?".
//!
//! ```rust
//! use nearjobs::{Config, GeoPoint, Job, JobStore};
//!
//! let jobs = vec![
//!     Job::new("Chef", GeoPoint::new(3.3792, 6.5244)),
//!     Job::new("Driver", GeoPoint::new(3.3800, 6.5250)),
//!     Job::new("Chef", GeoPoint::new(3.9000, 7.3800)),
//! ];
//! let store = JobStore::from_jobs(jobs, Config::default())?;
//!
//! let center = GeoPoint::new(3.3792, 6.5244);
//! assert_eq!(store.find_jobs_nearby(center, 5.0).len(), 2);
//! assert_eq!(store.top_jobs_around("chef", center).len(), 1);
//! # Ok::<(), nearjobs::NearJobsError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod index;
pub mod loader;
pub mod query;
pub mod store;
pub mod sync;

pub use builder::StoreBuilder;
pub use config::{Config, IndexConfig};
pub use error::{NearJobsError, Result};
pub use index::{Entry, RTree, Rect, TreeStats};
pub use loader::{LoadedJobs, load_jobs, load_jobs_from_reader};
pub use query::QueryExecutor;
pub use store::JobStore;
pub use sync::SyncIndex;

pub use nearjobs_types::{GeoPoint, Job};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{GeoPoint, Job};

    pub use crate::{Config, IndexConfig, NearJobsError, Result};

    pub use crate::{JobStore, RTree, StoreBuilder, SyncIndex};

    pub use crate::compute::distance::haversine_km;
}
