//! # nearjobs-types
//!
//! Value types shared by the nearjobs index, its data-access store and the HTTP server:
//!
//! - **`GeoPoint`**: a longitude/latitude pair
//! - **`Job`**: a job title pinned to a `GeoPoint`
//!
//! Both are plain, serde-serializable values. Conversions into the `geo` crate's
//! primitives are provided for distance calculations.
//!
//! ## Examples
//!
//! ```rust
//! use nearjobs_types::{GeoPoint, Job};
//!
//! let lagos = GeoPoint::new(3.3792, 6.5244);
//! let job = Job::new("Backend Engineer", lagos);
//! assert_eq!(job.location.latitude, 6.5244);
//! ```

pub mod job;
pub mod point;

pub use job::Job;
pub use point::GeoPoint;
