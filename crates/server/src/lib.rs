//! NearJobs HTTP server.
//!
//! Serves a [`nearjobs::JobStore`] over a small JSON API:
//!
//! - `GET /api/v1/jobs/available`
//! - `GET /api/v1/jobs/nearby?latitude=&longitude=&radius=`
//! - `GET /api/v1/jobs/top-jobs/around-me?latitude=&longitude=&title=`
//!
//! ```ignore
//! use nearjobs_server::run_server;
//!
//! run_server(listener, store, shutdown).await?;
//! ```

pub mod response;
pub mod routes;

pub use response::{ApiError, Envelope, ErrorEnvelope};
pub use routes::{router, run_server};
