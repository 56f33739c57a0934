//! Store builder.
//!
//! Collects jobs from a CSV file and/or in-memory values, then builds a
//! [`JobStore`] over all of them with one configuration.

use crate::config::Config;
use crate::error::Result;
use crate::loader::load_jobs;
use crate::store::JobStore;
use nearjobs_types::Job;
use std::path::PathBuf;

/// Builder for a [`JobStore`] with a CSV source and settings.
#[derive(Debug)]
pub struct StoreBuilder {
    csv_path: Option<PathBuf>,
    jobs: Vec<Job>,
    config: Config,
}

impl StoreBuilder {
    /// Create a builder with the default configuration and no jobs.
    pub fn new() -> Self {
        Self {
            csv_path: None,
            jobs: Vec::new(),
            config: Config::default(),
        }
    }

    /// Read jobs from this CSV file on `build`.
    pub fn csv_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.csv_path = Some(path.into());
        self
    }

    /// Add in-memory jobs, loaded after the CSV file's.
    pub fn jobs<I: IntoIterator<Item = Job>>(mut self, jobs: I) -> Self {
        self.jobs.extend(jobs);
        self
    }

    pub fn job(mut self, job: Job) -> Self {
        self.jobs.push(job);
        self
    }

    /// Set the store configuration (fanout, padding, default radius, etc.).
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Build the store. Reads the CSV file if one was configured.
    pub fn build(self) -> Result<JobStore> {
        let mut jobs = match &self.csv_path {
            Some(path) => load_jobs(path)?.jobs,
            None => Vec::new(),
        };
        jobs.extend(self.jobs);
        JobStore::from_jobs(jobs, self.config)
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
