use crate::point::GeoPoint;
use serde::{Deserialize, Serialize};

/// A job posting pinned to a location. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub location: GeoPoint,
}

impl Job {
    pub fn new(title: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            title: title.into(),
            location,
        }
    }

    /// Case-insensitive exact comparison against `title`.
    pub fn title_matches(&self, title: &str) -> bool {
        self.title.to_lowercase() == title.to_lowercase()
    }
}
