//! Index and store configuration.
//!
//! All fields carry serde defaults, so a partial JSON (or TOML, with the `toml`
//! feature) document is enough to override a single knob.

use crate::error::{NearJobsError, Result};
use serde::de::Error;

/// Shape parameters of the R-tree.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexConfig {
    /// Maximum number of entries (leaf) or children (internal) per node.
    #[serde(default = "IndexConfig::default_max_fanout")]
    pub max_fanout: usize,

    /// Minimum number of entries or children per non-root node. Applied to
    /// leaves and internal nodes alike.
    #[serde(default = "IndexConfig::default_min_fanout")]
    pub min_fanout: usize,

    /// Padding in degrees added around each point to give it a non-zero area.
    #[serde(default = "IndexConfig::default_pad_degrees")]
    pub pad_degrees: f64,
}

impl IndexConfig {
    const fn default_max_fanout() -> usize {
        30
    }

    const fn default_min_fanout() -> usize {
        Self::default_max_fanout() / 2
    }

    const fn default_pad_degrees() -> f64 {
        0.2
    }

    /// Set the maximum fanout. The minimum fanout is reset to half of it.
    pub fn with_max_fanout(mut self, max_fanout: usize) -> Self {
        self.max_fanout = max_fanout;
        self.min_fanout = max_fanout / 2;
        self
    }

    pub fn with_min_fanout(mut self, min_fanout: usize) -> Self {
        self.min_fanout = min_fanout;
        self
    }

    pub fn with_pad_degrees(mut self, pad_degrees: f64) -> Self {
        self.pad_degrees = pad_degrees;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_fanout < 2 {
            return Err(NearJobsError::InvalidConfig(format!(
                "max_fanout must be at least 2, got {}",
                self.max_fanout
            )));
        }

        if self.min_fanout == 0 || self.min_fanout > self.max_fanout / 2 {
            return Err(NearJobsError::InvalidConfig(format!(
                "min_fanout must be in [1, {}], got {}",
                self.max_fanout / 2,
                self.min_fanout
            )));
        }

        if !self.pad_degrees.is_finite() || self.pad_degrees <= 0.0 {
            return Err(NearJobsError::InvalidConfig(format!(
                "pad_degrees must be finite and positive, got {}",
                self.pad_degrees
            )));
        }

        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_fanout: Self::default_max_fanout(),
            min_fanout: Self::default_min_fanout(),
            pad_degrees: Self::default_pad_degrees(),
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,

    /// Radius used when a nearby search asks for radius 0, and for title searches.
    #[serde(default = "Config::default_radius_km")]
    pub default_radius_km: f64,

    /// Upper bound on results of the "top jobs around" lookup.
    #[serde(default = "Config::default_top_jobs_limit")]
    pub top_jobs_limit: usize,
}

impl Config {
    const fn default_radius_km() -> f64 {
        5.0
    }

    const fn default_top_jobs_limit() -> usize {
        5
    }

    pub fn with_index(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    pub fn with_default_radius_km(mut self, radius_km: f64) -> Self {
        self.default_radius_km = radius_km;
        self
    }

    pub fn with_top_jobs_limit(mut self, limit: usize) -> Self {
        self.top_jobs_limit = limit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.index.validate()?;

        if !self.default_radius_km.is_finite() || self.default_radius_km < 0.0 {
            return Err(NearJobsError::InvalidConfig(format!(
                "default_radius_km must be finite and non-negative, got {}",
                self.default_radius_km
            )));
        }

        if self.top_jobs_limit == 0 {
            return Err(NearJobsError::InvalidConfig(
                "top_jobs_limit must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            default_radius_km: Self::default_radius_km(),
            top_jobs_limit: Self::default_top_jobs_limit(),
        }
    }
}
