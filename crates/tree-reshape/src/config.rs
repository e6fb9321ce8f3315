//! Configuration for the reshaping engine.

use serde::{Deserialize, Serialize};

use crate::error::{ReshapeError, Result};

/// Default per-axis tolerance for merging geographic coordinates.
pub const DEFAULT_COORDINATE_TOLERANCE: f64 = 0.01;

/// Configuration for walking, assembling and reshaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReshapeConfig {
    /// Two latitudes (or two longitudes) closer than this are the same grid line.
    pub coordinate_tolerance: f64,

    /// Suffix appended to date keys (UTC designator).
    pub date_suffix: String,

    /// Date key used when the tree carries no temporal axis.
    pub undated_key: String,

    /// Dense buffers with at least this many cells are filled in parallel.
    pub parallel_threshold: usize,

    /// Geographic CRS identifier written to assembled documents.
    pub crs_id: String,
}

impl Default for ReshapeConfig {
    fn default() -> Self {
        Self {
            coordinate_tolerance: DEFAULT_COORDINATE_TOLERANCE,
            date_suffix: "Z".to_string(),
            undated_key: "0".to_string(),
            parallel_threshold: 4096,
            crs_id: covjson_protocol::crs::CRS84.to_string(),
        }
    }
}

impl ReshapeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RESHAPE_COORD_TOLERANCE") {
            if let Ok(tol) = val.parse() {
                config.coordinate_tolerance = tol;
            }
        }

        if let Ok(val) = std::env::var("RESHAPE_DATE_SUFFIX") {
            config.date_suffix = val;
        }

        if let Ok(val) = std::env::var("RESHAPE_UNDATED_KEY") {
            config.undated_key = val;
        }

        if let Ok(val) = std::env::var("RESHAPE_PARALLEL_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.parallel_threshold = threshold;
            }
        }

        if let Ok(val) = std::env::var("RESHAPE_CRS_ID") {
            config.crs_id = val;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.coordinate_tolerance.is_finite() || self.coordinate_tolerance < 0.0 {
            return Err(ReshapeError::ConfigError(
                "coordinate_tolerance must be a finite value >= 0".to_string(),
            ));
        }

        if self.undated_key.is_empty() {
            return Err(ReshapeError::ConfigError(
                "undated_key must not be empty".to_string(),
            ));
        }

        if self.crs_id.is_empty() {
            return Err(ReshapeError::ConfigError("crs_id must not be empty".to_string()));
        }

        Ok(())
    }

    /// Override the coordinate tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.coordinate_tolerance = tolerance;
        self
    }

    /// Override the parallel threshold.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}
