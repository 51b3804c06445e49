//! Pipeline configuration loaded from JSON.
//!
//! ```json
//! {
//!   "passes": ["prune_dangling_connections", "attribute_summaries"],
//!   "summary": { "max_categories": 12, "max_entries": 16 }
//! }
//! ```
//!
//! Missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::passes::DEFAULT_PASSES;
use crate::summary::SummaryOptions;

/// Errors that can occur while loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pipeline config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pass order and summary limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pass names in execution order
    pub passes: Vec<String>,

    pub summary: SummaryOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES.iter().map(|p| p.to_string()).collect(),
            summary: SummaryOptions::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
