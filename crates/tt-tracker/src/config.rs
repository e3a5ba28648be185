//! Configuration for a tracker.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};

/// What deleting a game instance takes with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CascadePolicy {
    /// Delete owned characters; owned encounters are left behind.
    CharactersOnly,
    /// Delete owned characters and owned encounters.
    #[default]
    CharactersAndEncounters,
}

impl fmt::Display for CascadePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CharactersOnly => write!(f, "characters-only"),
            Self::CharactersAndEncounters => write!(f, "characters-and-encounters"),
        }
    }
}

impl FromStr for CascadePolicy {
    type Err = TrackerError;

    fn from_str(s: &str) -> TrackerResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "characters-only" | "characters" => Ok(Self::CharactersOnly),
            "characters-and-encounters" | "all" => Ok(Self::CharactersAndEncounters),
            _ => Err(TrackerError::InvalidInput(format!(
                "unknown cascade policy: \"{s}\""
            ))),
        }
    }
}

/// Configuration for a tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Path of the JSON data file.
    pub data_file: PathBuf,
    /// What instance deletion cascades to.
    pub cascade: CascadePolicy,
    /// Default log filter when no environment filter is set.
    pub log_filter: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("tabletracker.json"),
            cascade: CascadePolicy::default(),
            log_filter: "warn".to_string(),
        }
    }
}

impl TrackerConfig {
    /// Load a configuration from a JSON file. Missing keys keep their
    /// defaults.
    pub fn load(path: &Path) -> TrackerResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| TrackerError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| TrackerError::Config(format!("{}: {e}", path.display())))
    }

    /// Set the data file.
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    /// Set the cascade policy.
    pub fn with_cascade(mut self, cascade: CascadePolicy) -> Self {
        self.cascade = cascade;
        self
    }

    /// Set the default log filter.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}
