// SPDX-License-Identifier: MPL-2.0

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Labels of the fixed location levels.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationLabels {
    pub location: String,
    pub city: String,
    pub neighbourhood: String,
}

impl Default for LocationLabels {
    fn default() -> Self {
        Self {
            location: String::from("Location"),
            city: String::from("City"),
            neighbourhood: String::from("Neighbourhood"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site root serving the ajax endpoints (e.g., http://localhost:8000)
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Text of the "unselected" option
    pub placeholder_label: String,
    /// Category levels are labelled "<category_label>: <parent level>"
    pub category_label: String,
    pub location_labels: LocationLabels,
    /// Drop responses to requests superseded by a newer change in the same chain
    pub discard_stale_responses: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:8000"),
            request_timeout_secs: 10,
            placeholder_label: String::from("---------"),
            category_label: String::from("Category"),
            location_labels: LocationLabels::default(),
            discard_stale_responses: true,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn category_level_label(&self, parent_level: usize) -> String {
        format!("{}: {}", self.category_label, parent_level)
    }

    /// Label of a location level, `None` past the neighbourhood.
    pub fn location_level_label(&self, depth: usize) -> Option<&str> {
        match depth {
            1 => Some(&self.location_labels.location),
            2 => Some(&self.location_labels.city),
            3 => Some(&self.location_labels.neighbourhood),
            _ => None,
        }
    }
}
