use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::model::{LANE_COUNT, Lane};

/// Physical key identifier per lane, indexed by `Lane::index()`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct KeyBindings {
    lanes: [String; LANE_COUNT],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            lanes: ["s", "d", "k", "l"].map(String::from),
        }
    }
}

impl KeyBindings {
    pub fn new(lanes: [&str; LANE_COUNT]) -> Result<Self, ConfigError> {
        let bindings = Self {
            lanes: lanes.map(normalize_key),
        };
        bindings.validate()?;
        Ok(bindings)
    }

    pub fn key(&self, lane: Lane) -> &str {
        &self.lanes[lane.index()]
    }

    /// Rebind a lane. Only valid between sessions; a running session keeps
    /// the table it was created with.
    pub fn rebind(&mut self, lane: Lane, key: &str) -> Result<(), ConfigError> {
        let mut next = self.clone();
        next.lanes[lane.index()] = normalize_key(key);
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (lane, key) in self.lanes.iter().enumerate() {
            if key.is_empty() {
                return Err(ConfigError::EmptyKey { lane });
            }
            if self.lanes[..lane].contains(key) {
                return Err(ConfigError::DuplicateKey { key: key.clone() });
            }
        }
        Ok(())
    }

    /// Build the direct key-to-lane lookup used during play.
    pub fn lane_map(&self) -> HashMap<String, Lane> {
        Lane::all()
            .iter()
            .map(|&lane| (self.lanes[lane.index()].clone(), lane))
            .collect()
    }

    /// Loads bindings from a specified path.
    /// Returns default bindings if the file doesn't exist.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read key config: {}", path.display()))?;
        let mut bindings: Self = serde_json::from_str(&content)?;
        bindings.lanes = bindings.lanes.map(|k| normalize_key(&k));
        bindings.validate()?;
        Ok(bindings)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Key identifiers are compared ASCII case-insensitively.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}
