use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::play::PlayResult;

/// Key a chart by the SHA-256 of its file contents.
pub fn chart_key<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let content =
        fs::read(path).with_context(|| format!("Failed to read chart file: {}", path.display()))?;
    Ok(format!("{:x}", Sha256::digest(&content)))
}

/// Best result for one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub best: PlayResult,
    /// Human plays submitted for this chart, improving or not.
    pub play_count: u32,
}

/// What `RecordStore::submit` did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Auto-play results never count.
    IgnoredAutoplay,
    NewBest,
    NotImproved,
}

/// Best records keyed by chart key, persisted as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordStore {
    records: BTreeMap<String, RecordEntry>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads records from a file. A missing file is an empty store.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read records: {}", path.display()))?;
        let store: Self = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt record file: {}", path.display()))?;
        debug!("loaded {} record(s) from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write records: {}", path.display()))?;
        Ok(())
    }

    /// Offer a finalized result for the chart. It replaces the stored best
    /// only when it scores higher, or equal with a higher max combo.
    pub fn submit(&mut self, key: &str, result: &PlayResult) -> SubmitOutcome {
        if result.is_autoplay() {
            debug!("not recording auto-play result for {key}");
            return SubmitOutcome::IgnoredAutoplay;
        }

        match self.records.get_mut(key) {
            Some(entry) => {
                entry.play_count += 1;
                if !result.beats(&entry.best) {
                    return SubmitOutcome::NotImproved;
                }
                entry.best = result.clone();
            }
            None => {
                self.records.insert(
                    key.to_owned(),
                    RecordEntry {
                        best: result.clone(),
                        play_count: 1,
                    },
                );
            }
        }
        info!("new best for {key}: {}", result.score());
        SubmitOutcome::NewBest
    }

    pub fn get(&self, key: &str) -> Option<&RecordEntry> {
        self.records.get(key)
    }

    pub fn best(&self, key: &str) -> Option<&PlayResult> {
        self.get(key).map(|e| &e.best)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
