use std::fs;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// One recorded key transition, in session time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    pub key: String,
    pub pressed: bool,
    pub time_ms: f64,
}

/// Pre-recorded key input replayed into a session in time order.
#[derive(Debug, Clone, Default)]
pub struct KeyScript {
    events: Vec<KeyEvent>,
    cursor: usize,
}

impl KeyScript {
    /// Events are stably sorted by time, so same-time events keep their order.
    pub fn new(mut events: Vec<KeyEvent>) -> Self {
        events.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
        Self { events, cursor: 0 }
    }

    /// Parse a JSON array of key events.
    pub fn from_json(json: &str) -> Result<Self> {
        let events: Vec<KeyEvent> = serde_json::from_str(json)?;
        for (index, event) in events.iter().enumerate() {
            ensure!(
                event.time_ms.is_finite() && event.time_ms >= 0.0,
                "Key event {index} has invalid time {}",
                event.time_ms
            );
        }
        Ok(Self::new(events))
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read key script: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid key script: {}", path.display()))
    }

    /// Take the next event due at or before `time_ms`.
    pub fn next_due(&mut self, time_ms: f64) -> Option<KeyEvent> {
        let event = self.events.get(self.cursor)?;
        if event.time_ms > time_ms {
            return None;
        }
        self.cursor += 1;
        Some(event.clone())
    }

    /// Whether every event has been delivered.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.events.len()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Replay from the first event again.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
