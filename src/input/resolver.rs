use std::collections::HashMap;

use tracing::trace;

use super::key_config::{KeyBindings, normalize_key};
use super::key_state::KeyState;
use crate::model::{LANE_COUNT, Lane};

/// Lane-level action produced from a raw key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneInput {
    Press(Lane),
    Release(Lane),
}

/// Turns raw key-down/key-up events into lane presses and releases.
///
/// Key repeat is filtered: a key-down on a held key produces nothing.
#[derive(Debug, Clone)]
pub struct InputResolver {
    lane_of: HashMap<String, Lane>,
    keys: [KeyState; LANE_COUNT],
}

impl InputResolver {
    pub fn new(bindings: &KeyBindings) -> Self {
        Self {
            lane_of: bindings.lane_map(),
            keys: [KeyState::default(); LANE_COUNT],
        }
    }

    pub fn lane_for(&self, key: &str) -> Option<Lane> {
        self.lane_of.get(&normalize_key(key)).copied()
    }

    pub fn key_down(&mut self, key: &str) -> Option<LaneInput> {
        let lane = self.lane_for(key)?;
        if !self.keys[lane.index()].on_press() {
            trace!("ignoring repeat key-down on {lane}");
            return None;
        }
        Some(LaneInput::Press(lane))
    }

    pub fn key_up(&mut self, key: &str) -> Option<LaneInput> {
        let lane = self.lane_for(key)?;
        if !self.keys[lane.index()].on_release() {
            return None;
        }
        Some(LaneInput::Release(lane))
    }

    pub fn is_held(&self, lane: Lane) -> bool {
        self.keys[lane.index()].pressed
    }

    /// Forget every held key, e.g. on restart or focus loss.
    pub fn release_all(&mut self) {
        self.keys = [KeyState::default(); LANE_COUNT];
    }
}
