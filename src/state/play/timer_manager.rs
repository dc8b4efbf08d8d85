// Per-lane hit-text timers. Each timer stores the tier shown and the session
// time it was started at; `None` means nothing is displayed.

use crate::model::{LANE_COUNT, Lane};
use crate::play::Tier;

/// Hit text currently shown on a lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneFeedback {
    pub tier: Tier,
    pub started_ms: f64,
}

/// Manages the per-lane feedback timers of the play state.
#[derive(Debug, Clone)]
pub struct TimerManager {
    timers: [Option<LaneFeedback>; LANE_COUNT],
    duration_ms: f64,
}

impl TimerManager {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            timers: [None; LANE_COUNT],
            duration_ms,
        }
    }

    /// Start (or restart) a lane's timer.
    pub fn set(&mut self, lane: Lane, tier: Tier, now_ms: f64) {
        self.timers[lane.index()] = Some(LaneFeedback {
            tier,
            started_ms: now_ms,
        });
    }

    pub fn get(&self, lane: Lane) -> Option<LaneFeedback> {
        self.timers[lane.index()]
    }

    /// Stop timers whose display time has run out.
    pub fn expire(&mut self, now_ms: f64) {
        let duration_ms = self.duration_ms;
        for timer in &mut self.timers {
            if timer.is_some_and(|t| now_ms - t.started_ms >= duration_ms) {
                *timer = None;
            }
        }
    }

    pub fn is_active(&self, lane: Lane) -> bool {
        self.timers[lane.index()].is_some()
    }

    pub fn active_count(&self) -> usize {
        self.timers.iter().filter(|t| t.is_some()).count()
    }

    /// Stop every timer.
    pub fn clear(&mut self) {
        self.timers = [None; LANE_COUNT];
    }
}
