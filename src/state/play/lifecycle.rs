//! Live notes per lane: spawn, hit consumption, hold tracking and expiry.

use tracing::debug;

use crate::model::{LANE_COUNT, Lane, NoteSpec};
use crate::play::{JudgeWindow, Tier};

/// Identifier of a spawned note, unique within one run of a session.
pub type NoteId = u32;

/// A note while it is live in its lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeNote {
    pub id: NoteId,
    pub lane: Lane,
    pub target_ms: f64,
    /// Hold end. `None` for instantaneous notes.
    pub end_ms: Option<f64>,
}

impl RuntimeNote {
    pub fn is_hold(&self) -> bool {
        self.end_ms.is_some()
    }

    /// Distance travelled from the spawn point at `now_ms`; equals
    /// `approach_distance` at the target time. Derived, never stored.
    pub fn position(&self, now_ms: f64, approach_duration_ms: f64, approach_distance: f64) -> f64 {
        approach_position(self.target_ms, now_ms, approach_duration_ms, approach_distance)
    }

    /// Position of the hold tail, if this is a hold.
    pub fn tail_position(
        &self,
        now_ms: f64,
        approach_duration_ms: f64,
        approach_distance: f64,
    ) -> Option<f64> {
        self.end_ms
            .map(|end| approach_position(end, now_ms, approach_duration_ms, approach_distance))
    }
}

fn approach_position(time_ms: f64, now_ms: f64, duration_ms: f64, distance: f64) -> f64 {
    distance * (1.0 - (time_ms - now_ms) / duration_ms)
}

/// A hold between its press and its resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveHold {
    pub note_id: NoteId,
    pub end_ms: f64,
    /// Tier of the initial press; the only scoring the hold receives.
    pub tier: Tier,
}

/// A judged press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub lane: Lane,
    pub tier: Tier,
    /// Press time minus target time (negative = early).
    pub time_diff_ms: f64,
    /// The press started a hold instead of consuming the note.
    pub started_hold: bool,
}

/// Owns every live note, one time-ordered list per lane.
#[derive(Debug, Clone)]
pub struct NoteField {
    window: JudgeWindow,
    lanes: [Vec<RuntimeNote>; LANE_COUNT],
    holds: [Option<ActiveHold>; LANE_COUNT],
    next_id: NoteId,
}

impl NoteField {
    pub fn new(window: JudgeWindow) -> Self {
        Self {
            window,
            lanes: Default::default(),
            holds: [None; LANE_COUNT],
            next_id: 0,
        }
    }

    pub fn window(&self) -> &JudgeWindow {
        &self.window
    }

    /// Instantiate a note at its spawn moment. Spawns arrive in target order
    /// per lane, so appending keeps each list sorted.
    pub fn spawn(&mut self, lane: Lane, spec: NoteSpec) -> NoteId {
        let id = self.next_id;
        self.next_id += 1;
        self.lanes[lane.index()].push(RuntimeNote {
            id,
            lane,
            target_ms: spec.target_ms,
            end_ms: spec.end_ms,
        });
        id
    }

    /// Judge a press against the closest live note of the lane.
    ///
    /// Returns `None` when no note is within the bad window, or while a hold
    /// is already active on the lane; the lane is left unchanged.
    pub fn resolve_hit(&mut self, lane: Lane, now_ms: f64) -> Option<HitOutcome> {
        let idx = lane.index();
        if self.holds[idx].is_some() {
            return None;
        }

        // Strict comparison keeps the earliest note on ties.
        let mut best: Option<(usize, f64)> = None;
        for (pos, note) in self.lanes[idx].iter().enumerate() {
            let distance = (now_ms - note.target_ms).abs();
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((pos, distance));
            }
        }

        let (pos, distance) = best?;
        if !self.window.is_in_window(distance) {
            return None;
        }

        let note = self.lanes[idx][pos];
        let time_diff_ms = now_ms - note.target_ms;
        let tier = self.window.judge(time_diff_ms);

        let started_hold = match note.end_ms {
            Some(end_ms) => {
                self.holds[idx] = Some(ActiveHold {
                    note_id: note.id,
                    end_ms,
                    tier,
                });
                true
            }
            None => {
                self.lanes[idx].remove(pos);
                false
            }
        };

        Some(HitOutcome {
            lane,
            tier,
            time_diff_ms,
            started_hold,
        })
    }

    /// End the lane's active hold, removing its note. No scoring happens on
    /// release, early or not. Returns false if nothing was held.
    pub fn release(&mut self, lane: Lane) -> bool {
        let idx = lane.index();
        let Some(hold) = self.holds[idx].take() else {
            return false;
        };
        self.lanes[idx].retain(|n| n.id != hold.note_id);
        true
    }

    /// Remove every note passed by more than the bad window that is not
    /// being held. Returns how many notes were missed.
    pub fn age_out(&mut self, lane: Lane, now_ms: f64) -> u32 {
        let idx = lane.index();
        let held_id = self.holds[idx].map(|h| h.note_id);
        let window = self.window;

        let before = self.lanes[idx].len();
        self.lanes[idx].retain(|note| {
            Some(note.id) == held_id || !window.is_missed(now_ms - note.target_ms)
        });
        let missed = (before - self.lanes[idx].len()) as u32;
        if missed > 0 {
            debug!("{missed} note(s) missed on {lane} at {now_ms:.1} ms");
        }
        missed
    }

    /// Finish the lane's hold once its end time is reached. Returns true on
    /// completion.
    pub fn complete_hold(&mut self, lane: Lane, now_ms: f64) -> bool {
        match self.holds[lane.index()] {
            Some(hold) if now_ms >= hold.end_ms => self.release(lane),
            _ => false,
        }
    }

    /// Release a hold whose key is no longer down before its end time.
    pub fn early_release_check(&mut self, lane: Lane, now_ms: f64, key_held: bool) -> bool {
        match self.holds[lane.index()] {
            Some(hold) if !key_held && now_ms < hold.end_ms => self.release(lane),
            _ => false,
        }
    }

    pub fn live_notes(&self, lane: Lane) -> &[RuntimeNote] {
        &self.lanes[lane.index()]
    }

    pub fn has_live_notes(&self, lane: Lane) -> bool {
        !self.lanes[lane.index()].is_empty()
    }

    pub fn active_hold(&self, lane: Lane) -> Option<&ActiveHold> {
        self.holds[lane.index()].as_ref()
    }

    /// True when no lane has a live note.
    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(Vec::is_empty)
    }

    pub fn live_count(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    /// Drop every live note and hold.
    pub fn clear(&mut self) {
        for lane in &mut self.lanes {
            lane.clear();
        }
        self.holds = [None; LANE_COUNT];
        self.next_id = 0;
    }
}
