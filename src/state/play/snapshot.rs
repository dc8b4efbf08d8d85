use serde::Serialize;

use super::lifecycle::NoteField;
use super::play_state::SessionPhase;
use super::timer_manager::TimerManager;
use crate::config::PlayConfig;
use crate::model::{LANE_COUNT, Lane};
use crate::play::{SessionStats, Tier};

/// A live note as the renderer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteView {
    pub target_ms: f64,
    pub position: f64,
    pub is_hold: bool,
    pub end_ms: Option<f64>,
    pub tail_position: Option<f64>,
    /// This hold is currently pressed.
    pub holding: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaneView {
    pub notes: Vec<NoteView>,
    /// Hit text to display, if its timer is running.
    pub feedback: Option<Tier>,
}

/// Read-only state handed to the presentation layer once per tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaySnapshot {
    pub clock_ms: f64,
    pub phase: SessionPhase,
    pub score: u64,
    pub combo: u32,
    pub lanes: [LaneView; LANE_COUNT],
}

impl PlaySnapshot {
    pub(crate) fn capture(
        clock_ms: f64,
        phase: SessionPhase,
        stats: &SessionStats,
        field: &NoteField,
        timers: &TimerManager,
        config: &PlayConfig,
    ) -> Self {
        let duration = config.approach_duration_ms;
        let distance = config.approach_distance;

        let lanes = Lane::ALL.map(|lane| {
            let held_id = field.active_hold(lane).map(|h| h.note_id);
            let notes = field
                .live_notes(lane)
                .iter()
                .map(|note| NoteView {
                    target_ms: note.target_ms,
                    position: note.position(clock_ms, duration, distance),
                    is_hold: note.is_hold(),
                    end_ms: note.end_ms,
                    tail_position: note.tail_position(clock_ms, duration, distance),
                    holding: Some(note.id) == held_id,
                })
                .collect();
            LaneView {
                notes,
                feedback: timers.get(lane).map(|f| f.tier),
            }
        });

        Self {
            clock_ms,
            phase,
            score: stats.score(),
            combo: stats.combo(),
            lanes,
        }
    }
}
