use thiserror::Error;

use super::note::Lane;

/// Reasons a chart is refused at session start.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Chart must have exactly 4 lanes, found {found}")]
    LaneCount { found: usize },

    #[error("Note {index} on {lane} has a non-finite time")]
    NonFiniteTime { lane: Lane, index: usize },

    #[error("Note {index} on {lane} starts before the song ({time_ms} ms)")]
    NegativeTime { lane: Lane, index: usize, time_ms: f64 },

    #[error("Note {index} on {lane} at {time_ms} ms is earlier than the previous note at {previous_ms} ms")]
    NonMonotonic {
        lane: Lane,
        index: usize,
        previous_ms: f64,
        time_ms: f64,
    },

    #[error("Hold note {index} on {lane} has no end time")]
    MissingHoldEnd { lane: Lane, index: usize },

    #[error("Hold note {index} on {lane} ends at {end_ms} ms, not after its start at {start_ms} ms")]
    HoldEndNotAfterStart {
        lane: Lane,
        index: usize,
        start_ms: f64,
        end_ms: f64,
    },

    #[error("Failed to parse chart: {0}")]
    Json(#[from] serde_json::Error),
}
