/// Read-only view of the backing music track, used for end-of-session
/// detection only.
/// Implementations: the host's audio output, SimulatedTrack (headless/testing).
pub trait PlaybackClock {
    /// Track length in milliseconds, if known.
    fn duration_ms(&self) -> Option<f64>;

    /// Current playback position in milliseconds.
    fn position_ms(&self) -> f64;

    /// Whether the backend reported the end of the track.
    fn has_ended(&self) -> bool;
}

/// Track stand-in whose position is driven by the caller.
#[derive(Debug, Clone, Default)]
pub struct SimulatedTrack {
    duration_ms: Option<f64>,
    position_ms: f64,
}

impl SimulatedTrack {
    pub fn new(duration_ms: Option<f64>) -> Self {
        Self {
            duration_ms,
            position_ms: 0.0,
        }
    }

    pub fn advance(&mut self, delta_ms: f64) {
        self.position_ms += delta_ms;
        if let Some(duration) = self.duration_ms {
            self.position_ms = self.position_ms.min(duration);
        }
    }

    pub fn seek(&mut self, position_ms: f64) {
        self.position_ms = position_ms;
    }
}

impl PlaybackClock for SimulatedTrack {
    fn duration_ms(&self) -> Option<f64> {
        self.duration_ms
    }

    fn position_ms(&self) -> f64 {
        self.position_ms
    }

    fn has_ended(&self) -> bool {
        self.duration_ms
            .is_some_and(|d| d > 0.0 && self.position_ms >= d)
    }
}

/// Returns true when the track is over or within `epsilon_ms` of its end.
/// A missing or zero duration never counts as ended.
pub fn track_finished(track: &dyn PlaybackClock, epsilon_ms: f64) -> bool {
    if track.has_ended() {
        return true;
    }
    match track.duration_ms() {
        Some(duration) if duration > 0.0 => track.position_ms() >= duration - epsilon_ms,
        _ => false,
    }
}
