use std::cell::Cell;
use std::time::Instant;

/// Monotonic source the host loop reads frame times from.
/// Implementations: SystemTimeProvider (wall clock), MockTimeProvider (headless runs, tests).
pub trait TimeProvider {
    /// Microseconds since an arbitrary fixed point.
    fn now_us(&self) -> i64;
}

/// Wall clock measured from construction.
#[derive(Debug)]
pub struct SystemTimeProvider {
    start: Instant,
}

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now_us(&self) -> i64 {
        self.start.elapsed().as_micros() as i64
    }
}

/// Manually driven clock. Shared by reference, so it advances through `&self`.
#[derive(Debug, Default)]
pub struct MockTimeProvider {
    current_us: Cell<i64>,
}

impl MockTimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, us: i64) {
        self.current_us.set(us);
    }

    pub fn advance(&self, delta_us: i64) {
        self.current_us.set(self.current_us.get() + delta_us);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_us(&self) -> i64 {
        self.current_us.get()
    }
}

/// Turns successive host frame callbacks into frame deltas.
#[derive(Debug, Default)]
pub struct FrameClock {
    last_us: Option<i64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the previous call; zero on the first call.
    pub fn delta_ms(&mut self, time: &dyn TimeProvider) -> f64 {
        let now = time.now_us();
        let delta_us = self.last_us.map_or(0, |last| (now - last).max(0));
        self.last_us = Some(now);
        delta_us as f64 / 1000.0
    }

    pub fn reset(&mut self) {
        self.last_us = None;
    }
}
