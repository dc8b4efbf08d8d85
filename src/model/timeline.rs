use super::chart::Chart;
use super::note::{Lane, NoteSpec};

/// One entry of the chart flattened across lanes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineEntry {
    pub time_ms: f64,
    pub lane: Lane,
}

/// All notes of a chart in ascending target time, built once per session.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn from_chart(chart: &Chart) -> Self {
        let mut entries: Vec<TimelineEntry> = Lane::all()
            .iter()
            .flat_map(|&lane| {
                chart.lane_notes(lane).iter().map(move |n| TimelineEntry {
                    time_ms: n.target_ms,
                    lane,
                })
            })
            .collect();

        // Stable sort keeps lane order for simultaneous notes.
        entries.sort_by(|a, b| a.time_ms.total_cmp(&b.time_ms));
        Self { entries }
    }

    pub fn get(&self, index: usize) -> Option<&TimelineEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A note waiting for its spawn moment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledSpawn {
    pub spawn_ms: f64,
    pub lane: Lane,
    pub spec: NoteSpec,
}

/// Spawn times of every note, sorted, consumed through a cursor.
///
/// Replaces per-note timers: a restart only needs `reset`.
#[derive(Debug, Clone, Default)]
pub struct SpawnSchedule {
    spawns: Vec<ScheduledSpawn>,
    cursor: usize,
}

impl SpawnSchedule {
    pub fn from_chart(chart: &Chart, approach_duration_ms: f64) -> Self {
        let mut spawns: Vec<ScheduledSpawn> = Lane::all()
            .iter()
            .flat_map(|&lane| {
                chart.lane_notes(lane).iter().map(move |&spec| ScheduledSpawn {
                    spawn_ms: spec.target_ms - approach_duration_ms,
                    lane,
                    spec,
                })
            })
            .collect();
        spawns.sort_by(|a, b| a.spawn_ms.total_cmp(&b.spawn_ms));
        Self { spawns, cursor: 0 }
    }

    /// Return every spawn due at `now_ms` and move the cursor past them.
    pub fn due(&mut self, now_ms: f64) -> &[ScheduledSpawn] {
        let start = self.cursor;
        while self
            .spawns
            .get(self.cursor)
            .is_some_and(|s| s.spawn_ms <= now_ms)
        {
            self.cursor += 1;
        }
        &self.spawns[start..self.cursor]
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.spawns.len()
    }

    /// Drop every pending spawn.
    pub fn cancel(&mut self) {
        self.cursor = self.spawns.len();
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn pending(&self) -> usize {
        self.spawns.len() - self.cursor
    }
}
