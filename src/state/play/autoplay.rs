//! Scripted input that replays the chart's own timeline.

use tracing::debug;

use super::lifecycle::{HitOutcome, NoteField};
use crate::config::PlayConfig;
use crate::model::Timeline;

/// Presses each timeline entry's lane at its target time.
///
/// The cursor only moves forward; it is rewound solely by `reset`.
#[derive(Debug, Clone)]
pub struct AutoplayAgent {
    timeline: Timeline,
    cursor: usize,
    /// Presses land when within this distance of the target (ms).
    hit_tolerance_ms: f64,
    /// Entries later than this are dropped (ms).
    catch_up_ms: f64,
    skipped: u32,
}

impl AutoplayAgent {
    pub fn new(timeline: Timeline, config: &PlayConfig) -> Self {
        Self {
            timeline,
            cursor: 0,
            hit_tolerance_ms: config.autoplay_hit_tolerance_ms,
            catch_up_ms: config.autoplay_catch_up_ms,
            skipped: 0,
        }
    }

    /// Run one tick. Presses go through `NoteField::resolve_hit` exactly as
    /// a key-down would; the judged presses are returned in order.
    pub fn update(&mut self, now_ms: f64, field: &mut NoteField) -> Vec<HitOutcome> {
        let mut hits = Vec::new();

        while let Some(entry) = self.timeline.get(self.cursor).copied() {
            let late_ms = now_ms - entry.time_ms;

            if !field.has_live_notes(entry.lane) {
                if late_ms > self.catch_up_ms {
                    debug!(
                        "autoplay skipped {} note at {:.1} ms (no live note)",
                        entry.lane, entry.time_ms
                    );
                    self.skipped += 1;
                    self.cursor += 1;
                    continue;
                }
                break;
            }

            if late_ms < -self.hit_tolerance_ms {
                // Not yet; wait for a later tick.
                break;
            }

            if late_ms > self.catch_up_ms {
                debug!(
                    "autoplay skipped {} note at {:.1} ms ({late_ms:.1} ms late)",
                    entry.lane, entry.time_ms
                );
                self.skipped += 1;
                self.cursor += 1;
                continue;
            }

            // The lane's hold ends at or before this note: let it complete
            // on its own tick instead of pressing into it.
            if field
                .active_hold(entry.lane)
                .is_some_and(|hold| hold.end_ms <= entry.time_ms)
            {
                break;
            }

            if let Some(outcome) = field.resolve_hit(entry.lane, now_ms) {
                hits.push(outcome);
            }
            self.cursor += 1;
        }

        hits
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Entries passed over without a press.
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.timeline.len()
    }

    /// Reset the agent to the beginning.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.skipped = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Lane, NoteSpec};
    use crate::play::{JudgeWindow, Tier};
    use crate::test_utils::ChartBuilder;

    fn agent_for(builder: ChartBuilder) -> AutoplayAgent {
        let chart = builder.build();
        AutoplayAgent::new(Timeline::from_chart(&chart), &PlayConfig::default())
    }

    #[test]
    fn hits_within_tolerance_and_advances() {
        let mut agent = agent_for(
            ChartBuilder::new()
                .tap(Lane::Lane1, 5.0)
                .tap(Lane::Lane2, 6.0),
        );
        let mut field = NoteField::new(JudgeWindow::normal());
        field.spawn(Lane::Lane1, NoteSpec::tap(5000.0));
        field.spawn(Lane::Lane2, NoteSpec::tap(6000.0));

        let hits = agent.update(5015.0, &mut field);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].lane, Lane::Lane1);
        assert_eq!(hits[0].tier, Tier::Perfect);
        assert_eq!(agent.cursor(), 1);
    }

    #[test]
    fn waits_before_target() {
        let mut agent = agent_for(ChartBuilder::new().tap(Lane::Lane1, 5.0));
        let mut field = NoteField::new(JudgeWindow::normal());
        field.spawn(Lane::Lane1, NoteSpec::tap(5000.0));

        assert!(agent.update(4970.0, &mut field).is_empty());
        assert_eq!(agent.cursor(), 0);
        assert_eq!(field.live_count(), 1);
    }

    #[test]
    fn skips_entry_without_live_note_once_late() {
        let mut agent = agent_for(
            ChartBuilder::new()
                .tap(Lane::Lane1, 1.0)
                .tap(Lane::Lane2, 1.2),
        );
        let mut field = NoteField::new(JudgeWindow::normal());
        field.spawn(Lane::Lane2, NoteSpec::tap(1200.0));

        // Lane 1 has nothing live: the agent waits until the catch-up limit.
        assert!(agent.update(1050.0, &mut field).is_empty());
        assert_eq!(agent.cursor(), 0);

        let hits = agent.update(1200.0, &mut field);
        assert_eq!(agent.skipped(), 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].lane, Lane::Lane2);
        assert!(agent.is_finished());
    }

    #[test]
    fn chord_is_pressed_in_one_tick() {
        let mut agent = agent_for(
            ChartBuilder::new()
                .tap(Lane::Lane1, 1.0)
                .tap(Lane::Lane4, 1.0),
        );
        let mut field = NoteField::new(JudgeWindow::normal());
        field.spawn(Lane::Lane1, NoteSpec::tap(1000.0));
        field.spawn(Lane::Lane4, NoteSpec::tap(1000.0));

        let hits = agent.update(1000.0, &mut field);
        assert_eq!(hits.len(), 2);
        assert!(field.is_empty());
    }

    #[test]
    fn waits_for_hold_ending_at_next_note() {
        let mut agent = agent_for(
            ChartBuilder::new()
                .hold(Lane::Lane1, 2.0, 2.5)
                .tap(Lane::Lane1, 2.5),
        );
        let mut field = NoteField::new(JudgeWindow::normal());
        field.spawn(Lane::Lane1, NoteSpec::hold(2000.0, 2500.0));
        field.spawn(Lane::Lane1, NoteSpec::tap(2500.0));

        let hits = agent.update(2000.0, &mut field);
        assert!(hits[0].started_hold);

        // Within tolerance of the tap, but the hold is still running.
        assert!(agent.update(2485.0, &mut field).is_empty());
        assert_eq!(agent.cursor(), 1);

        assert!(field.complete_hold(Lane::Lane1, 2500.0));
        let hits = agent.update(2500.0, &mut field);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tier, Tier::Perfect);
        assert!(agent.is_finished());
        assert!(field.is_empty());
    }

    #[test]
    fn reset_rewinds_cursor() {
        let mut agent = agent_for(ChartBuilder::new().tap(Lane::Lane1, 1.0));
        let mut field = NoteField::new(JudgeWindow::normal());
        field.spawn(Lane::Lane1, NoteSpec::tap(1000.0));
        agent.update(1000.0, &mut field);
        assert!(agent.is_finished());

        agent.reset();
        assert_eq!(agent.cursor(), 0);
        assert!(!agent.is_finished());
    }
}
