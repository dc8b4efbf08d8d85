use serde::Serialize;
use tracing::{debug, info, warn};

use super::autoplay::AutoplayAgent;
use super::error::SessionError;
use super::lifecycle::{HitOutcome, NoteField};
use super::snapshot::PlaySnapshot;
use super::timer_manager::TimerManager;
use crate::config::PlayConfig;
use crate::input::{InputResolver, KeyBindings, KeyScript, LaneInput};
use crate::model::{Chart, ChartData, Lane, SpawnSchedule, Timeline};
use crate::play::{PlayResult, SessionStats, Tier, TimingStats};
use crate::traits::audio::{PlaybackClock, track_finished};

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionPhase {
    /// Ticks are running.
    Playing,
    /// Song finished; the result is final.
    Finished,
    /// Torn down before the end.
    Aborted,
}

/// Notification for the feedback collaborator, drained by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayEvent {
    Judged {
        lane: Lane,
        tier: Tier,
        time_diff_ms: f64,
    },
    Missed {
        lane: Lane,
    },
    HoldReleased {
        lane: Lane,
    },
    HoldCompleted {
        lane: Lane,
    },
    SessionEnded,
}

/// One play of one chart: the fixed-timestep simulation and everything it
/// mutates. Owned by whatever orchestrates select -> play -> result.
pub struct Session {
    config: PlayConfig,
    chart: Chart,
    phase: SessionPhase,
    /// Session time of the last tick (ms).
    clock_ms: f64,
    tick_count: u64,
    accumulator_ms: f64,
    schedule: SpawnSchedule,
    field: NoteField,
    input: InputResolver,
    autoplay: Option<AutoplayAgent>,
    stats: SessionStats,
    timing: TimingStats,
    timers: TimerManager,
    events: Vec<PlayEvent>,
    result: Option<PlayResult>,
    result_taken: bool,
}

impl Session {
    /// Create a session in the `Playing` phase at clock zero.
    pub fn new(
        chart: Chart,
        config: PlayConfig,
        bindings: &KeyBindings,
        autoplay: bool,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        bindings.validate()?;

        let schedule = SpawnSchedule::from_chart(&chart, config.approach_duration_ms);
        let autoplay = autoplay.then(|| AutoplayAgent::new(Timeline::from_chart(&chart), &config));
        let total_notes = chart.total_notes() as u32;

        info!(
            "session start: {} notes, autoplay {}",
            total_notes,
            if autoplay.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            field: NoteField::new(config.judge),
            input: InputResolver::new(bindings),
            timers: TimerManager::new(config.feedback_duration_ms),
            stats: SessionStats::new(total_notes),
            timing: TimingStats::default(),
            phase: SessionPhase::Playing,
            clock_ms: 0.0,
            tick_count: 0,
            accumulator_ms: 0.0,
            schedule,
            autoplay,
            events: Vec::new(),
            result: None,
            result_taken: false,
            config,
            chart,
        })
    }

    /// Validate parser output and create a session from it.
    pub fn from_data(
        data: &ChartData,
        config: PlayConfig,
        bindings: &KeyBindings,
        autoplay: bool,
    ) -> Result<Self, SessionError> {
        let chart = Chart::from_data(data).inspect_err(|e| warn!("refusing to start: {e}"))?;
        Self::new(chart, config, bindings, autoplay)
    }

    /// Host per-frame callback. Runs as many fixed ticks as the accumulated
    /// time allows, checking for the end of the session after each one.
    pub fn frame(&mut self, frame_dt_ms: f64, track: &dyn PlaybackClock) -> SessionPhase {
        if self.phase != SessionPhase::Playing {
            return self.phase;
        }

        if frame_dt_ms.is_finite() && frame_dt_ms > 0.0 {
            self.accumulator_ms += frame_dt_ms;
        }

        let interval = self.config.tick_interval_ms();
        let mut ticks = 0;
        while self.accumulator_ms >= interval {
            if ticks == self.config.max_ticks_per_frame {
                warn!(
                    "dropping {:.1} ms of simulation backlog",
                    self.accumulator_ms
                );
                self.accumulator_ms = 0.0;
                break;
            }
            self.accumulator_ms -= interval;
            self.tick();
            ticks += 1;

            if self.check_end(track) {
                break;
            }
        }

        // An empty chart ends even before the first tick.
        if ticks == 0 {
            self.check_end(track);
        }

        self.phase
    }

    /// Like `frame`, but replays the script's events that fall inside this
    /// frame. The frame is split at each event so that a press is judged at
    /// the event's own time rather than at the frame boundary.
    pub fn frame_scripted(
        &mut self,
        frame_dt_ms: f64,
        script: &mut KeyScript,
        track: &dyn PlaybackClock,
    ) -> SessionPhase {
        if self.phase != SessionPhase::Playing {
            return self.phase;
        }
        let frame_dt_ms = if frame_dt_ms.is_finite() {
            frame_dt_ms.max(0.0)
        } else {
            0.0
        };

        let start_ms = self.input_time_ms();
        let mut elapsed_ms = 0.0;
        while let Some(event) = script.next_due(start_ms + frame_dt_ms) {
            let offset_ms = (event.time_ms - start_ms).max(0.0);
            if offset_ms > elapsed_ms {
                self.frame(offset_ms - elapsed_ms, track);
                elapsed_ms = offset_ms;
            }
            if self.phase != SessionPhase::Playing {
                return self.phase;
            }
            if event.pressed {
                self.key_down(&event.key);
            } else {
                self.key_up(&event.key);
            }
        }
        self.frame(frame_dt_ms - elapsed_ms, track)
    }

    /// One fixed simulation step.
    fn tick(&mut self) {
        self.tick_count += 1;
        let now = self.tick_count as f64 * self.config.tick_interval_ms();
        self.clock_ms = now;

        for spawn in self.schedule.due(now) {
            self.field.spawn(spawn.lane, spawn.spec);
        }

        // Ageing runs before any press of this tick.
        for &lane in Lane::all() {
            for _ in 0..self.field.age_out(lane, now) {
                self.record_miss(lane);
            }
            if self.field.complete_hold(lane, now) {
                self.events.push(PlayEvent::HoldCompleted { lane });
            }
            if self.autoplay.is_none()
                && self
                    .field
                    .early_release_check(lane, now, self.input.is_held(lane))
            {
                self.events.push(PlayEvent::HoldReleased { lane });
            }
        }

        let hits = match self.autoplay.as_mut() {
            Some(agent) => agent.update(now, &mut self.field),
            None => Vec::new(),
        };
        for hit in hits {
            self.apply_hit(hit);
        }

        self.timers.expire(now);
    }

    fn check_end(&mut self, track: &dyn PlaybackClock) -> bool {
        if !self.field.is_empty() {
            return false;
        }
        if self.schedule.is_exhausted() || track_finished(track, self.config.end_epsilon_ms) {
            self.finish();
            return true;
        }
        false
    }

    fn finish(&mut self) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        self.phase = SessionPhase::Finished;
        self.teardown_runtime();

        let result = PlayResult::finalize(self.stats.clone(), self.timing, self.is_autoplay());
        info!(
            "session end at {:.1} ms: score {}, max combo {}/{}, accuracy {:.2}%{}",
            self.clock_ms,
            result.score(),
            result.stats().max_combo(),
            result.stats().total_notes(),
            result.accuracy(),
            if result.is_full_combo() { " (full combo)" } else { "" }
        );
        self.result = Some(result);
        self.events.push(PlayEvent::SessionEnded);
    }

    fn apply_hit(&mut self, hit: HitOutcome) {
        self.stats.record(hit.tier);
        self.timing.record(hit.tier, hit.time_diff_ms);
        self.timers.set(hit.lane, hit.tier, self.clock_ms);
        self.events.push(PlayEvent::Judged {
            lane: hit.lane,
            tier: hit.tier,
            time_diff_ms: hit.time_diff_ms,
        });
    }

    fn record_miss(&mut self, lane: Lane) {
        self.stats.record(Tier::Miss);
        self.timers.set(lane, Tier::Miss, self.clock_ms);
        self.events.push(PlayEvent::Missed { lane });
    }

    /// Raw key-down from the host. Returns the judged press, if any.
    /// Ignored while auto-play drives the session.
    pub fn key_down(&mut self, key: &str) -> Option<HitOutcome> {
        if self.phase != SessionPhase::Playing || self.autoplay.is_some() {
            return None;
        }
        let Some(LaneInput::Press(lane)) = self.input.key_down(key) else {
            return None;
        };
        let hit = self.field.resolve_hit(lane, self.input_time_ms())?;
        self.apply_hit(hit);
        Some(hit)
    }

    /// Raw key-up from the host. Returns true if a hold was released.
    pub fn key_up(&mut self, key: &str) -> bool {
        if self.phase != SessionPhase::Playing || self.autoplay.is_some() {
            return false;
        }
        let Some(LaneInput::Release(lane)) = self.input.key_up(key) else {
            return false;
        };
        let released = self.field.release(lane);
        if released {
            self.events.push(PlayEvent::HoldReleased { lane });
        }
        released
    }

    /// Cancel pending spawns and timers and drop every live note.
    fn teardown_runtime(&mut self) {
        self.schedule.cancel();
        self.field.clear();
        self.timers.clear();
        self.input.release_all();
        self.accumulator_ms = 0.0;
    }

    /// Tear the session down mid-play. Nothing scheduled runs afterwards and
    /// the stats stay as they were.
    pub fn abort(&mut self) {
        self.teardown_runtime();
        self.events.clear();
        if self.phase == SessionPhase::Playing {
            info!("session aborted at {:.1} ms", self.clock_ms);
            self.phase = SessionPhase::Aborted;
        }
    }

    /// Start the same chart again from clock zero.
    pub fn restart(&mut self) {
        self.abort();

        self.schedule.reset();
        self.stats.reset();
        self.timing = TimingStats::default();
        if let Some(agent) = self.autoplay.as_mut() {
            agent.reset();
        }
        self.clock_ms = 0.0;
        self.tick_count = 0;
        self.result = None;
        self.result_taken = false;
        self.phase = SessionPhase::Playing;
        debug!("session restarted");
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Time a key event arriving now is judged at: the last tick plus the
    /// frame time not yet consumed by a tick.
    pub fn input_time_ms(&self) -> f64 {
        self.clock_ms + self.accumulator_ms
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn timing(&self) -> &TimingStats {
        &self.timing
    }

    pub fn field(&self) -> &NoteField {
        &self.field
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn config(&self) -> &PlayConfig {
        &self.config
    }

    pub fn is_autoplay(&self) -> bool {
        self.autoplay.is_some()
    }

    pub fn pending_spawns(&self) -> usize {
        self.schedule.pending()
    }

    pub fn timers(&self) -> &TimerManager {
        &self.timers
    }

    /// Events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<PlayEvent> {
        std::mem::take(&mut self.events)
    }

    /// State for the presentation layer.
    pub fn snapshot(&self) -> PlaySnapshot {
        PlaySnapshot::capture(
            self.clock_ms,
            self.phase,
            &self.stats,
            &self.field,
            &self.timers,
            &self.config,
        )
    }

    /// The finalized result, once the session has finished.
    pub fn result(&self) -> Option<&PlayResult> {
        self.result.as_ref()
    }

    /// Hand the finalized result to persistence. Yields it exactly once.
    pub fn take_result(&mut self) -> Option<PlayResult> {
        if self.result_taken {
            return None;
        }
        let result = self.result.clone()?;
        self.result_taken = true;
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ChartBuilder;
    use crate::traits::audio::SimulatedTrack;

    const TICK: f64 = 1000.0 / 60.0;

    fn session(builder: ChartBuilder, autoplay: bool) -> Session {
        Session::new(
            builder.build(),
            PlayConfig::default(),
            &KeyBindings::default(),
            autoplay,
        )
        .unwrap()
    }

    /// Run whole ticks until the clock reaches `until_ms`.
    fn run_until(session: &mut Session, track: &SimulatedTrack, until_ms: f64) {
        while session.clock_ms() + TICK <= until_ms + 1e-6
            && session.phase() == SessionPhase::Playing
        {
            session.frame(TICK, track);
        }
    }

    #[test]
    fn tick_count_follows_accumulated_time() {
        let mut s = session(ChartBuilder::new().tap(Lane::Lane1, 10.0), false);
        let track = SimulatedTrack::new(None);

        s.frame(TICK * 0.5, &track);
        assert_eq!(s.clock_ms(), 0.0);
        s.frame(TICK * 0.5, &track);
        assert!((s.clock_ms() - TICK).abs() < 1e-9);
        for _ in 0..3 {
            s.frame(TICK, &track);
        }
        assert!((s.clock_ms() - TICK * 4.0).abs() < 1e-6);
    }

    #[test]
    fn frame_rate_does_not_change_simulation() {
        let chart = ChartBuilder::new().stream(1.0, 0.25, 12);
        let mut fast = session(chart.clone(), true);
        let mut slow = session(chart, true);
        let track = SimulatedTrack::new(None);

        for _ in 0..600 {
            fast.frame(1000.0 / 144.0, &track);
        }
        for _ in 0..125 {
            slow.frame(1000.0 / 30.0, &track);
        }
        assert_eq!(fast.phase(), SessionPhase::Finished);
        assert_eq!(slow.phase(), SessionPhase::Finished);
        assert_eq!(fast.result(), slow.result());
    }

    #[test]
    fn notes_spawn_at_approach_time() {
        let mut s = session(ChartBuilder::new().tap(Lane::Lane1, 3.0), false);
        let track = SimulatedTrack::new(None);

        run_until(&mut s, &track, 1400.0);
        assert_eq!(s.field().live_count(), 0);
        run_until(&mut s, &track, 1600.0);
        assert_eq!(s.field().live_count(), 1);
        assert_eq!(s.pending_spawns(), 0);
    }

    #[test]
    fn unpressed_note_is_missed_and_session_ends() {
        let mut s = session(ChartBuilder::new().tap(Lane::Lane1, 1.0), false);
        let track = SimulatedTrack::new(None);

        run_until(&mut s, &track, 1090.0);
        assert_eq!(s.stats().miss_count(), 0);
        run_until(&mut s, &track, 1130.0);

        assert_eq!(s.stats().miss_count(), 1);
        assert_eq!(s.stats().combo(), 0);
        assert_eq!(s.phase(), SessionPhase::Finished);
        let events = s.drain_events();
        assert!(events.contains(&PlayEvent::Missed { lane: Lane::Lane1 }));
        assert_eq!(events.last(), Some(&PlayEvent::SessionEnded));
    }

    #[test]
    fn key_press_is_judged_at_session_clock() {
        let mut s = session(ChartBuilder::new().tap(Lane::Lane2, 1.0).tap(Lane::Lane2, 2.0), false);
        let track = SimulatedTrack::new(None);

        run_until(&mut s, &track, 1010.0);
        let hit = s.key_down("d").unwrap();
        assert_eq!(hit.tier, Tier::Perfect);
        assert_eq!(s.stats().score(), 300);
        assert_eq!(s.stats().combo(), 1);
        assert_eq!(s.snapshot().lanes[1].feedback, Some(Tier::Perfect));

        // Key repeat while held does nothing.
        run_until(&mut s, &track, 2000.0);
        assert!(s.key_down("d").is_none());
        s.key_up("d");
        assert!(s.key_down("d").is_some());
        assert_eq!(s.stats().combo(), 2);
    }

    #[test]
    fn press_without_note_is_noop() {
        let mut s = session(ChartBuilder::new().tap(Lane::Lane1, 2.0), false);
        let track = SimulatedTrack::new(None);

        run_until(&mut s, &track, 500.0);
        assert!(s.key_down("s").is_none());
        assert_eq!(s.stats().judged_count(), 0);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn hold_released_early_is_not_penalized() {
        let mut s = session(ChartBuilder::new().hold(Lane::Lane3, 2.0, 3.0), false);
        let track = SimulatedTrack::new(None);

        run_until(&mut s, &track, 2010.0);
        let hit = s.key_down("k").unwrap();
        assert!(hit.started_hold);
        assert_eq!(s.stats().combo(), 1);

        run_until(&mut s, &track, 2500.0);
        assert!(s.key_up("k"));
        assert_eq!(s.stats().miss_count(), 0);
        assert_eq!(s.stats().score(), 300);
        assert_eq!(s.stats().combo(), 1);
        assert!(s.field().is_empty());
    }

    #[test]
    fn held_hold_completes_at_end_time() {
        let mut s = session(ChartBuilder::new().hold(Lane::Lane4, 1.0, 2.0), false);
        let track = SimulatedTrack::new(None);

        run_until(&mut s, &track, 1000.0);
        s.key_down("l").unwrap();
        run_until(&mut s, &track, 1990.0);
        assert!(s.field().active_hold(Lane::Lane4).is_some());
        assert!(s.snapshot().lanes[3].notes[0].holding);

        s.frame(TICK, &track);
        assert_eq!(s.phase(), SessionPhase::Finished);
        assert!(s.drain_events().contains(&PlayEvent::HoldCompleted { lane: Lane::Lane4 }));
        assert_eq!(s.stats().score(), 300);
    }

    #[test]
    fn autoplay_clears_chart_with_full_combo() {
        let mut s = session(
            ChartBuilder::new()
                .stream(1.0, 0.125, 16)
                .hold(Lane::Lane1, 4.0, 5.0),
            true,
        );
        let track = SimulatedTrack::new(None);
        run_until(&mut s, &track, 10_000.0);

        let result = s.result().unwrap();
        assert!(result.is_autoplay());
        assert!(result.is_full_combo());
        assert_eq!(result.stats().perfect_count(), 17);
        assert!((result.accuracy() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn human_keys_are_ignored_under_autoplay() {
        let mut s = session(ChartBuilder::new().tap(Lane::Lane1, 1.0), true);
        let track = SimulatedTrack::new(None);
        run_until(&mut s, &track, 990.0);
        assert!(s.key_down("s").is_none());
        assert!(!s.key_up("s"));
    }

    #[test]
    fn audio_end_with_empty_lanes_finishes() {
        let mut s = session(ChartBuilder::new().tap(Lane::Lane1, 30.0), false);
        let mut track = SimulatedTrack::new(Some(5000.0));

        track.seek(4960.0);
        s.frame(TICK, &track);
        assert_eq!(s.phase(), SessionPhase::Finished);
        assert_eq!(s.pending_spawns(), 0);
        assert_eq!(s.result().unwrap().stats().judged_count(), 0);
    }

    #[test]
    fn audio_end_waits_for_live_notes() {
        let mut s = session(ChartBuilder::new().tap(Lane::Lane1, 1.0), false);
        let mut track = SimulatedTrack::new(Some(500.0));

        run_until(&mut s, &track, 600.0);
        track.seek(500.0);
        s.frame(TICK, &track);
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert_eq!(s.field().live_count(), 1);
    }

    #[test]
    fn empty_chart_finishes_immediately() {
        let mut s = session(ChartBuilder::new(), false);
        let track = SimulatedTrack::new(None);
        assert_eq!(s.frame(0.0, &track), SessionPhase::Finished);
        assert!(s.result().unwrap().is_full_combo());
    }

    #[test]
    fn result_is_handed_over_once() {
        let mut s = session(ChartBuilder::new().tap(Lane::Lane1, 0.5), true);
        let track = SimulatedTrack::new(None);
        run_until(&mut s, &track, 2000.0);

        let first = s.take_result().unwrap();
        assert!(s.take_result().is_none());
        assert_eq!(s.result(), Some(&first));

        // Further frames are no-ops.
        s.frame(1000.0, &track);
        assert_eq!(s.result(), Some(&first));
    }

    #[test]
    fn abort_cancels_everything() {
        let mut s = session(ChartBuilder::new().stream(1.0, 0.5, 8), false);
        let track = SimulatedTrack::new(None);
        run_until(&mut s, &track, 1050.0);
        assert_eq!(s.stats().miss_count(), 0);
        assert!(s.field().live_count() > 0);

        s.abort();
        assert_eq!(s.phase(), SessionPhase::Aborted);
        assert_eq!(s.pending_spawns(), 0);
        assert!(s.field().is_empty());
        assert_eq!(s.timers().active_count(), 0);

        let stats_before = s.stats().clone();
        for _ in 0..600 {
            s.frame(TICK, &track);
        }
        assert!(s.key_down("s").is_none());
        assert_eq!(s.stats(), &stats_before);
        assert!(s.result().is_none());
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn restart_replays_from_zero() {
        let mut s = session(ChartBuilder::new().tap(Lane::Lane1, 1.0), false);
        let track = SimulatedTrack::new(None);
        run_until(&mut s, &track, 1500.0);
        assert_eq!(s.phase(), SessionPhase::Finished);

        s.restart();
        assert_eq!(s.phase(), SessionPhase::Playing);
        assert_eq!(s.clock_ms(), 0.0);
        assert_eq!(s.stats().judged_count(), 0);
        assert!(s.result().is_none());
        assert_eq!(s.pending_spawns(), 1);

        run_until(&mut s, &track, 1000.0);
        assert_eq!(s.key_down("s").unwrap().tier, Tier::Perfect);
    }

    #[test]
    fn stalled_host_drops_backlog() {
        let mut s = session(ChartBuilder::new().tap(Lane::Lane1, 100.0), false);
        let track = SimulatedTrack::new(None);
        let max = s.config().max_ticks_per_frame as f64;

        s.frame(TICK * (max + 10.0), &track);
        assert!((s.clock_ms() - TICK * max).abs() < 1e-6);
        s.frame(0.0, &track);
        assert!((s.clock_ms() - TICK * max).abs() < 1e-6);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = PlayConfig {
            tick_rate_hz: -1.0,
            ..Default::default()
        };
        let result = Session::new(
            ChartBuilder::new().build(),
            config,
            &KeyBindings::default(),
            false,
        );
        assert!(matches!(result, Err(SessionError::Config(_))));
    }

    #[test]
    fn from_data_rejects_malformed_chart() {
        let builder = ChartBuilder::new().tap(Lane::Lane1, 2.0).tap(Lane::Lane1, 1.0);
        let result = Session::from_data(
            builder.data(),
            PlayConfig::default(),
            &KeyBindings::default(),
            false,
        );
        assert!(matches!(result, Err(SessionError::Chart(_))));
    }
}
