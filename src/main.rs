use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info, warn};

use laneplay::config::PlayConfig;
use laneplay::input::{KeyBindings, KeyScript};
use laneplay::model::Chart;
use laneplay::record::{RecordStore, SubmitOutcome, chart_key};
use laneplay::state::play::{PlayEvent, Session, SessionPhase};
use laneplay::traits::audio::SimulatedTrack;
use laneplay::traits::time::{FrameClock, MockTimeProvider, SystemTimeProvider, TimeProvider};
use laneplay::util::init_logging;

/// Simulated time after the last note before a run is given up on (ms).
const RUN_GRACE_MS: f64 = 10_000.0;

#[derive(Parser, Debug)]
#[command(name = "laneplay", about = "Headless four-lane chart player")]
struct Args {
    /// Chart JSON file.
    chart: PathBuf,

    /// Play config JSON file. Defaults are used when it does not exist.
    #[arg(long, env = "LANEPLAY_CONFIG", default_value = "play.json")]
    config: PathBuf,

    /// Key binding JSON file.
    #[arg(long, default_value = "keyconfig.json")]
    keys: PathBuf,

    /// Let auto-play press every note.
    #[arg(long)]
    autoplay: bool,

    /// Key event script (JSON array of `{key, pressed, timeMs}`) to play with.
    #[arg(long, conflicts_with = "autoplay")]
    inputs: Option<PathBuf>,

    /// Host frame rate to simulate.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Pace frames against the wall clock instead of simulating them.
    #[arg(long)]
    realtime: bool,

    /// Length of the backing track in seconds. Omit for no track.
    #[arg(long)]
    audio_duration: Option<f64>,

    /// Best-record file to submit the result to. Only played runs count.
    #[arg(long, requires = "inputs")]
    records: Option<PathBuf>,

    /// Also write logs to a daily rolling file in this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_dir.as_deref(), args.verbose)?;

    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be a positive number, got {}", args.fps);
    }

    let config = PlayConfig::load_from(&args.config)?;
    let bindings = KeyBindings::load_from(&args.keys)?;
    let chart = Chart::load_from(&args.chart)?;
    info!(path = %args.chart.display(), "Loaded chart");
    let mut script = match &args.inputs {
        Some(path) => {
            let script = KeyScript::load_from(path)?;
            info!(path = %path.display(), events = script.len(), "Loaded key script");
            Some(script)
        }
        None => None,
    };
    if script.is_none() && !args.autoplay {
        warn!("no input source; every note will miss");
    }

    let time_limit_ms = chart.last_event_ms() + config.approach_duration_ms + RUN_GRACE_MS;
    let mut session = Session::new(chart, config, &bindings, args.autoplay)?;
    let mut track = SimulatedTrack::new(args.audio_duration.map(|secs| secs * 1000.0));

    let frame_us = (1_000_000.0 / args.fps).round() as i64;
    if args.realtime {
        let time = SystemTimeProvider::new();
        let frame = Duration::from_micros(frame_us as u64);
        drive(&mut session, &mut track, script.as_mut(), &time, time_limit_ms, || {
            thread::sleep(frame)
        });
    } else {
        let time = MockTimeProvider::new();
        drive(&mut session, &mut track, script.as_mut(), &time, time_limit_ms, || {
            time.advance(frame_us)
        });
    }

    let result = session
        .take_result()
        .context("Session was aborted before it finished")?;

    // clap guarantees a key script alongside `--records`.
    if let Some(path) = &args.records {
        let key = chart_key(&args.chart)?;
        let mut store = RecordStore::load_from(path)?;
        if store.submit(&key, &result) != SubmitOutcome::IgnoredAutoplay {
            store.save_to(path)?;
        }
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Host loop: one `wait` per frame, then feed the measured delta to the
/// track and the session until the session leaves `Playing`.
fn drive(
    session: &mut Session,
    track: &mut SimulatedTrack,
    mut script: Option<&mut KeyScript>,
    time: &dyn TimeProvider,
    time_limit_ms: f64,
    mut wait: impl FnMut(),
) {
    let mut frame_clock = FrameClock::new();
    let start_us = time.now_us();
    frame_clock.delta_ms(time);

    while session.phase() == SessionPhase::Playing {
        wait();
        let dt_ms = frame_clock.delta_ms(time);
        track.advance(dt_ms);
        match script.as_deref_mut() {
            Some(script) => session.frame_scripted(dt_ms, script, track),
            None => session.frame(dt_ms, track),
        };

        for event in session.drain_events() {
            if let PlayEvent::Judged {
                lane,
                tier,
                time_diff_ms,
            } = event
            {
                debug!("{lane}: {} ({time_diff_ms:+.1} ms)", tier.as_str());
            }
        }

        if (time.now_us() - start_us) as f64 / 1000.0 > time_limit_ms {
            warn!("session did not end in time, aborting");
            session.abort();
        }
    }
}
