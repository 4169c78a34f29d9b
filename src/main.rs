//! Trail Rider headless runner
//!
//! Runs the simulation at its fixed rate without a renderer, logging the HUD.
//! With `--autopilot` a second thread plays by writing the shared input flags,
//! the way a keyboard handler would.
//!
//! Usage:
//!   RUST_LOG=info cargo run -- --seed 42 --seconds 20 --autopilot

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use trail_rider::platform::{CancelToken, Clock, InputHandle, Key, SystemClock};
use trail_rider::sim::GameStatus;
use trail_rider::{Game, Settings, SettingsError};

#[derive(Parser)]
#[command(name = "trail-rider")]
#[command(about = "Run the Trail Rider simulation headless")]
struct Args {
    /// Settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Level seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,

    /// Wall-clock seconds to run
    #[arg(long, default_value_t = 30.0)]
    seconds: f64,

    /// Drive the bike from a scripted input thread
    #[arg(long)]
    autopilot: bool,

    /// Write the final render snapshot as JSON
    #[arg(long)]
    dump: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), RunError> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if args.seed.is_some() {
        settings.seed = args.seed;
    }

    let clock = SystemClock::new();
    let input = InputHandle::default();
    let cancel = CancelToken::new();
    let game = Game::new(settings, input.clone(), clock.now());

    let pilot = args
        .autopilot
        .then(|| spawn_autopilot(input.clone(), cancel.clone()));

    let deadline = args.seconds;
    let mut next_report = 1.0;
    let game = game.run(&clock, &cancel, |game, _report, now| {
        if now >= next_report {
            let hud = game.hud(now);
            log::info!(
                "[{:>5.1}s] {:?} apples {}/{} time {:.1}s",
                now,
                hud.status,
                hud.collected,
                hud.total,
                hud.elapsed_seconds
            );
            next_report = now.floor() + 1.0;
        }
        if now >= deadline {
            cancel.cancel();
        }
    });

    // The loop has returned; only now let the input thread go
    cancel.cancel();
    if let Some(handle) = pilot {
        if handle.join().is_err() {
            log::warn!("Autopilot thread panicked");
        }
    }

    let now = clock.now();
    let hud = game.hud(now);
    println!(
        "Finished: {:?}, {}/{} apples, {:.1}s",
        hud.status, hud.collected, hud.total, hud.elapsed_seconds
    );

    if let Some(path) = &args.dump {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &game.render_snapshot())?;
        log::info!("Snapshot written to {}", path.display());
    }

    if game.status() == GameStatus::Won {
        log::info!("The flower was reached");
    }
    Ok(())
}

/// Press start, hold the throttle, tap enter now and then to restart after a crash
fn spawn_autopilot(input: InputHandle, cancel: CancelToken) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let tick = Duration::from_millis(50);
        let mut elapsed = Duration::ZERO;

        input.set(Key::Up, true);
        while !cancel.is_cancelled() {
            // Enter pulses for one tick every 2 seconds
            let pulse = elapsed.as_millis() % 2000 < 50;
            input.set(Key::Enter, pulse);
            // Lean back a little every other second to keep the front wheel light
            input.set(Key::Left, (elapsed.as_millis() / 1000) % 2 == 1);

            thread::sleep(tick);
            elapsed += tick;
        }
        input.release_all();
    })
}
