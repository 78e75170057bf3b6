//! Harmonia - Three-Body Harmony Simulator
//!
//! Runs the engine headless for a fixed number of frames and logs the
//! outcome.
//!
//! Usage: `harmonia [seed] [frames]`. The longest runs are kept in
//! `longest_runs.json`, or wherever `HARMONIA_HISTORY` points.

use std::path::PathBuf;

use bevy::log::LogPlugin;
use bevy::prelude::*;

use harmonia::episode::RunManager;
use harmonia::rng::parse_seed;
use harmonia::simulation::SimulationPlugin;

const DEFAULT_FRAMES: u32 = 1000;

fn main() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()));

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|text| {
        parse_seed(&text)
            .inspect_err(|err| warn!("Ignoring seed argument: {}", err))
            .ok()
    });
    let frames = args.next().map_or(DEFAULT_FRAMES, |text| {
        text.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring frame count {:?}, running {} frames", text, DEFAULT_FRAMES);
            DEFAULT_FRAMES
        })
    });
    let history_path = std::env::var_os("HARMONIA_HISTORY")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("longest_runs.json"));

    app.add_plugins(SimulationPlugin {
        seed,
        history_path: Some(history_path),
        ..Default::default()
    });
    app.finish();
    app.cleanup();

    for _ in 0..frames {
        app.update();
    }

    let manager = app.world().resource::<RunManager>();
    let state = manager.state();
    let clock = state.clock();
    info!(
        "Seed {} reached tick {} ({:.2}s simulated)",
        manager.seed(),
        clock.tick,
        clock.time
    );
    info!("Harmony: {:?}", state.harmony().harmony_values());
    for pair in state.harmony().orbiting_pairs() {
        info!("{} are orbiting", pair);
    }
    for record in manager.log().recent() {
        info!(
            "Run with seed {}: {} after {:.2}s",
            record.seed, record.reason, record.duration_secs
        );
    }
}
