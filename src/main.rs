//! Dryer headless runner
//!
//! Usage: `dryer [settings.json] [seconds]`
//!
//! Runs the drum with a drifting parameter source, logs every note and prints
//! a JSON summary when done. Set `RUST_LOG=debug` for per-note output.

use std::collections::BTreeMap;

use serde::Serialize;

use dryer::consts::FRAME_DT;
use dryer::sim::{DispatchStats, Diagnostics};
use dryer::{DriftSource, Runner, Settings, TriggerOutput};

const DEFAULT_SECONDS: f32 = 30.0;
const DRIFT_SEED: u64 = 0x0d12_7e12;

#[derive(Debug, Serialize)]
struct Summary {
    seconds: f32,
    frames: u64,
    notes: usize,
    drum_triggers: usize,
    vane_triggers: usize,
    per_surface: BTreeMap<String, usize>,
    stats: DispatchStats,
    final_vanes: u32,
    diagnostics: Diagnostics,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let seconds = match args.next().map(|s| s.parse::<f32>()) {
        Some(Ok(s)) if s.is_finite() && s > 0.0 => s,
        Some(_) => {
            log::warn!("Invalid duration, running for {} s", DEFAULT_SECONDS);
            DEFAULT_SECONDS
        }
        None => DEFAULT_SECONDS,
    };

    let source = DriftSource::new(settings.to_control_frame(), settings.limits, DRIFT_SEED);
    let mut runner = Runner::new(settings.build(), source, settings.base_note);
    log::info!(
        "Dryer started: {:.1} rpm, {} vanes, {} ball, {} s",
        runner.dryer().drum().rpm,
        runner.dryer().vane_count(),
        runner.dryer().ball_preset().as_str(),
        seconds
    );

    let frames = (seconds / FRAME_DT).ceil() as u64;
    let mut per_surface = BTreeMap::new();
    let (mut notes, mut drum_triggers, mut vane_triggers) = (0, 0, 0);

    for _ in 0..frames {
        for note in runner.frame() {
            log::debug!(
                "[{:7.3}s] {} note {} velocity {} ({:?})",
                runner.elapsed(),
                note.surface,
                note.note,
                note.velocity,
                note.trigger
            );
            notes += 1;
            match note.trigger {
                TriggerOutput::Drum => drum_triggers += 1,
                TriggerOutput::Vane => vane_triggers += 1,
            }
            *per_surface.entry(note.surface.to_string()).or_insert(0) += 1;
        }
    }

    let summary = Summary {
        seconds: runner.elapsed(),
        frames: runner.frames(),
        notes,
        drum_triggers,
        vane_triggers,
        per_surface,
        stats: runner.dryer().dispatch_stats(),
        final_vanes: runner.dryer().vane_count(),
        diagnostics: runner.dryer().diagnostics(),
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize summary: {}", e),
    }
}
