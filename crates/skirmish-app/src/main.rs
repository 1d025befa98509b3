//! Headless Skirmish runner.
//!
//! Loads a scenario, runs it on the calc thread for a fixed number of ticks,
//! and prints a JSON summary of what happened.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use skirmish_app::game_loop::{spawn_game_loop, Pacing};
use skirmish_core::commands::PlayerCommand;
use skirmish_core::state::FlagshipView;
use skirmish_sim::scenario::Scenario;

/// Run a Skirmish scenario without a renderer
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run a combat scenario headless and report the outcome")]
struct Args {
    /// Scenario JSON file
    scenario: PathBuf,

    /// Ticks to simulate
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Override the scenario's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Pace ticks in real time instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Hold the flagship's trigger for the whole run
    #[arg(long)]
    fire: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct Summary {
    ticks: u64,
    seed: u64,
    /// Ship events by kind.
    events: BTreeMap<String, usize>,
    flagship: FlagshipView,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut scenario = match Scenario::load(&args.scenario) {
        Ok(scenario) => scenario,
        Err(e) => {
            tracing::error!(path = %args.scenario.display(), "failed to load scenario: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(seed) = args.seed {
        scenario.config.seed = seed;
    }
    let seed = scenario.config.seed;
    let engine = match scenario.build() {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("invalid scenario: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pacing = if args.realtime {
        Pacing::RealTime
    } else {
        Pacing::Unpaced
    };
    let mut game = match spawn_game_loop(engine, pacing) {
        Ok(game) => game,
        Err(e) => {
            tracing::error!("failed to spawn calc thread: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(seed, ticks = args.ticks, "scenario running");

    if args.fire {
        game.send(PlayerCommand::Steer {
            thrust: 0.0,
            turn: 0.0,
            fire: true,
        });
    }

    let mut events: BTreeMap<String, usize> = BTreeMap::new();
    let mut ran = 0;
    while ran < args.ticks {
        let frame = match game.swap() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("calc thread stopped early: {e}");
                break;
            }
        };
        for event in &frame.events {
            *events.entry(format!("{:?}", event.kind)).or_default() += 1;
        }
        ran += 1;
    }

    let summary = Summary {
        ticks: ran,
        seed,
        events,
        flagship: game.current().flagship.clone(),
    };
    game.shutdown();

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("failed to encode summary: {e}");
            ExitCode::FAILURE
        }
    }
}
