//! Flip Orbit headless driver
//!
//! Runs the simulation with a fixed timestep accumulator and a simple
//! autopilot, then prints a summary. Useful for balancing configs and for
//! checking determinism across builds.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use flip_orbit::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use flip_orbit::sim::{GameEvent, GamePhase, Session, TickInput};
use flip_orbit::{BestScoreStore, Config, HitMode, JsonFileStore, MemoryStore, delta_angle};

#[derive(Parser, Debug)]
#[command(name = "flip-orbit", version, about = "Run Flip Orbit headless with an autopilot")]
struct Cli {
    /// RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,

    /// Runs to play before stopping (a hazard hit ends a run)
    #[arg(long, default_value_t = 1)]
    runs: u32,

    /// Tuning JSON; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Best score file; in-memory when omitted
    #[arg(long)]
    best_file: Option<PathBuf>,

    /// Override the arc hit mode (stick, travel-stick, telegraph-travel-stick, all)
    #[arg(long)]
    hit_mode: Option<String>,

    /// Render frame rate fed into the accumulator
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    seed: u64,
    simulated_seconds: f32,
    ticks: u64,
    runs: Vec<u64>,
    best_score: u64,
    pickups: u32,
    expired_orbs: u32,
    flips: u32,
    arcs_faded: usize,
}

/// Flips away from a dangerous arc closing in ahead of the player
struct Autopilot {
    /// Seconds of travel to look ahead
    lookahead: f32,
}

impl Autopilot {
    fn wants_flip(&self, session: &Session) -> bool {
        let player = session.player();
        let mode = session.config().arc_hit_mode;
        let reach = (player.angular_speed_deg * self.lookahead).to_radians();

        let clearance = |dir: f32| {
            session
                .scheduler()
                .obstacles()
                .iter()
                .filter(|o| o.is_stick() || o.is_dangerous(mode))
                .filter_map(|o| {
                    let to_edge = delta_angle(o.arc.center, player.angle) * dir - o.arc.half_width;
                    (to_edge > -o.arc.half_width).then_some(to_edge)
                })
                .fold(f32::MAX, f32::min)
        };

        let dir = player.dir as f32;
        let ahead = clearance(dir);
        ahead < reach && clearance(-dir) > ahead
    }
}

fn build_store(path: Option<PathBuf>) -> Box<dyn BestScoreStore> {
    match path {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(name) = &cli.hit_mode {
        config.arc_hit_mode =
            HitMode::from_str(name).with_context(|| format!("Unknown hit mode '{}'", name))?;
    }

    let mut session = Session::new(config, cli.seed, build_store(cli.best_file.clone()));
    let autopilot = Autopilot { lookahead: 0.12 };
    let frame_dt = (1.0 / cli.fps.max(1.0)).min(MAX_FRAME_DT);

    let mut summary = Summary {
        seed: cli.seed,
        ..Default::default()
    };
    let mut input = TickInput {
        start: true,
        ..Default::default()
    };
    let mut accumulator = 0.0;
    let mut elapsed = 0.0;

    while elapsed < cli.seconds {
        accumulator += frame_dt;
        elapsed += frame_dt;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            if session.state() == GamePhase::Playing && autopilot.wants_flip(&session) {
                input.flips = 1;
            }
            session.tick(&input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input = TickInput::default();

            for event in session.drain_events() {
                log::debug!("{:?}", event);
                match event {
                    GameEvent::PickupCollected { .. } => summary.pickups += 1,
                    GameEvent::PickupExpired => summary.expired_orbs += 1,
                    GameEvent::Flipped { .. } => summary.flips += 1,
                    GameEvent::ArcsFaded { count } => summary.arcs_faded += count,
                    GameEvent::HazardHit { score, .. } => summary.runs.push(score),
                    _ => {}
                }
            }

            if session.state() == GamePhase::GameOver {
                if summary.runs.len() as u32 >= cli.runs {
                    break;
                }
                input.start = true;
            }
        }

        if session.state() == GamePhase::GameOver && summary.runs.len() as u32 >= cli.runs {
            break;
        }
    }

    if session.state() != GamePhase::GameOver {
        summary.runs.push(session.score());
    }
    summary.simulated_seconds = elapsed;
    summary.ticks = session.time_ticks();
    summary.best_score = session.best_score().max(summary.runs.iter().copied().max().unwrap_or(0));

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{}", json);
    } else {
        println!(
            "seed {}: {} run(s) {:?} in {:.1}s, best {}, {} pickups, {} flips",
            summary.seed,
            summary.runs.len(),
            summary.runs,
            summary.simulated_seconds,
            summary.best_score,
            summary.pickups,
            summary.flips
        );
    }
    Ok(())
}
