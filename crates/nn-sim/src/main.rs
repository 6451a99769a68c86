//! Headless swarm runner for the nearest-neighbor system.
//!
//! This binary:
//! 1. Builds a `NeighborSystem` from `NN_*` environment variables
//! 2. Spawns the starting pool of wandering agents
//! 3. Runs a fixed-step loop: move agents, push positions, tick the system
//! 4. Rebuilds debug lines from the published frame and logs them
//!
//! Commands (stdin):
//! - `spawn N` / `s N` - Spawn N agents
//! - `despawn N` / `d N` - Despawn the N newest agents
//! - `stats` - Log solver statistics
//! - `quit` / `q` - Quit
//! - `help` - Show help

mod agent;
mod command;
mod config;
mod lines;
mod movement;
mod pool;
mod spawner;

use std::io::BufRead;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use nn_tick::{NeighborSystem, TickOutcome};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info};

use crate::command::Command;
use crate::config::SimConfig;
use crate::lines::NeighborLines;
use crate::spawner::Spawner;

/// Steps between periodic status lines.
const STATUS_EVERY: u64 = 250;

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nn_sim=info".parse()?)
                .add_directive("nn_tick=info".parse()?),
        )
        .init();

    let config = SimConfig::from_env()?;
    info!(
        interval = config.system.update_interval,
        start = config.start_pool_size,
        max = config.max_pool_size,
        fps = config.target_fps,
        "starting nearest-neighbor runner"
    );

    let mut system = NeighborSystem::new(config.system.clone())?;
    let rng = config
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let mut spawner = Spawner::new(
        config.start_pool_size,
        config.max_pool_size,
        config.movement_speed,
        config.movement_area,
        rng,
    );
    spawner.spawn(config.start_pool_size, &mut system);

    let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded::<Command>();
    thread::spawn(move || input_thread(&cmd_tx));

    let feed = system.feed();
    let mut lines = NeighborLines::new();
    let dt = config.step_seconds();
    let target_delta = Duration::from_secs_f32(dt);
    let mut tick: u64 = 0;
    let mut running = true;

    while running {
        let start = Instant::now();

        running = handle_commands(&cmd_rx, &mut spawner, &mut system);

        spawner.step(dt, &mut system);
        if system.tick(dt) == TickOutcome::Solved && lines.rebuild(&feed.latest()) {
            debug!(
                generation = lines.generation(),
                segments = lines.len(),
                floats = lines.as_floats().len(),
                "rebuilt neighbor lines"
            );
        }

        tick += 1;
        if tick % STATUS_EVERY == 0 {
            log_status(&spawner, &system, &lines);
        }
        if config.max_ticks.is_some_and(|max| tick >= max) {
            info!(tick, "tick limit reached");
            running = false;
        }

        let elapsed = start.elapsed();
        if elapsed < target_delta {
            thread::sleep(target_delta - elapsed);
        }
    }

    log_status(&spawner, &system, &lines);
    let active = spawner.len();
    spawner.despawn(active, &mut system);
    info!("shut down");

    Ok(())
}

/// Drain pending commands. Returns `false` once `quit` was received.
fn handle_commands(
    rx: &Receiver<Command>,
    spawner: &mut Spawner,
    system: &mut NeighborSystem,
) -> bool {
    while let Ok(cmd) = rx.try_recv() {
        match cmd {
            Command::Spawn(count) => {
                let spawned = spawner.spawn(count, system);
                info!(spawned, active = spawner.len(), "spawn");
            }
            Command::Despawn(count) => {
                let despawned = spawner.despawn(count, system);
                info!(despawned, active = spawner.len(), "despawn");
            }
            Command::Stats => {
                let stats = system.stats();
                info!(
                    active = spawner.len(),
                    capacity = system.store().capacity(),
                    solves = stats.solves,
                    skipped = stats.skipped,
                    dropped = stats.dropped,
                    last_solve_ms = stats.last_duration.as_secs_f64() * 1000.0,
                    "stats"
                );
            }
            Command::Quit => {
                info!("shutting down");
                return false;
            }
            Command::Help => {
                info!("commands:");
                info!("  spawn N, s N    - spawn N agents");
                info!("  despawn N, d N  - despawn the N newest agents");
                info!("  stats           - solver statistics");
                info!("  quit, q         - quit");
            }
            Command::Invalid(input) => {
                error!("invalid input: {input:?}, type 'help' for commands");
            }
        }
    }
    true
}

fn log_status(spawner: &Spawner, system: &NeighborSystem, lines: &NeighborLines) {
    let stats = system.stats();
    info!(
        active = spawner.len(),
        segments = lines.len(),
        mean_neighbor_distance = lines.mean_length().unwrap_or(0.0),
        solves = stats.solves,
        last_solve_ms = stats.last_duration.as_secs_f64() * 1000.0,
        "status"
    );
}

fn input_thread(tx: &Sender<Command>) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        if let Some(cmd) = Command::parse(&line) {
            let is_quit = cmd == Command::Quit;
            if tx.send(cmd).is_err() || is_quit {
                break;
            }
        }
    }
}
