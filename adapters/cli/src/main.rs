#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Towerline game.

mod config;
mod game_loop;
mod presenter;
mod scene;
mod script;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use towerline_core::{AssetProvider, TowerKind};
use towerline_rendering::AssetCatalog;
use towerline_scheduler::{Clock, LoopReport, ManualClock, Scheduler, SchedulerConfig, SystemClock};
use towerline_simulation::Simulation;
use towerline_system_builder::intent_channel;
use towerline_system_spawning::{campaign, Spawning};
use towerline_world::{TowerTemplate, World, MISC_IMAGES, MONSTER_ANIMATIONS, TOWER_IMAGES};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{config::GameConfig, game_loop::GameLoop, presenter::LogPresenter, script::TickBeacon};

const ANIMATION_FRAMES: usize = 4;

/// Runs the Towerline simulation without a window.
#[derive(Debug, Parser)]
#[command(name = "towerline", version, about, long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Stop after this many logic ticks.
    #[arg(short, long)]
    ticks: Option<u64>,
    /// Seed of the wave lane offsets, overriding the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Logic updates per second, overriding the configuration.
    #[arg(long)]
    ups: Option<u32>,
    /// Tracing filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Run on a simulated clock without sleeping.
    #[arg(long)]
    max_speed: bool,
    /// Log a frame summary every this many frames.
    #[arg(long, default_value_t = 80)]
    report_every: u64,
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn asset_catalog() -> AssetCatalog {
    let mut catalog = AssetCatalog::new();
    for kind in TowerKind::ALL {
        let _ = catalog.register_image(TOWER_IMAGES, TowerTemplate::of(kind).image);
    }
    for item in ["projectile", "wall"] {
        let _ = catalog.register_image(MISC_IMAGES, item);
    }
    for (_, list) in MONSTER_ANIMATIONS {
        let _ = catalog.register_animation(list, ANIMATION_FRAMES);
    }
    catalog
}

fn run_loop<C: Clock>(config: SchedulerConfig, clock: C, args: &Args, game: &GameConfig) -> Result<LoopReport> {
    let mut scheduler = Scheduler::new(config, clock).context("invalid scheduler configuration")?;

    let assets: Arc<dyn AssetProvider> = Arc::new(asset_catalog());
    let world = World::new(game.world_config(), assets).context("invalid map configuration")?;
    let spawning = Spawning::new(campaign(), game.spawning_config()?);
    let (sender, queue) = intent_channel();
    let simulation = Simulation::new(world, spawning, queue, scheduler.period());

    let beacon = Arc::new(TickBeacon::default());
    let input = script::spawn_script(game.script.clone(), sender, Arc::clone(&beacon))?;
    let mut game_loop = GameLoop::new(
        simulation,
        LogPresenter::new(args.report_every),
        scheduler.stop_handle(),
        beacon,
        args.ticks,
    );

    let report = scheduler.run(&mut game_loop).context("game loop failed");
    if input.join().is_err() {
        warn!("input_thread_panicked");
    }
    report
}

/// Entry point for the Towerline command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut game = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        game.waves.seed = seed;
    }
    if let Some(ups) = args.ups {
        game.scheduler.ups = ups;
    }

    let scheduler_config = game.scheduler_config();
    let report = if args.max_speed {
        run_loop(scheduler_config, ManualClock::new(), &args, &game)?
    } else {
        run_loop(scheduler_config, SystemClock::new(), &args, &game)?
    };

    info!(
        iterations = report.iterations,
        logic_updates = report.logic_updates,
        catch_up_updates = report.catch_up_updates,
        yields = report.yields,
        "run_complete"
    );
    Ok(())
}
