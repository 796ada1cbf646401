//! Playout CLI: batch random games and print win/score statistics.
//!
//! Usage:
//!   cargo run --release --bin playout -- --games 1000 --seed 42
//!   cargo run --release --bin playout -- --settings river_farm.toml

use std::path::PathBuf;

use clap::Parser;

use river_farm_engine::engine::logging;
use river_farm_engine::engine::playout::run_playouts;
use river_farm_engine::engine::settings::{load_default_settings, load_settings};
use river_farm_engine::games::river_farm::plugin::RiverFarmPlugin;

#[derive(Parser)]
#[command(name = "playout", about = "Run seeded random River Farm playouts")]
struct Cli {
    /// Number of games to play (default: from settings)
    #[arg(long)]
    games: Option<usize>,

    /// Base seed; game i uses seed + i (default: from settings)
    #[arg(long, env = "RIVER_FARM_SEED")]
    seed: Option<u64>,

    /// Path to river_farm.toml
    #[arg(long, env = "RIVER_FARM_SETTINGS")]
    settings: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings(path).map_err(|e| format!("Error loading settings: {}", e))?,
        None => load_default_settings(),
    };

    let games = cli.games.unwrap_or(settings.playout.games);
    let seed = cli.seed.unwrap_or(settings.playout.base_seed);
    eprintln!("Playout: {} games, seed={}", games, seed);

    let summary = run_playouts(&RiverFarmPlugin, &settings.game, games, seed);
    println!("{}", summary.summary());
    Ok(())
}
