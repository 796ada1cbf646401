use std::path::PathBuf;

use clap::{Parser, Subcommand};

use river_farm_engine::engine::logging;
use river_farm_engine::engine::models::GameConfig;
use river_farm_engine::engine::playout::{decision_rng, make_players, play_random_game};
use river_farm_engine::engine::settings::{load_default_settings, load_settings, Settings};
use river_farm_engine::games::river_farm::plugin::RiverFarmPlugin;
use river_farm_engine::games::river_farm::report::{render_grid, results_entries};
use river_farm_engine::games::river_farm::scoring::compose_and_analyze;
use river_farm_engine::games::river_farm::types::{Board, Seat};

#[derive(Parser)]
#[command(name = "river-farm", about = "River Farm board analysis and seeded games")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a board given in notation, e.g. "4@1 2 1 / . 3r1"
    Analyze {
        #[arg(long, conflicts_with = "board_file", required_unless_present = "board_file")]
        board: Option<String>,

        /// Read the board notation from a file
        #[arg(long)]
        board_file: Option<PathBuf>,

        /// Also print the master grid once per route, with the route marked
        #[arg(long)]
        render: bool,
    },
    /// Play one game with random decisions and print its event log
    Play {
        #[arg(long, env = "RIVER_FARM_SEED")]
        seed: Option<u64>,

        /// Path to river_farm.toml (default: auto-discover)
        #[arg(long, env = "RIVER_FARM_SETTINGS")]
        settings: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            board,
            board_file,
            render,
        } => {
            let text = match (board, board_file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
                (None, None) => return Err("one of --board or --board-file is required".into()),
            };
            analyze(&text, render)
        }
        Command::Play { seed, settings } => {
            let settings = match &settings {
                Some(path) => load_settings(path)?,
                None => load_default_settings(),
            };
            play(&settings, seed)
        }
    }
}

fn analyze(text: &str, render: bool) -> Result<(), Box<dyn std::error::Error>> {
    let board: Board = text.parse()?;
    let analysis = compose_and_analyze(&board);
    let live = analysis.live_networks();

    let report = serde_json::json!({
        "board": board.to_string(),
        "scores": {
            "1": analysis.score(Seat::First),
            "2": analysis.score(Seat::Second),
        },
        "routes": {
            "1": results_entries(&analysis, Seat::First),
            "2": results_entries(&analysis, Seat::Second),
        },
        "source_tiles": analysis.source_tiles,
        "water_cells": analysis.master_grid.water_count(),
        "water_networks": analysis.water_networks.len(),
        "live_networks": live.len(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if render {
        for seat in Seat::ALL {
            for entry in results_entries(&analysis, seat) {
                println!("\nPlayer {} {}", seat.number(), entry.label);
                print!("{}", render_grid(&analysis.master_grid, &entry.path));
            }
        }
    }
    Ok(())
}

fn play(settings: &Settings, seed: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let seed = seed
        .or(settings.game.random_seed)
        .unwrap_or_else(rand::random);
    let config = GameConfig {
        random_seed: Some(seed),
        ..settings.game.to_game_config()
    };
    tracing::info!(seed, "playing random game");

    let plugin = RiverFarmPlugin;
    let players = make_players(&settings.game);
    let sim = play_random_game(&plugin, &players, &config, &mut decision_rng(seed));

    for event in &sim.events {
        println!("{}", serde_json::to_string(event)?);
    }
    println!("{}", sim.state.board);
    match &sim.game_over {
        Some(result) => println!("{}", serde_json::to_string_pretty(result)?),
        None => return Err("game did not finish".into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_flag_belongs_to_play() {
        let cli = Cli::try_parse_from(["river-farm", "play", "--seed", "3", "--settings", "farm.toml"]).unwrap();
        match cli.command {
            Command::Play { seed, settings } => {
                assert_eq!(seed, Some(3));
                assert_eq!(settings, Some(PathBuf::from("farm.toml")));
            }
            Command::Analyze { .. } => panic!("expected play"),
        }

        let rejected = Cli::try_parse_from(["river-farm", "analyze", "--board", "1", "--settings", "farm.toml"]);
        assert!(rejected.is_err());
    }

    #[test]
    fn test_analyze_needs_a_board() {
        assert!(Cli::try_parse_from(["river-farm", "analyze"]).is_err());
        assert!(Cli::try_parse_from(["river-farm", "analyze", "--board", "1", "--board-file", "b.txt"]).is_err());
    }
}
