//! Random playout runner: complete seeded games with uniformly random decisions.

use std::collections::HashMap;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::engine::models::*;
use crate::engine::plugin::GamePlugin;
use crate::engine::settings::GameSettings;
use crate::engine::simulator::{apply_action_and_resolve, SimulationState};

/// Hard stop for a single game.
const MAX_ITERATIONS: usize = 500;

/// Aggregated results from a playout batch. Per-seat vectors are indexed by seat.
#[derive(Debug, Clone)]
pub struct PlayoutSummary {
    pub num_games: usize,
    pub player_names: [String; 2],
    pub wins: [usize; 2],
    pub draws: usize,
    /// Games that hit the iteration cap without finishing.
    pub unfinished: usize,
    pub scores: [Vec<f64>; 2],
    pub game_durations_ms: Vec<f64>,
}

impl PlayoutSummary {
    pub fn win_rate(&self, seat: usize) -> f64 {
        self.wins[seat] as f64 / self.num_games.max(1) as f64
    }

    pub fn draw_rate(&self) -> f64 {
        self.draws as f64 / self.num_games.max(1) as f64
    }

    pub fn avg_score(&self, seat: usize) -> f64 {
        let s = &self.scores[seat];
        if s.is_empty() {
            0.0
        } else {
            s.iter().sum::<f64>() / s.len() as f64
        }
    }

    pub fn score_stddev(&self, seat: usize) -> f64 {
        let s = &self.scores[seat];
        if s.len() < 2 {
            return 0.0;
        }
        let avg = self.avg_score(seat);
        let variance = s.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / (s.len() - 1) as f64;
        variance.sqrt()
    }

    /// Wilson score interval for a seat's win rate.
    pub fn confidence_interval_95(&self, seat: usize) -> (f64, f64) {
        let n = self.num_games;
        if n == 0 {
            return (0.0, 0.0);
        }
        let p = self.win_rate(seat);
        let z = 1.96_f64;
        let denom = 1.0 + z * z / n as f64;
        let center = (p + z * z / (2.0 * n as f64)) / denom;
        let margin = z * ((p * (1.0 - p) + z * z / (4.0 * n as f64)) / n as f64).sqrt() / denom;
        ((center - margin).max(0.0), (center + margin).min(1.0))
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Playout Results ({} games)", self.num_games)];
        lines.push("=".repeat(60));
        for seat in 0..2 {
            let (ci_lo, ci_hi) = self.confidence_interval_95(seat);
            lines.push(format!(
                "  {:>12}: {:3} wins ({:5.1}%)  [95% CI: {:.1}%-{:.1}%]  avg={:5.2} +/- {:4.2}",
                self.player_names[seat],
                self.wins[seat],
                self.win_rate(seat) * 100.0,
                ci_lo * 100.0,
                ci_hi * 100.0,
                self.avg_score(seat),
                self.score_stddev(seat),
            ));
        }
        lines.push(format!(
            "  {:>12}: {} ({:.1}%)",
            "Draws",
            self.draws,
            self.draw_rate() * 100.0
        ));
        if self.unfinished > 0 {
            lines.push(format!("  {:>12}: {}", "Unfinished", self.unfinished));
        }
        if !self.game_durations_ms.is_empty() {
            let total_ms = self.game_durations_ms.iter().sum::<f64>();
            let avg_ms = total_ms / self.game_durations_ms.len() as f64;
            lines.push(format!(
                "  Avg game: {:.2}ms  |  Total: {:.2}s",
                avg_ms,
                total_ms / 1000.0
            ));
        }
        lines.join("\n")
    }
}

/// Players for a two-seat game, ids `p1`/`p2`.
pub fn make_players(settings: &GameSettings) -> Vec<Player> {
    settings
        .player_names
        .iter()
        .enumerate()
        .map(|(i, name)| Player {
            player_id: format!("p{}", i + 1),
            display_name: name.clone(),
            seat_index: i,
        })
        .collect()
}

/// Play one game to completion, each decision drawn uniformly from the acting
/// player's valid actions.
pub fn play_random_game<P: GamePlugin>(
    plugin: &P,
    players: &[Player],
    config: &GameConfig,
    rng: &mut StdRng,
) -> SimulationState<P::State> {
    let mut sim = SimulationState::start(plugin, players, config);

    for _ in 0..MAX_ITERATIONS {
        if sim.is_over() {
            break;
        }

        let Some(expected) = sim.phase.expected_actions.first() else {
            break;
        };
        let acting_pid = expected.player_id.clone();

        let actions = plugin.get_valid_actions(&sim.state, &sim.phase, &acting_pid);
        let Some(action) = actions.choose(rng).cloned() else {
            tracing::warn!(phase = %sim.phase.name, player = %acting_pid, "no valid actions");
            break;
        };
        apply_action_and_resolve(plugin, &mut sim, &action);
    }

    sim
}

/// Decision RNG for a game seed, kept apart from the dice stream.
pub fn decision_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed.rotate_left(32))
}

struct GameRecord {
    result: Option<GameResult>,
    scores: HashMap<String, f64>,
    duration_ms: f64,
}

/// Play `num_games` random games in parallel. Game `i` uses seed `base_seed + i`
/// for both dice and decisions, so a batch is reproducible.
pub fn run_playouts<P: GamePlugin>(
    plugin: &P,
    settings: &GameSettings,
    num_games: usize,
    base_seed: u64,
) -> PlayoutSummary {
    let players = make_players(settings);

    let records: Vec<GameRecord> = (0..num_games)
        .into_par_iter()
        .map(|game_idx| {
            let seed = base_seed.wrapping_add(game_idx as u64);
            let config = GameConfig {
                random_seed: Some(seed),
                highlight_live_networks: settings.highlight_live_networks,
            };
            let mut rng = decision_rng(seed);

            let t0 = Instant::now();
            let sim = play_random_game(plugin, &players, &config, &mut rng);
            GameRecord {
                result: sim.game_over,
                scores: sim.scores,
                duration_ms: t0.elapsed().as_secs_f64() * 1000.0,
            }
        })
        .collect();

    let mut summary = PlayoutSummary {
        num_games,
        player_names: settings.player_names.clone(),
        wins: [0, 0],
        draws: 0,
        unfinished: 0,
        scores: [Vec::with_capacity(num_games), Vec::with_capacity(num_games)],
        game_durations_ms: Vec::with_capacity(num_games),
    };

    for record in records {
        summary.game_durations_ms.push(record.duration_ms);
        for (seat, player) in players.iter().enumerate() {
            let score = record.scores.get(&player.player_id).copied().unwrap_or(0.0);
            summary.scores[seat].push(score);
        }

        match record.result {
            None => summary.unfinished += 1,
            Some(gr) if gr.winners.len() == 1 => {
                if let Some(seat) = players.iter().position(|p| p.player_id == gr.winners[0]) {
                    summary.wins[seat] += 1;
                }
            }
            Some(_) => summary.draws += 1,
        }
    }

    tracing::info!(
        games = num_games,
        p1_wins = summary.wins[0],
        p2_wins = summary.wins[1],
        draws = summary.draws,
        "playouts complete"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::river_farm::plugin::RiverFarmPlugin;
    use crate::games::river_farm::scoring::compose_and_analyze;
    use crate::games::river_farm::types::{ROWS, COLS};

    #[test]
    fn test_random_game_fills_board() {
        let plugin = RiverFarmPlugin;
        let players = make_players(&GameSettings::default());
        let config = GameConfig { random_seed: Some(9), highlight_live_networks: true };
        let mut rng = StdRng::seed_from_u64(9);

        let sim = play_random_game(&plugin, &players, &config, &mut rng);
        assert!(sim.is_over());
        assert!(sim.state.board.is_full());
        assert_eq!(sim.phase.name, "game_over");
        assert_eq!(sim.state.draws as usize, ROWS * COLS - 2);

        // Final scores agree with a fresh analysis of the final board.
        let analysis = compose_and_analyze(&sim.state.board);
        assert_eq!(sim.scores["p1"], analysis.scores[0] as f64);
        assert_eq!(sim.scores["p2"], analysis.scores[1] as f64);
    }

    #[test]
    fn test_playouts_account_for_every_game() {
        let summary = run_playouts(&RiverFarmPlugin, &GameSettings::default(), 6, 42);
        assert_eq!(summary.num_games, 6);
        assert_eq!(summary.wins[0] + summary.wins[1] + summary.draws, 6);
        assert_eq!(summary.unfinished, 0);
        assert_eq!(summary.scores[0].len(), 6);
        assert_eq!(summary.game_durations_ms.len(), 6);
    }

    #[test]
    fn test_playouts_are_reproducible() {
        let a = run_playouts(&RiverFarmPlugin, &GameSettings::default(), 4, 7);
        let b = run_playouts(&RiverFarmPlugin, &GameSettings::default(), 4, 7);
        assert_eq!(a.wins, b.wins);
        assert_eq!(a.draws, b.draws);
        assert_eq!(a.scores, b.scores);
    }

    #[test]
    fn test_rotations_are_random_decisions() {
        let plugin = RiverFarmPlugin;
        let players = make_players(&GameSettings::default());
        let config = GameConfig { random_seed: Some(5), highlight_live_networks: false };

        let rotated = (0..8u64).any(|seed| {
            let sim = play_random_game(&plugin, &players, &config, &mut decision_rng(seed));
            sim.events.iter().any(|e| e.event_type == "tile_rotated")
        });
        assert!(rotated);
    }

    #[test]
    fn test_summary_stats() {
        let summary = PlayoutSummary {
            num_games: 4,
            player_names: ["Ana".into(), "Bo".into()],
            wins: [2, 1],
            draws: 1,
            unfinished: 0,
            scores: [vec![1.0, 3.0, 2.0, 2.0], vec![0.0, 0.0, 4.0, 0.0]],
            game_durations_ms: vec![1.0; 4],
        };
        assert_eq!(summary.win_rate(0), 0.5);
        assert_eq!(summary.draw_rate(), 0.25);
        assert_eq!(summary.avg_score(0), 2.0);
        assert_eq!(summary.avg_score(1), 1.0);
        assert!((summary.score_stddev(0) - (2.0f64 / 3.0).sqrt()).abs() < 1e-9);

        let (lo, hi) = summary.confidence_interval_95(0);
        assert!(lo < 0.5 && hi > 0.5);

        let text = summary.summary();
        assert!(text.starts_with("Playout Results (4 games)"));
        assert!(text.contains("Ana"));
        assert!(text.contains("Draws"));
        assert!(!text.contains("Unfinished"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = run_playouts(&RiverFarmPlugin, &GameSettings::default(), 0, 1);
        assert_eq!(summary.win_rate(0), 0.0);
        assert_eq!(summary.score_stddev(1), 0.0);
        assert_eq!(summary.confidence_interval_95(0), (0.0, 0.0));
    }
}
