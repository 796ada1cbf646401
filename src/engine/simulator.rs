//! Synchronous game simulator: advances game state through auto-resolve phases.

use std::collections::HashMap;

use crate::engine::models::*;
use crate::engine::plugin::GamePlugin;

/// Upper bound on consecutive auto-resolved phases after one action.
const MAX_AUTO_RESOLVE: usize = 50;

/// Mutable game state for synchronous simulation.
#[derive(Debug, Clone)]
pub struct SimulationState<S> {
    pub state: S,
    pub phase: Phase,
    pub players: Vec<Player>,
    pub scores: HashMap<String, f64>,
    pub game_over: Option<GameResult>,
    /// Every event emitted so far, oldest first.
    pub events: Vec<Event>,
}

impl<S: Clone> SimulationState<S> {
    /// Start a game and resolve any leading auto-resolve phases.
    pub fn start<P: GamePlugin<State = S>>(
        plugin: &P,
        players: &[Player],
        config: &GameConfig,
    ) -> Self {
        let (state, phase, events) = plugin.create_initial_state(players, config);
        let mut sim = Self {
            state,
            phase,
            players: players.to_vec(),
            scores: players.iter().map(|p| (p.player_id.clone(), 0.0)).collect(),
            game_over: None,
            events,
        };
        resolve_auto(plugin, &mut sim);
        sim
    }

    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }
}

fn absorb<S>(sim: &mut SimulationState<S>, result: TransitionResult<S>) {
    sim.state = result.state;
    sim.phase = result.next_phase;
    if !result.scores.is_empty() {
        sim.scores = result.scores;
    }
    sim.events.extend(result.events);
    sim.game_over = result.game_over;
}

/// Apply an action and auto-resolve all subsequent auto-resolve phases.
/// Mutates `sim` in place.
pub fn apply_action_and_resolve<P: GamePlugin>(
    plugin: &P,
    sim: &mut SimulationState<P::State>,
    action: &Action,
) {
    let result = plugin.apply_action(&sim.state, &sim.phase, action, &sim.players);
    absorb(sim, result);

    if sim.game_over.is_some() {
        return;
    }

    resolve_auto(plugin, sim);
}

/// Drive auto-resolve phases with synthetic actions until a player must act.
pub fn resolve_auto<P: GamePlugin>(plugin: &P, sim: &mut SimulationState<P::State>) {
    let mut max_auto = MAX_AUTO_RESOLVE;
    while sim.phase.auto_resolve && sim.game_over.is_none() && max_auto > 0 {
        max_auto -= 1;

        let pid = phase_player_id(&sim.phase, &sim.players);
        let synthetic = Action {
            action_type: sim.phase.name.clone(),
            player_id: pid,
            payload: serde_json::json!({}),
        };

        let result = plugin.apply_action(&sim.state, &sim.phase, &synthetic, &sim.players);
        absorb(sim, result);
    }
}

/// Extract the acting player from a phase, falling back to first player.
pub fn phase_player_id(phase: &Phase, players: &[Player]) -> PlayerId {
    if let Some(expected) = phase.expected_actions.first() {
        return expected.player_id.clone();
    }
    if let Some(pi) = phase.metadata.get("player_index").and_then(|v| v.as_u64()) {
        let idx = pi as usize;
        if idx < players.len() {
            return players[idx].player_id.clone();
        }
    }
    players
        .first()
        .map(|p| p.player_id.clone())
        .unwrap_or_else(|| "system".into())
}
