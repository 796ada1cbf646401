//! RiverFarmPlugin: the turn controller.
//!
//! Phases: `setup` (each seat places one field) -> `draw_tile` (auto-resolve die
//! roll) -> `place_tile` (optional rotations, then placement) -> back to
//! `draw_tile` for the other seat, until the board is full -> `game_over`.
//! Every placement triggers a full `compose_and_analyze` of the board.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::engine::models::*;
use crate::engine::plugin::GamePlugin;

use super::report::results_entries;
use super::scoring::{compose_and_analyze, Analysis};
use super::tiles::is_rotatable;
use super::types::*;

/// Odd constant used to spread consecutive draw counters across the seed space.
const DRAW_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Full River Farm game state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiverFarmState {
    pub board: Board,
    pub current_player_index: usize,
    /// Tile rolled for the current turn, if any.
    pub drawn_tile: Option<u8>,
    /// Quarter turns applied to the drawn tile.
    pub rotation: u8,
    /// Indexed by seat.
    pub scores: [u32; 2],
    /// Live water networks after the last placement.
    pub live_networks: usize,
    pub seed: u64,
    /// Number of die rolls so far.
    pub draws: u64,
    pub highlight_live_networks: bool,
}

impl RiverFarmState {
    pub fn float_scores(&self, players: &[Player]) -> HashMap<String, f64> {
        players
            .iter()
            .enumerate()
            .map(|(i, p)| (p.player_id.clone(), self.scores[i] as f64))
            .collect()
    }
}

fn player_phase(name: &str, action_type: &str, player_index: usize, players: &[Player]) -> Phase {
    Phase {
        name: name.into(),
        expected_actions: vec![ExpectedAction {
            player_id: players[player_index].player_id.clone(),
            action_type: action_type.into(),
        }],
        auto_resolve: false,
        metadata: serde_json::json!({"player_index": player_index}),
    }
}

fn draw_phase(player_index: usize) -> Phase {
    Phase {
        name: "draw_tile".into(),
        expected_actions: vec![],
        auto_resolve: true,
        metadata: serde_json::json!({"player_index": player_index}),
    }
}

fn game_over_phase() -> Phase {
    Phase {
        name: "game_over".into(),
        expected_actions: vec![],
        auto_resolve: false,
        metadata: serde_json::json!({}),
    }
}

fn position_action(action_type: &str, player_id: &str, pos: TilePos) -> Action {
    Action {
        action_type: action_type.into(),
        player_id: player_id.into(),
        payload: serde_json::json!({"row": pos.0, "col": pos.1}),
    }
}

/// Read `{row, col}` from an action payload.
fn parse_position(payload: &serde_json::Value) -> Result<TilePos, String> {
    let row = payload.get("row").and_then(|v| v.as_u64());
    let col = payload.get("col").and_then(|v| v.as_u64());
    match (row, col) {
        (Some(r), Some(c)) if (r as usize) < ROWS && (c as usize) < COLS => {
            Ok((r as usize, c as usize))
        }
        (Some(r), Some(c)) => Err(format!("Position ({r},{c}) is off the board")),
        _ => Err("Payload needs integer row and col".into()),
    }
}

fn validate_target(state: &RiverFarmState, payload: &serde_json::Value) -> Option<String> {
    match parse_position(payload) {
        Err(e) => Some(e),
        Ok(pos) if !state.board.is_empty_at(pos) => {
            Some(format!("Position ({},{}) is already occupied", pos.0, pos.1))
        }
        Ok(_) => None,
    }
}

/// Re-analyse the board after a placement and refresh cached scores.
fn refresh_after_placement(state: &mut RiverFarmState, players: &[Player]) -> (Analysis, Vec<Event>) {
    let analysis = compose_and_analyze(&state.board);
    state.scores = analysis.scores;

    let mut events = vec![Event {
        event_type: "scores_updated".into(),
        player_id: None,
        payload: serde_json::json!(state.float_scores(players)),
    }];

    if state.highlight_live_networks {
        let live = analysis.live_networks();
        let cells: usize = live.iter().map(|&i| analysis.water_networks[i].len()).sum();
        state.live_networks = live.len();
        events.push(Event {
            event_type: "live_networks_updated".into(),
            player_id: None,
            payload: serde_json::json!({
                "networks": live.len(),
                "cells": cells,
            }),
        });
    }

    (analysis, events)
}

pub struct RiverFarmPlugin;

impl GamePlugin for RiverFarmPlugin {
    type State = RiverFarmState;

    fn game_id(&self) -> &str {
        "river_farm"
    }

    fn display_name(&self) -> &str {
        "River Farm"
    }

    fn min_players(&self) -> u32 {
        2
    }

    fn max_players(&self) -> u32 {
        2
    }

    fn description(&self) -> &str {
        "Lay river tiles on a 4x6 farm and score every water source your fields reach."
    }

    fn create_initial_state(
        &self,
        players: &[Player],
        config: &GameConfig,
    ) -> (RiverFarmState, Phase, Vec<Event>) {
        assert_eq!(players.len(), 2, "River Farm needs exactly two players");

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let state = RiverFarmState {
            board: Board::new(),
            current_player_index: 0,
            drawn_tile: None,
            rotation: 0,
            scores: [0, 0],
            live_networks: 0,
            seed,
            draws: 0,
            highlight_live_networks: config.highlight_live_networks,
        };

        let phase = player_phase("setup", "place_field", 0, players);
        let events = vec![Event {
            event_type: "game_started".into(),
            player_id: None,
            payload: serde_json::json!({
                "players": players.iter().map(|p| &p.player_id).collect::<Vec<_>>(),
                "rows": ROWS,
                "cols": COLS,
                "seed": seed,
            }),
        }];

        tracing::debug!(seed, "river farm game created");
        (state, phase, events)
    }

    fn get_valid_actions(
        &self,
        state: &RiverFarmState,
        phase: &Phase,
        player_id: &str,
    ) -> Vec<Action> {
        let expected_pid = phase.expected_actions.first().map(|ea| ea.player_id.as_str());
        if expected_pid != Some(player_id) {
            return vec![];
        }

        let empty = state.board.empty_positions();
        match phase.name.as_str() {
            "setup" => empty
                .into_iter()
                .map(|pos| position_action("place_field", player_id, pos))
                .collect(),
            "place_tile" => {
                let mut actions = Vec::with_capacity(empty.len() + 1);
                if state.drawn_tile.is_some_and(is_rotatable) {
                    actions.push(Action {
                        action_type: "rotate_tile".into(),
                        player_id: player_id.into(),
                        payload: serde_json::json!({}),
                    });
                }
                actions.extend(
                    empty
                        .into_iter()
                        .map(|pos| position_action("place_tile", player_id, pos)),
                );
                actions
            }
            _ => vec![],
        }
    }

    fn validate_action(
        &self,
        state: &RiverFarmState,
        phase: &Phase,
        action: &Action,
    ) -> Option<String> {
        if phase.auto_resolve {
            return None;
        }
        let Some(expected) = phase.expected_actions.first() else {
            return Some(format!("Phase {} accepts no actions", phase.name));
        };
        if expected.player_id != action.player_id {
            return Some(format!("It is not {}'s turn", action.player_id));
        }

        match (phase.name.as_str(), action.action_type.as_str()) {
            ("setup", "place_field") => validate_target(state, &action.payload),
            ("place_tile", "place_tile") => {
                if state.drawn_tile.is_none() {
                    return Some("No tile has been drawn".into());
                }
                validate_target(state, &action.payload)
            }
            ("place_tile", "rotate_tile") => match state.drawn_tile {
                None => Some("No tile has been drawn".into()),
                Some(t) if !is_rotatable(t) => {
                    Some(format!("Tile {} ({}) cannot be rotated", t, tile_name(t)))
                }
                Some(_) => None,
            },
            (phase_name, action_type) => {
                Some(format!("Action {action_type} is not allowed in phase {phase_name}"))
            }
        }
    }

    fn apply_action(
        &self,
        state: &RiverFarmState,
        phase: &Phase,
        action: &Action,
        players: &[Player],
    ) -> TransitionResult<RiverFarmState> {
        let mut new_state = state.clone();
        match (phase.name.as_str(), action.action_type.as_str()) {
            ("setup", _) => apply_place_field(&mut new_state, phase, action, players),
            ("draw_tile", _) => apply_draw_tile(&mut new_state, phase, players),
            ("place_tile", "rotate_tile") => apply_rotate_tile(&mut new_state, phase, action, players),
            ("place_tile", _) => apply_place_tile(&mut new_state, phase, action, players),
            _ => TransitionResult {
                scores: new_state.float_scores(players),
                state: new_state,
                events: vec![],
                next_phase: phase.clone(),
                game_over: None,
            },
        }
    }

    fn get_player_view(
        &self,
        state: &RiverFarmState,
        phase: &Phase,
        _player_id: Option<&str>,
        players: &[Player],
    ) -> serde_json::Value {
        serde_json::json!({
            "board": state.board,
            "notation": state.board.to_string(),
            "phase": phase.name,
            "current_player": players.get(state.current_player_index).map(|p| &p.player_id),
            "drawn_tile": state.drawn_tile,
            "rotation": state.rotation,
            "scores": state.float_scores(players),
            "live_networks": state.live_networks,
        })
    }

    fn get_scores(&self, state: &RiverFarmState, players: &[Player]) -> HashMap<String, f64> {
        state.float_scores(players)
    }
}

// ------------------------------------------------------------------ //
//  Phase handlers
// ------------------------------------------------------------------ //

fn player_index(phase: &Phase) -> usize {
    phase.metadata["player_index"].as_u64().unwrap_or(0) as usize
}

fn apply_place_field(
    state: &mut RiverFarmState,
    phase: &Phase,
    action: &Action,
    players: &[Player],
) -> TransitionResult<RiverFarmState> {
    let idx = player_index(phase);
    let seat = Seat::from_index(idx);
    let pos = parse_position(&action.payload)
        .unwrap_or_else(|e| panic!("apply_action called with unvalidated payload: {e}"));

    state.board.place(pos, PlacedTile::field(seat));
    tracing::debug!(seat = seat.number(), pos = ?pos, "field placed during setup");

    let mut events = vec![Event {
        event_type: "field_placed".into(),
        player_id: Some(players[idx].player_id.clone()),
        payload: serde_json::json!({"row": pos.0, "col": pos.1}),
    }];
    let (_, refresh_events) = refresh_after_placement(state, players);
    events.extend(refresh_events);

    let next_phase = if idx == 0 {
        state.current_player_index = 1;
        player_phase("setup", "place_field", 1, players)
    } else {
        state.current_player_index = 0;
        draw_phase(0)
    };

    TransitionResult {
        scores: state.float_scores(players),
        state: state.clone(),
        events,
        next_phase,
        game_over: None,
    }
}

fn apply_draw_tile(
    state: &mut RiverFarmState,
    phase: &Phase,
    players: &[Player],
) -> TransitionResult<RiverFarmState> {
    let idx = player_index(phase);

    let mut rng = StdRng::seed_from_u64(state.seed ^ state.draws.wrapping_mul(DRAW_SEED_MIX));
    let tile: u8 = rng.gen_range(1..=6);
    state.draws += 1;
    state.drawn_tile = Some(tile);
    state.rotation = 0;
    state.current_player_index = idx;

    tracing::debug!(player = idx, tile, "tile drawn");

    let events = vec![Event {
        event_type: "tile_drawn".into(),
        player_id: Some(players[idx].player_id.clone()),
        payload: serde_json::json!({
            "tile": tile,
            "name": tile_name(tile),
            "rotatable": is_rotatable(tile),
        }),
    }];

    TransitionResult {
        scores: state.float_scores(players),
        state: state.clone(),
        events,
        next_phase: player_phase("place_tile", "place_tile", idx, players),
        game_over: None,
    }
}

fn apply_rotate_tile(
    state: &mut RiverFarmState,
    phase: &Phase,
    action: &Action,
    players: &[Player],
) -> TransitionResult<RiverFarmState> {
    state.rotation = (state.rotation + 1) % 4;

    let events = vec![Event {
        event_type: "tile_rotated".into(),
        player_id: Some(action.player_id.clone()),
        payload: serde_json::json!({
            "tile": state.drawn_tile,
            "rotation": state.rotation,
        }),
    }];

    TransitionResult {
        scores: state.float_scores(players),
        state: state.clone(),
        events,
        next_phase: phase.clone(),
        game_over: None,
    }
}

fn apply_place_tile(
    state: &mut RiverFarmState,
    phase: &Phase,
    action: &Action,
    players: &[Player],
) -> TransitionResult<RiverFarmState> {
    let idx = player_index(phase);
    let seat = Seat::from_index(idx);
    let pos = parse_position(&action.payload)
        .unwrap_or_else(|e| panic!("apply_action called with unvalidated payload: {e}"));
    let tile_type = state
        .drawn_tile
        .take()
        .unwrap_or_else(|| panic!("place_tile applied with no drawn tile"));

    let tile = if tile_type == FIELD {
        PlacedTile::field(seat)
    } else {
        PlacedTile::new(tile_type, state.rotation)
    };
    state.board.place(pos, tile);
    state.rotation = 0;

    tracing::debug!(seat = seat.number(), pos = ?pos, tile = tile_type, rotation = tile.rotation, "tile placed");

    let mut events = vec![Event {
        event_type: "tile_placed".into(),
        player_id: Some(players[idx].player_id.clone()),
        payload: serde_json::json!({
            "tile": tile_type,
            "row": pos.0,
            "col": pos.1,
            "rotation": tile.rotation,
            "owner": tile.owner.map(Seat::number),
        }),
    }];
    let (analysis, refresh_events) = refresh_after_placement(state, players);
    events.extend(refresh_events);

    if state.board.is_full() {
        return finish_game(state, analysis, events, players);
    }

    let next_index = seat.other().index();
    state.current_player_index = next_index;

    TransitionResult {
        scores: state.float_scores(players),
        state: state.clone(),
        events,
        next_phase: draw_phase(next_index),
        game_over: None,
    }
}

fn finish_game(
    state: &mut RiverFarmState,
    analysis: Analysis,
    mut events: Vec<Event>,
    players: &[Player],
) -> TransitionResult<RiverFarmState> {
    let scores = state.float_scores(players);
    let [s1, s2] = state.scores;

    let (winners, reason) = if s1 > s2 {
        (vec![players[0].player_id.clone()], "normal")
    } else if s2 > s1 {
        (vec![players[1].player_id.clone()], "normal")
    } else {
        (players.iter().map(|p| p.player_id.clone()).collect(), "draw")
    };

    let routes: HashMap<String, serde_json::Value> = Seat::ALL
        .iter()
        .map(|&seat| {
            (
                players[seat.index()].player_id.clone(),
                serde_json::json!(results_entries(&analysis, seat)),
            )
        })
        .collect();

    let mut details = HashMap::new();
    details.insert("board".to_string(), serde_json::json!(state.board.to_string()));
    details.insert("routes".to_string(), serde_json::json!(routes));
    details.insert("source_tiles".to_string(), serde_json::json!(analysis.source_tiles));

    tracing::info!(p1 = s1, p2 = s2, ?winners, reason, "game finished");

    events.push(Event {
        event_type: "game_finished".into(),
        player_id: None,
        payload: serde_json::json!({
            "winners": winners,
            "scores": scores,
            "reason": reason,
        }),
    });

    TransitionResult {
        scores: scores.clone(),
        state: state.clone(),
        events,
        next_phase: game_over_phase(),
        game_over: Some(GameResult {
            winners,
            final_scores: scores,
            reason: reason.into(),
            details,
        }),
    }
}
