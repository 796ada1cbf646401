//! Core engine data types shared by the turn controller, simulator and playouts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type PlayerId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub display_name: String,
    #[serde(default)]
    pub seat_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Seed for dice rolls. `None` seeds from entropy.
    pub random_seed: Option<u64>,
    /// Emit `live_networks_updated` events after each placement.
    #[serde(default = "default_true")]
    pub highlight_live_networks: bool,
}

fn default_true() -> bool {
    true
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            random_seed: None,
            highlight_live_networks: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedAction {
    pub player_id: PlayerId,
    pub action_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    #[serde(default)]
    pub expected_actions: Vec<ExpectedAction>,
    #[serde(default)]
    pub auto_resolve: bool,
    #[serde(default = "default_metadata")]
    pub metadata: serde_json::Value,
}

fn default_metadata() -> serde_json::Value {
    serde_json::json!({})
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub action_type: String,
    pub player_id: PlayerId,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_type: String,
    #[serde(default)]
    pub player_id: Option<PlayerId>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResult {
    pub winners: Vec<PlayerId>,
    pub final_scores: HashMap<String, f64>,
    #[serde(default = "default_reason")]
    pub reason: String,
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
}

fn default_reason() -> String {
    "normal".to_string()
}

/// Transition result with typed game state.
#[derive(Debug, Clone)]
pub struct TransitionResult<S> {
    pub state: S,
    pub events: Vec<Event>,
    pub next_phase: Phase,
    pub scores: HashMap<String, f64>,
    pub game_over: Option<GameResult>,
}
