//! GamePlugin trait: the interface the turn controller implements for the simulator.

use std::collections::HashMap;

use crate::engine::models::*;

/// A turn-based game driven through phases and JSON action payloads.
pub trait GamePlugin: Send + Sync {
    type State: Clone + Send + Sync;

    fn game_id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn min_players(&self) -> u32;
    fn max_players(&self) -> u32;
    fn description(&self) -> &str;

    /// Create initial game state from players + config.
    fn create_initial_state(
        &self,
        players: &[Player],
        config: &GameConfig,
    ) -> (Self::State, Phase, Vec<Event>);

    /// Return all legal action payloads for this player in the current phase.
    fn get_valid_actions(
        &self,
        state: &Self::State,
        phase: &Phase,
        player_id: &str,
    ) -> Vec<Action>;

    /// Validate an action. Returns None if valid, Some(error) if invalid.
    fn validate_action(
        &self,
        state: &Self::State,
        phase: &Phase,
        action: &Action,
    ) -> Option<String>;

    /// Apply a validated action, returning new state + events + next phase.
    fn apply_action(
        &self,
        state: &Self::State,
        phase: &Phase,
        action: &Action,
        players: &[Player],
    ) -> TransitionResult<Self::State>;

    /// Filter state to what this player can see.
    fn get_player_view(
        &self,
        state: &Self::State,
        phase: &Phase,
        player_id: Option<&str>,
        players: &[Player],
    ) -> serde_json::Value;

    /// Current scores keyed by player id.
    fn get_scores(&self, state: &Self::State, players: &[Player]) -> HashMap<String, f64>;
}
