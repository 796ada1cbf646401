//! Game and playout settings, loaded from TOML at runtime.

use std::path::Path;

use serde::Deserialize;

use crate::engine::models::GameConfig;

/// `[game]` table.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameSettings {
    pub player_names: [String; 2],
    pub random_seed: Option<u64>,
    pub highlight_live_networks: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            player_names: ["Player 1".into(), "Player 2".into()],
            random_seed: None,
            highlight_live_networks: true,
        }
    }
}

impl GameSettings {
    pub fn to_game_config(&self) -> GameConfig {
        GameConfig {
            random_seed: self.random_seed,
            highlight_live_networks: self.highlight_live_networks,
        }
    }
}

/// `[playout]` table.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlayoutSettings {
    pub games: usize,
    pub base_seed: u64,
}

impl Default for PlayoutSettings {
    fn default() -> Self {
        Self {
            games: 100,
            base_seed: 42,
        }
    }
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub game: GameSettings,
    #[serde(default)]
    pub playout: PlayoutSettings,
}

/// Load settings from a TOML file at the given path.
pub fn load_settings(path: &Path) -> Result<Settings, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    toml::from_str(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

/// Try to load settings from well-known paths, returning defaults if none found.
pub fn load_default_settings() -> Settings {
    let candidates = [
        "river_farm.toml",
        "../river_farm.toml",
        "/etc/river_farm/river_farm.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_settings(p) {
                Ok(settings) => {
                    tracing::info!(path = %p.display(), "loaded settings");
                    return settings;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load settings");
                }
            }
        }
    }
    tracing::info!("no river_farm.toml found, using built-in defaults");
    Settings::default()
}
