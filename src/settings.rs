//! Game settings and preferences
//!
//! Stored as a JSON file next to the saved levels. Missing or unreadable
//! files fall back to defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{GRID_HEIGHT, GRID_WIDTH};
use crate::level::LevelDefinition;
use crate::renderer::{RenderConfig, Skin, Theme};
use crate::sim::{AiDifficulty, GameMode, MatchConfig, PlayerMode};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Match ===
    pub grid_width: i32,
    pub grid_height: i32,
    pub game_mode: GameMode,
    pub player_mode: PlayerMode,
    pub ai_difficulty: AiDifficulty,

    // === Look ===
    pub theme: Theme,
    pub skin: Skin,
    /// Minimize shake and chromatic effects
    pub reduced_motion: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_width: GRID_WIDTH,
            grid_height: GRID_HEIGHT,
            game_mode: GameMode::Classic,
            player_mode: PlayerMode::Single,
            ai_difficulty: AiDifficulty::Learner,

            theme: Theme::Neon,
            skin: Skin::Cyber,
            reduced_motion: false,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Clamp values loaded from disk into their valid ranges
    pub fn sanitized(mut self) -> Self {
        self.grid_width = self.grid_width.clamp(8, 64);
        self.grid_height = self.grid_height.clamp(8, 64);
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self
    }

    /// Match parameters for a new game, optionally on a custom level
    pub fn match_config(&self, level: Option<LevelDefinition>) -> MatchConfig {
        MatchConfig {
            width: self.grid_width,
            height: self.grid_height,
            mode: self.game_mode,
            player_mode: self.player_mode,
            ai_difficulty: self.ai_difficulty,
            level,
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            theme: self.theme,
            skin: self.skin,
            reduced_motion: self.reduced_motion,
        }
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings.sanitized()
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings (best effort)
    pub fn save(&self, path: &Path) {
        let result = serde_json::to_string_pretty(self)
            .map_err(std::io::Error::other)
            .and_then(|json| {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, json)
            });
        match result {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings to {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"theme":"ocean","ai_difficulty":"master"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Ocean);
        assert_eq!(settings.ai_difficulty, AiDifficulty::Master);
        assert_eq!(settings.grid_width, GRID_WIDTH);
        assert_eq!(settings.skin, Skin::Cyber);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let settings: Settings =
            serde_json::from_str(r#"{"music_volume":0.2,"skin":"ice"}"#).unwrap();
        assert_eq!(settings.skin, Skin::Ice);
        assert_eq!(settings.sfx_volume, 1.0);
    }

    #[test]
    fn test_sanitized_clamps() {
        let settings = Settings {
            grid_width: 2,
            master_volume: 3.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.grid_width, 8);
        assert_eq!(settings.master_volume, 1.0);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("chrono-serpent-settings-{}", std::process::id()))
            .join("settings.json");
        let settings = Settings {
            game_mode: GameMode::TimeTrial,
            skin: Skin::Fire,
            ..Default::default()
        };
        settings.save(&path);
        assert_eq!(Settings::load(&path), settings);
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("chrono-serpent-does-not-exist.json");
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_match_config_carries_choices() {
        let settings = Settings {
            player_mode: PlayerMode::VersusAi,
            ..Default::default()
        };
        let config = settings.match_config(None);
        assert_eq!(config.player_mode, PlayerMode::VersusAi);
        assert_eq!(config.width, GRID_WIDTH);
        assert!(config.level.is_none());
    }
}
