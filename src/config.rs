use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{
    get_frightened_duration, get_level_speed_multiplier, DEFAULT_CORNER_TOLERANCE, DEFAULT_LAYOUT,
    ENTITY_RADIUS_FACTOR, GHOST_BASE_SPEED, GHOST_EATEN_SPEED, GHOST_FRIGHTENED_SPEED,
    LEVEL_TRANSITION_DELAY_SEC, LIFE_LOST_DELAY_SEC, PLAYER_BASE_SPEED, TILE_SIZE,
};
use crate::error::ConfigError;
use crate::types::TilePos;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub tile_size: f32,
    pub player_speed: f32,
    pub ghost_speed: f32,
    pub frightened_speed: f32,
    pub eaten_speed: f32,
    pub frightened_duration: f32,
    pub corner_tolerance: f32,
    pub life_lost_delay: f32,
    pub level_transition_delay: f32,
    pub entity_radius: f32,
    pub scatter_targets: Option<[TilePos; 4]>,
    pub home_tile: Option<TilePos>,
}

impl LevelConfig {
    pub fn for_level(level: u32) -> Self {
        let (player_mul, ghost_mul) = get_level_speed_multiplier(level);
        Self {
            tile_size: TILE_SIZE,
            player_speed: PLAYER_BASE_SPEED * TILE_SIZE * player_mul,
            ghost_speed: GHOST_BASE_SPEED * TILE_SIZE * ghost_mul,
            frightened_speed: GHOST_FRIGHTENED_SPEED * TILE_SIZE,
            eaten_speed: GHOST_EATEN_SPEED * TILE_SIZE,
            frightened_duration: get_frightened_duration(level),
            corner_tolerance: DEFAULT_CORNER_TOLERANCE,
            life_lost_delay: LIFE_LOST_DELAY_SEC,
            level_transition_delay: LEVEL_TRANSITION_DELAY_SEC,
            entity_radius: ENTITY_RADIUS_FACTOR * TILE_SIZE,
            scatter_targets: None,
            home_tile: None,
        }
    }

    pub fn sanitized(mut self) -> Self {
        self.tile_size = sanitize_non_negative(self.tile_size);
        if self.tile_size <= 0.0 {
            self.tile_size = TILE_SIZE;
        }
        self.player_speed = sanitize_non_negative(self.player_speed);
        self.ghost_speed = sanitize_non_negative(self.ghost_speed);
        self.frightened_speed = sanitize_non_negative(self.frightened_speed);
        self.eaten_speed = sanitize_non_negative(self.eaten_speed);
        self.frightened_duration = sanitize_non_negative(self.frightened_duration);
        self.corner_tolerance = sanitize_non_negative(self.corner_tolerance);
        self.life_lost_delay = sanitize_non_negative(self.life_lost_delay);
        self.level_transition_delay = sanitize_non_negative(self.level_transition_delay);
        self.entity_radius = sanitize_non_negative(self.entity_radius);
        self
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::for_level(1)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelTuning {
    pub level_min: u32,
    pub tile_size: Option<f32>,
    pub player_speed: Option<f32>,
    pub ghost_speed: Option<f32>,
    pub frightened_speed: Option<f32>,
    pub eaten_speed: Option<f32>,
    pub frightened_duration: Option<f32>,
    pub corner_tolerance: Option<f32>,
    pub life_lost_delay: Option<f32>,
    pub level_transition_delay: Option<f32>,
    pub radius_factor: Option<f32>,
    pub scatter_targets: Option<[TilePos; 4]>,
    pub home_tile: Option<TilePos>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub maze: Option<Vec<String>>,
    pub levels: Vec<LevelTuning>,
}

impl ConfigFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?;
        debug!(
            path = %path.display(),
            rows = config.levels.len(),
            custom_maze = config.maze.is_some(),
            "loaded config file"
        );
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn layout(&self) -> Vec<String> {
        match &self.maze {
            Some(rows) => rows.clone(),
            None => DEFAULT_LAYOUT.iter().map(|row| row.to_string()).collect(),
        }
    }

    pub fn tuning_for(&self, level: u32) -> Option<&LevelTuning> {
        self.levels
            .iter()
            .filter(|row| row.level_min <= level)
            .max_by_key(|row| row.level_min)
    }

    pub fn level_config(&self, level: u32) -> LevelConfig {
        let mut config = LevelConfig::for_level(level);
        let Some(row) = self.tuning_for(level) else {
            return config;
        };

        if let Some(tile_size) = row.tile_size.map(sanitize_non_negative) {
            if tile_size > 0.0 {
                config = rescale(config, tile_size);
            }
        }
        let (player_mul, ghost_mul) = get_level_speed_multiplier(level);
        let ts = config.tile_size;
        if let Some(speed) = row.player_speed {
            config.player_speed = speed * ts * player_mul;
        }
        if let Some(speed) = row.ghost_speed {
            config.ghost_speed = speed * ts * ghost_mul;
        }
        if let Some(speed) = row.frightened_speed {
            config.frightened_speed = speed * ts;
        }
        if let Some(speed) = row.eaten_speed {
            config.eaten_speed = speed * ts;
        }
        if let Some(duration) = row.frightened_duration {
            config.frightened_duration = duration;
        }
        if let Some(tolerance) = row.corner_tolerance {
            config.corner_tolerance = tolerance;
        }
        if let Some(delay) = row.life_lost_delay {
            config.life_lost_delay = delay;
        }
        if let Some(delay) = row.level_transition_delay {
            config.level_transition_delay = delay;
        }
        if let Some(factor) = row.radius_factor {
            config.entity_radius = factor * ts;
        }
        if row.scatter_targets.is_some() {
            config.scatter_targets = row.scatter_targets;
        }
        if row.home_tile.is_some() {
            config.home_tile = row.home_tile;
        }
        config.sanitized()
    }
}

fn rescale(config: LevelConfig, tile_size: f32) -> LevelConfig {
    let ratio = tile_size / config.tile_size;
    LevelConfig {
        tile_size,
        player_speed: config.player_speed * ratio,
        ghost_speed: config.ghost_speed * ratio,
        frightened_speed: config.frightened_speed * ratio,
        eaten_speed: config.eaten_speed * ratio,
        corner_tolerance: config.corner_tolerance * ratio,
        entity_radius: config.entity_radius * ratio,
        ..config
    }
}

fn sanitize_non_negative(value: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_defaults_scale_speeds_by_tile_size() {
        let config = LevelConfig::for_level(1);
        assert_eq!(config.tile_size, TILE_SIZE);
        assert!((config.player_speed - PLAYER_BASE_SPEED * TILE_SIZE * 0.8).abs() < 1e-3);
        assert!((config.ghost_speed - GHOST_BASE_SPEED * TILE_SIZE * 0.75).abs() < 1e-3);
        assert!(config.eaten_speed > config.ghost_speed);
        assert!(config.frightened_speed < config.ghost_speed);
        assert!(config.scatter_targets.is_none());
    }

    #[test]
    fn empty_json_yields_defaults() {
        let file = ConfigFile::from_json("{}").expect("empty object parses");
        assert!(file.maze.is_none());
        assert_eq!(file.level_config(3), LevelConfig::for_level(3));
        assert_eq!(file.layout().len(), DEFAULT_LAYOUT.len());
    }

    #[test]
    fn tuning_rows_use_highest_level_min() {
        let file = ConfigFile::from_json(
            r#"{
                "levels": [
                    { "level_min": 1, "frightened_duration": 9.0 },
                    { "level_min": 4, "frightened_duration": 2.0, "corner_tolerance": 2.5 }
                ]
            }"#,
        )
        .expect("config parses");
        assert_eq!(file.level_config(1).frightened_duration, 9.0);
        assert_eq!(file.level_config(3).frightened_duration, 9.0);
        let late = file.level_config(7);
        assert_eq!(late.frightened_duration, 2.0);
        assert_eq!(late.corner_tolerance, 2.5);
    }

    #[test]
    fn invalid_values_are_clamped_to_zero() {
        let raw = r#"{ "levels": [
            { "level_min": 0, "player_speed": -3.0, "life_lost_delay": -1.0 }
        ] }"#;
        let file = ConfigFile::from_json(raw).expect("config parses");
        let config = file.level_config(1);
        assert_eq!(config.player_speed, 0.0);
        assert_eq!(config.life_lost_delay, 0.0);
    }

    #[test]
    fn tile_size_override_rescales_pixel_values() {
        let raw = r#"{ "levels": [ { "level_min": 1, "tile_size": 8.0 } ] }"#;
        let file = ConfigFile::from_json(raw).expect("config parses");
        let base = LevelConfig::for_level(1);
        let config = file.level_config(1);
        assert_eq!(config.tile_size, 8.0);
        assert!((config.player_speed * 2.0 - base.player_speed).abs() < 1e-3);
        assert!((config.entity_radius * 2.0 - base.entity_radius).abs() < 1e-3);
    }

    #[test]
    fn geometry_overrides_are_carried() {
        let raw = serde_json::json!({
            "maze": ["#####", "#P.B#", "#KIC#", "#####"],
            "levels": [{
                "level_min": 1,
                "home_tile": { "row": 2, "col": 2 },
                "scatter_targets": [
                    { "row": 0, "col": 4 }, { "row": 0, "col": 0 },
                    { "row": 3, "col": 4 }, { "row": 3, "col": 0 }
                ]
            }]
        })
        .to_string();
        let file = ConfigFile::from_json(&raw).expect("config parses");
        assert_eq!(file.layout()[1], "#P.B#");
        let config = file.level_config(2);
        assert_eq!(config.home_tile, Some(TilePos::new(2, 2)));
        assert_eq!(config.scatter_targets.map(|t| t[3]), Some(TilePos::new(3, 0)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            ConfigFile::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            ConfigFile::load("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
