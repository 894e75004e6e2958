use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Tolerances for every component, passed explicitly to each call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub collision: CollisionConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub rooms: RoomConfig,
    #[serde(default)]
    pub layers: LayerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionConfig {
    /// Distance each bound is shrunk by before overlap tests
    #[serde(default = "default_collision_tolerance")]
    pub tolerance: f64,
}

fn default_collision_tolerance() -> f64 {
    15.0
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            tolerance: default_collision_tolerance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Minimum per-axis pointer travel (screen units) before a drag moves anything
    #[serde(default = "default_drag_dead_zone")]
    pub drag_dead_zone: f64,
    /// Extra reach around a wall's half thickness for click hit-testing
    #[serde(default = "default_wall_hit_tolerance")]
    pub wall_hit_tolerance: f64,
}

fn default_drag_dead_zone() -> f64 {
    1.0
}

fn default_wall_hit_tolerance() -> f64 {
    5.0
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_dead_zone: default_drag_dead_zone(),
            wall_hit_tolerance: default_wall_hit_tolerance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Endpoints closer than this become one graph node
    #[serde(default = "default_snap_tolerance")]
    pub snap_tolerance: f64,
    #[serde(default = "default_min_room_area")]
    pub min_room_area: f64,
    /// Maximum gap between dangling wall ends closed by a pseudo segment (0 = off)
    #[serde(default)]
    pub opening_bridge_distance: f64,
}

fn default_snap_tolerance() -> f64 {
    0.01
}

fn default_min_room_area() -> f64 {
    0.01
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: default_snap_tolerance(),
            min_room_area: default_min_room_area(),
            opening_bridge_distance: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    #[serde(default = "default_large_furniture_min_area")]
    pub large_furniture_min_area: f64,
    #[serde(default = "default_medium_furniture_min_area")]
    pub medium_furniture_min_area: f64,
}

fn default_large_furniture_min_area() -> f64 {
    10_000.0
}

fn default_medium_furniture_min_area() -> f64 {
    2_500.0
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            large_furniture_min_area: default_large_furniture_min_area(),
            medium_furniture_min_area: default_medium_furniture_min_area(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse engine config JSON")
    }

    /// Load a JSON config file; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config: {}", path.display()))?;
        let config = Self::from_json_str(&raw)
            .with_context(|| format!("Invalid engine config: {}", path.display()))?;
        info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Apply `FLOORPLAN_*` environment overrides on top of this config
    pub fn with_env_overrides(mut self) -> Self {
        override_from_env("FLOORPLAN_COLLISION_TOLERANCE", &mut self.collision.tolerance);
        override_from_env("FLOORPLAN_DRAG_DEAD_ZONE", &mut self.interaction.drag_dead_zone);
        override_from_env(
            "FLOORPLAN_WALL_HIT_TOLERANCE",
            &mut self.interaction.wall_hit_tolerance,
        );
        override_from_env("FLOORPLAN_SNAP_TOLERANCE", &mut self.rooms.snap_tolerance);
        override_from_env("FLOORPLAN_MIN_ROOM_AREA", &mut self.rooms.min_room_area);
        override_from_env(
            "FLOORPLAN_OPENING_BRIDGE_DISTANCE",
            &mut self.rooms.opening_bridge_distance,
        );
        self
    }
}

fn override_from_env(key: &str, target: &mut f64) {
    let Ok(raw) = std::env::var(key) else {
        return;
    };

    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => *target = value,
        _ => warn!("Ignoring {}={:?}: not a finite number", key, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.collision.tolerance, 15.0);
        assert_eq!(config.interaction.drag_dead_zone, 1.0);
        assert_eq!(config.rooms.opening_bridge_distance, 0.0);
        assert!(config.layers.large_furniture_min_area > config.layers.medium_furniture_min_area);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{"collision": {"tolerance": 4.0}, "rooms": {}}"#)
                .unwrap();
        assert_eq!(config.collision.tolerance, 4.0);
        assert_eq!(config.rooms, RoomConfig::default());
        assert_eq!(config.interaction, InteractionConfig::default());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(EngineConfig::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("FLOORPLAN_OPENING_BRIDGE_DISTANCE", "90");
        std::env::set_var("FLOORPLAN_MIN_ROOM_AREA", "lots");
        let config = EngineConfig::default().with_env_overrides();
        std::env::remove_var("FLOORPLAN_OPENING_BRIDGE_DISTANCE");
        std::env::remove_var("FLOORPLAN_MIN_ROOM_AREA");

        assert_eq!(config.rooms.opening_bridge_distance, 90.0);
        assert_eq!(config.rooms.min_room_area, default_min_room_area());
    }
}
