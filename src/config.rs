//! Physics tuning
//!
//! Every field has a default from `consts`, so a tuning file only needs the
//! values it changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bad engine config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Engine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === World ===
    pub canvas_width: f32,
    pub bunny_width: f32,
    pub bunny_height: f32,

    // === Motion ===
    pub gravity: f32,
    /// Multiplier on horizontal velocity each step (exponential decay)
    pub friction: f32,
    pub jump_velocity: f32,
    /// Velocity added per step of `move_right`/`move_left`
    pub move_accel: f32,

    // === Collision ===
    pub landing_band: f32,
    pub carrot_radius: f32,
    /// Stars and coins
    pub item_radius: f32,
    /// Radius of the explicit `collect()` command
    pub collect_radius: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            bunny_width: BUNNY_WIDTH,
            bunny_height: BUNNY_HEIGHT,

            gravity: GRAVITY,
            friction: FRICTION,
            jump_velocity: JUMP_VELOCITY,
            move_accel: MOVE_ACCEL,

            landing_band: LANDING_BAND,
            carrot_radius: CARROT_RADIUS,
            item_radius: ITEM_RADIUS,
            collect_radius: COLLECT_RADIUS,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rightmost x the bunny's left edge may reach
    pub fn max_bunny_x(&self) -> f32 {
        self.canvas_width - self.bunny_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"gravity": 0.5, "canvas_width": 1024}"#).unwrap();
        assert_eq!(config.gravity, 0.5);
        assert_eq!(config.canvas_width, 1024.0);
        assert_eq!(config.friction, FRICTION);
        assert_eq!(config.max_bunny_x(), 1024.0 - BUNNY_WIDTH);
    }

    #[test]
    fn test_bad_json() {
        assert!(EngineConfig::from_json("{\"gravity\": \"heavy\"}").is_err());
    }
}
