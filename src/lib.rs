//! Bunny Hop - a platformer engine driven by learner scripts
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, level state)
//! - `engine`: Engine instance with lifecycle and the script command surface
//! - `config`: Data-driven physics tuning
//! - `script` / `runner`: Reference harness that paces a flat script against the engine
//! - `web`: Browser binding and animation-frame loop (wasm32 only)

pub mod clock;
pub mod config;
pub mod engine;
pub mod runner;
pub mod script;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, Stats};
pub use runner::{RunLimits, RunOutcome, RunReport, ScriptRunner};
pub use script::{Script, ScriptError, Statement};
pub use sim::{GameState, Level, LevelCatalog, LevelData, LevelError, Phase};

/// Game configuration constants
pub mod consts {
    /// Canvas width (the actor is clamped horizontally to it)
    pub const CANVAS_WIDTH: f32 = 800.0;

    /// Bunny bounding box
    pub const BUNNY_WIDTH: f32 = 40.0;
    pub const BUNNY_HEIGHT: f32 = 50.0;

    /// Downward acceleration per step while airborne
    pub const GRAVITY: f32 = 0.8;
    /// Horizontal velocity multiplier applied every step
    pub const FRICTION: f32 = 0.9;
    /// Vertical velocity set by a jump (negative is up)
    pub const JUMP_VELOCITY: f32 = -15.0;
    /// Horizontal velocity added per step of a move command
    pub const MOVE_ACCEL: f32 = 3.0;

    /// Vertical tolerance below a platform top that still counts as landing
    pub const LANDING_BAND: f32 = 20.0;

    /// Pickup radii (center of bunny to item position)
    pub const CARROT_RADIUS: f32 = 25.0;
    pub const ITEM_RADIUS: f32 = 20.0;
    /// Radius used by an explicit `collect()` command
    pub const COLLECT_RADIUS: f32 = 30.0;

    /// Level defaults used when a descriptor leaves a field out
    pub const DEFAULT_START_X: f32 = 50.0;
    pub const DEFAULT_START_Y: f32 = 400.0;
    pub const DEFAULT_GROUND_Y: f32 = 500.0;
    pub const DEFAULT_GOAL: (f32, f32, f32, f32) = (750.0, 400.0, 50.0, 50.0);
    pub const DEFAULT_MOVE_SPEED: f32 = 1.5;
    pub const DEFAULT_MOVE_RANGE: f32 = 100.0;
}
