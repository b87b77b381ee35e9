//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed steps only, no wall-clock reads
//! - Stable iteration order (definition order of every collection)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geom;
pub mod level;
pub mod state;
pub mod tick;

pub use collision::{Contacts, check_collisions, collect_nearby};
pub use geom::{Rect, distance};
pub use level::{CollectibleData, ItemId, Level, LevelCatalog, LevelData, LevelError, PlatformData};
pub use state::{
    Bunny, Collectible, CollectibleKind, GameState, MoveRecord, MovingPlatform, Phase,
};
pub use tick::tick;
