//! Game state and core simulation types
//!
//! All state the engine owns for the currently loaded level lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::level::Level;
use crate::config::EngineConfig;

/// Lifecycle phase of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Constructed, no level loaded yet
    #[default]
    Idle,
    /// Level applied, physics and commands inactive
    Loaded,
    /// Physics advancing, commands effective
    Running,
    /// Paused by `stop()`, behaves like Loaded
    Stopped,
    /// Goal reached with every requirement met (terminal until reload)
    Complete,
}

/// The player-controlled bunny
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bunny {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
    pub jumping: bool,
}

impl Bunny {
    pub fn new(size: Vec2) -> Self {
        Self {
            pos: Vec2::new(crate::consts::DEFAULT_START_X, crate::consts::DEFAULT_START_Y),
            vel: Vec2::ZERO,
            size,
            on_ground: false,
            jumping: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// y coordinate of the feet
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Put the bunny at rest on `start`, grounded if its feet already reach the ground line
    pub fn place(&mut self, start: Vec2, ground_y: f32) {
        self.pos = start;
        self.vel = Vec2::ZERO;
        self.on_ground = self.bottom() >= ground_y;
        self.jumping = false;
    }

    /// Grounded and not already mid-jump
    pub fn can_jump(&self) -> bool {
        self.on_ground && !self.jumping
    }
}

/// A platform that oscillates between `origin` and `origin + range` on its enabled axes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingPlatform {
    pub rect: Rect,
    pub origin: Vec2,
    /// +1 or -1 per axis
    pub direction: Vec2,
    pub speed: f32,
    pub range: f32,
    pub move_x: bool,
    pub move_y: bool,
}

impl MovingPlatform {
    pub fn new(rect: Rect, speed: f32, range: f32, move_x: bool, move_y: bool) -> Self {
        Self {
            rect,
            origin: Vec2::new(rect.x, rect.y),
            direction: Vec2::ONE,
            speed,
            range,
            move_x,
            move_y,
        }
    }

    /// Advance one step, bouncing exactly at the range bounds
    pub fn step(&mut self) {
        if self.move_x {
            let (x, dir) = bounce(self.rect.x, self.origin.x, self.range, self.speed, self.direction.x);
            self.rect.x = x;
            self.direction.x = dir;
        }
        if self.move_y {
            let (y, dir) = bounce(self.rect.y, self.origin.y, self.range, self.speed, self.direction.y);
            self.rect.y = y;
            self.direction.y = dir;
        }
    }

    /// Horizontal distance a rider is carried per step
    pub fn carry_x(&self) -> f32 {
        if self.move_x {
            self.speed * self.direction.x
        } else {
            0.0
        }
    }
}

fn bounce(pos: f32, origin: f32, range: f32, speed: f32, dir: f32) -> (f32, f32) {
    let next = pos + speed * dir;
    if next > origin + range {
        (origin + range, -1.0)
    } else if next < origin {
        (origin, 1.0)
    } else {
        (next, dir)
    }
}

/// Collectible kinds. They differ only in how close the bunny must pass to pick them up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    Carrot,
    Star,
    Coin,
}

impl CollectibleKind {
    pub const ALL: [CollectibleKind; 3] = [Self::Carrot, Self::Star, Self::Coin];

    /// Prefix used for positional default ids
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectibleKind::Carrot => "carrot",
            CollectibleKind::Star => "star",
            CollectibleKind::Coin => "coin",
        }
    }

    /// Radius for automatic pickup while moving
    pub fn pickup_radius(&self, config: &EngineConfig) -> f32 {
        match self {
            CollectibleKind::Carrot => config.carrot_radius,
            CollectibleKind::Star | CollectibleKind::Coin => config.item_radius,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: String,
    pub kind: CollectibleKind,
    pub pos: Vec2,
}

/// One entry of the move history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum MoveRecord {
    MoveRight { steps: f32 },
    MoveLeft { steps: f32 },
    Jump,
    Wait { seconds: f32 },
}

/// Complete engine-owned state for the loaded level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: Phase,
    pub bunny: Bunny,
    /// Where the bunny starts; obstacles and `reset()` send it back here
    pub start: Vec2,
    pub ground_y: f32,
    pub platforms: Vec<Rect>,
    pub moving_platforms: Vec<MovingPlatform>,
    /// Carrots, then stars, then coins, each in definition order
    pub collectibles: Vec<Collectible>,
    pub obstacles: Vec<Rect>,
    pub goal: Rect,
    pub required_carrots: u32,
    /// Ids picked up since the last load/reset, in pickup order
    pub collected: Vec<String>,
    pub carrot_count: u32,
    pub move_count: u32,
    pub move_history: Vec<MoveRecord>,
    /// Physics steps since the last load/reset
    pub ticks: u64,
    /// Clock reading (ms) when the current run started
    pub start_time_ms: Option<f64>,
    /// Whole seconds since `start_time_ms`
    pub current_time: u64,
}

impl GameState {
    /// Empty state with no level loaded
    pub fn new(config: &EngineConfig) -> Self {
        let (x, y, w, h) = crate::consts::DEFAULT_GOAL;
        Self {
            phase: Phase::Idle,
            bunny: Bunny::new(Vec2::new(config.bunny_width, config.bunny_height)),
            start: Vec2::new(crate::consts::DEFAULT_START_X, crate::consts::DEFAULT_START_Y),
            ground_y: crate::consts::DEFAULT_GROUND_Y,
            platforms: Vec::new(),
            moving_platforms: Vec::new(),
            collectibles: Vec::new(),
            obstacles: Vec::new(),
            goal: Rect::new(x, y, w, h),
            required_carrots: 0,
            collected: Vec::new(),
            carrot_count: 0,
            move_count: 0,
            move_history: Vec::new(),
            ticks: 0,
            start_time_ms: None,
            current_time: 0,
        }
    }

    /// Replace every entity collection with the level's and clear progress
    pub fn load(&mut self, level: Level) {
        self.platforms = level.platforms;
        self.moving_platforms = level.moving_platforms;
        self.collectibles = level.collectibles;
        self.obstacles = level.obstacles;
        self.goal = level.goal;
        self.required_carrots = level.required_carrots;
        self.start = level.start;
        self.ground_y = level.ground_y;
        self.restart();
    }

    /// Back to the start position with all level-scoped progress cleared.
    /// Moving platforms keep their current position.
    pub fn restart(&mut self) {
        self.bunny.place(self.start, self.ground_y);
        self.collected.clear();
        self.carrot_count = 0;
        self.move_count = 0;
        self.move_history.clear();
        self.ticks = 0;
        self.start_time_ms = None;
        self.current_time = 0;
        self.phase = Phase::Loaded;
    }

    pub fn is_collected(&self, id: &str) -> bool {
        self.collected.iter().any(|c| c == id)
    }

    /// Record a pickup. Returns false if the id was already collected.
    pub fn mark_collected(&mut self, id: &str) -> bool {
        if self.is_collected(id) {
            return false;
        }
        self.collected.push(id.to_string());
        self.carrot_count += 1;
        true
    }

    /// Every defined collectible of every kind has been picked up
    pub fn all_collected(&self) -> bool {
        CollectibleKind::ALL.iter().all(|&kind| {
            self.collectibles
                .iter()
                .filter(|c| c.kind == kind)
                .all(|c| self.is_collected(&c.id))
        })
    }

    /// The pickup counter meets the level's threshold (0 means no threshold)
    pub fn required_met(&self) -> bool {
        self.required_carrots == 0 || self.carrot_count >= self.required_carrots
    }
}
