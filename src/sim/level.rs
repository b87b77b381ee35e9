//! Level descriptors and the level catalog
//!
//! `LevelData` mirrors the authored JSON: every field optional, camelCase
//! names. `Level` is the same level after a single defaulting pass, which is
//! what the engine actually loads.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geom::Rect;
use super::state::{Collectible, CollectibleKind, MovingPlatform};
use crate::consts::*;

const BUILTIN_LEVELS: &str = include_str!("../../assets/levels.json");

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level {0} not found")]
    NotFound(u32),
    #[error("bad level data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Authored collectible ids are sometimes numbers, sometimes strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    /// Any JSON number, including negative or fractional ones
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{n}"),
            ItemId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformData {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub moving: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_range: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_x: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_y: Option<bool>,
}

impl PlatformData {
    pub fn fixed(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    /// A moving platform with default motion parameters
    pub fn moving(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            moving: true,
            ..Self::fixed(x, y, width, height)
        }
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.move_speed = Some(speed);
        self
    }

    pub fn range(mut self, range: f32) -> Self {
        self.move_range = Some(range);
        self
    }

    pub fn axes(mut self, move_x: bool, move_y: bool) -> Self {
        self.move_x = Some(move_x);
        self.move_y = Some(move_y);
        self
    }

    fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectibleData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub x: f32,
    pub y: f32,
}

/// A level as authored. Missing fields are filled in by `Level::from`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    #[serde(default)]
    pub name: String,
    /// Presentation only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Presentation only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_y: Option<f32>,
    #[serde(default)]
    pub platforms: Vec<PlatformData>,
    #[serde(default)]
    pub carrots: Vec<CollectibleData>,
    #[serde(default)]
    pub stars: Vec<CollectibleData>,
    #[serde(default)]
    pub coins: Vec<CollectibleData>,
    #[serde(default)]
    pub obstacles: Vec<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_carrots: Option<u32>,
}

impl LevelData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn start(mut self, x: f32, y: f32) -> Self {
        self.start_x = Some(x);
        self.start_y = Some(y);
        self
    }

    pub fn ground(mut self, ground_y: f32) -> Self {
        self.ground_y = Some(ground_y);
        self
    }

    pub fn platform(mut self, platform: PlatformData) -> Self {
        self.platforms.push(platform);
        self
    }

    pub fn carrot(mut self, x: f32, y: f32) -> Self {
        self.carrots.push(CollectibleData { id: None, x, y });
        self
    }

    pub fn star(mut self, x: f32, y: f32) -> Self {
        self.stars.push(CollectibleData { id: None, x, y });
        self
    }

    pub fn coin(mut self, x: f32, y: f32) -> Self {
        self.coins.push(CollectibleData { id: None, x, y });
        self
    }

    pub fn obstacle(mut self, rect: Rect) -> Self {
        self.obstacles.push(rect);
        self
    }

    pub fn goal(mut self, rect: Rect) -> Self {
        self.goal = Some(rect);
        self
    }

    pub fn required(mut self, count: u32) -> Self {
        self.required_carrots = Some(count);
        self
    }

    /// Number of collectibles of every kind
    pub fn item_count(&self) -> usize {
        self.carrots.len() + self.stars.len() + self.coins.len()
    }
}

/// A fully-defaulted level, ready to load
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub start: Vec2,
    pub ground_y: f32,
    pub platforms: Vec<Rect>,
    pub moving_platforms: Vec<MovingPlatform>,
    pub collectibles: Vec<Collectible>,
    pub obstacles: Vec<Rect>,
    pub goal: Rect,
    pub required_carrots: u32,
}

impl From<&LevelData> for Level {
    fn from(data: &LevelData) -> Self {
        let (platforms, moving): (Vec<_>, Vec<_>) = data.platforms.iter().partition(|p| !p.moving);

        let moving_platforms = moving
            .into_iter()
            .map(|p| {
                MovingPlatform::new(
                    p.rect(),
                    p.move_speed.unwrap_or(DEFAULT_MOVE_SPEED),
                    p.move_range.unwrap_or(DEFAULT_MOVE_RANGE),
                    p.move_x.unwrap_or(true),
                    p.move_y.unwrap_or(false),
                )
            })
            .collect();

        let mut collectibles = Vec::with_capacity(data.item_count());
        for (kind, items) in [
            (CollectibleKind::Carrot, &data.carrots),
            (CollectibleKind::Star, &data.stars),
            (CollectibleKind::Coin, &data.coins),
        ] {
            collectibles.extend(items.iter().enumerate().map(|(i, item)| Collectible {
                id: item
                    .id
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| format!("{}_{}", kind.as_str(), i)),
                kind,
                pos: Vec2::new(item.x, item.y),
            }));
        }

        let (gx, gy, gw, gh) = DEFAULT_GOAL;
        Self {
            start: Vec2::new(
                data.start_x.unwrap_or(DEFAULT_START_X),
                data.start_y.unwrap_or(DEFAULT_START_Y),
            ),
            ground_y: data.ground_y.unwrap_or(DEFAULT_GROUND_Y),
            platforms: platforms.into_iter().map(PlatformData::rect).collect(),
            moving_platforms,
            collectibles,
            obstacles: data.obstacles.clone(),
            goal: data.goal.unwrap_or(Rect::new(gx, gy, gw, gh)),
            required_carrots: data.required_carrots.unwrap_or(0),
        }
    }
}

/// Numbered levels, as selected by the learner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelCatalog {
    levels: BTreeMap<u32, LevelData>,
}

impl LevelCatalog {
    /// Parse a JSON object keyed by level number
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The levels shipped with the game
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    pub fn get(&self, number: u32) -> Result<&LevelData, LevelError> {
        self.levels.get(&number).ok_or(LevelError::NotFound(number))
    }

    /// Level numbers in ascending order
    pub fn numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.levels.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &LevelData)> {
        self.levels.iter().map(|(n, l)| (*n, l))
    }

    /// The level after `number`, if there is one
    pub fn next_after(&self, number: u32) -> Option<u32> {
        self.levels
            .range((Bound::Excluded(number), Bound::Unbounded))
            .next()
            .map(|(n, _)| *n)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let level = Level::from(&LevelData::new());
        assert_eq!(level.start, Vec2::new(50.0, 400.0));
        assert_eq!(level.ground_y, 500.0);
        assert_eq!(level.goal, Rect::new(750.0, 400.0, 50.0, 50.0));
        assert_eq!(level.required_carrots, 0);
        assert!(level.platforms.is_empty());
        assert!(level.collectibles.is_empty());
    }

    #[test]
    fn test_platforms_split_and_motion_defaults() {
        let data = LevelData::new()
            .platform(PlatformData::fixed(0.0, 450.0, 300.0, 50.0))
            .platform(PlatformData::moving(300.0, 350.0, 100.0, 20.0))
            .platform(PlatformData::moving(500.0, 300.0, 100.0, 20.0).speed(3.0).range(40.0).axes(false, true));
        let level = Level::from(&data);

        assert_eq!(level.platforms, vec![Rect::new(0.0, 450.0, 300.0, 50.0)]);
        assert_eq!(level.moving_platforms.len(), 2);

        let p = &level.moving_platforms[0];
        assert_eq!(p.speed, 1.5);
        assert_eq!(p.range, 100.0);
        assert!(p.move_x && !p.move_y);
        assert_eq!(p.origin, Vec2::new(300.0, 350.0));

        let p = &level.moving_platforms[1];
        assert_eq!(p.speed, 3.0);
        assert_eq!(p.range, 40.0);
        assert!(!p.move_x && p.move_y);
    }

    #[test]
    fn test_positional_ids_per_kind() {
        let data = LevelData::new().carrot(1.0, 1.0).carrot(2.0, 2.0).star(3.0, 3.0).coin(4.0, 4.0);
        let ids: Vec<_> = Level::from(&data).collectibles.into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["carrot_0", "carrot_1", "star_0", "coin_0"]);
    }

    #[test]
    fn test_numeric_and_text_ids_from_json() {
        let data = LevelData::from_json(
            r#"{"name":"t","carrots":[{"id":1,"x":200,"y":380},{"id":"gold","x":1,"y":1},{"x":2,"y":2}]}"#,
        )
        .unwrap();
        let ids: Vec<_> = Level::from(&data).collectibles.into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["1", "gold", "carrot_2"]);
    }

    #[test]
    fn test_negative_and_fractional_ids_load() {
        let data = LevelData::from_json(
            r#"{"carrots":[{"id":-1,"x":10,"y":10}],"stars":[{"id":2.5,"x":20,"y":20}]}"#,
        )
        .unwrap();
        let ids: Vec<_> = Level::from(&data).collectibles.into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["-1", "2.5"]);
    }

    #[test]
    fn test_camel_case_fields() {
        let data = LevelData::from_json(
            r#"{"startX":10,"startY":20,"groundY":300,"requiredCarrots":2,
                "platforms":[{"x":0,"y":0,"width":10,"height":5,"moving":true,"moveSpeed":2,"moveY":true}]}"#,
        )
        .unwrap();
        let level = Level::from(&data);
        assert_eq!(level.start, Vec2::new(10.0, 20.0));
        assert_eq!(level.ground_y, 300.0);
        assert_eq!(level.required_carrots, 2);
        assert!(level.moving_platforms[0].move_x);
        assert!(level.moving_platforms[0].move_y);
        assert_eq!(level.moving_platforms[0].speed, 2.0);
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 15);
        assert_eq!(catalog.get(1).unwrap().name, "First Hop");
        assert_eq!(catalog.next_after(1), Some(2));
        assert_eq!(catalog.next_after(15), None);
        assert_eq!(catalog.get(3).unwrap().carrots.len(), 3);
    }

    #[test]
    fn test_next_after_skips_gaps() {
        let catalog = LevelCatalog::from_json(r#"{"1":{},"5":{},"9":{}}"#).unwrap();
        assert_eq!(catalog.next_after(1), Some(5));
        assert_eq!(catalog.next_after(6), Some(9));
        assert_eq!(catalog.next_after(9), None);
    }

    #[test]
    fn test_unknown_level_is_an_error() {
        let catalog = LevelCatalog::builtin().unwrap();
        assert!(matches!(catalog.get(99), Err(LevelError::NotFound(99))));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(LevelCatalog::from_json("{\"1\": 5}"), Err(LevelError::Parse(_))));
    }
}
