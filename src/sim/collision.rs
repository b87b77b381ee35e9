//! Collision resolution for one physics step
//!
//! Order matters and is fixed: ground, static platforms, moving platforms,
//! collectibles, obstacles, goal, then the canvas clamp. Each stage sees the
//! bunny as left by the previous one.

use super::geom::{Rect, distance};
use super::state::{Bunny, CollectibleKind, GameState, Phase};
use crate::config::EngineConfig;

/// What happened during a collision pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contacts {
    /// Landed on a static or moving platform
    pub landed: bool,
    /// Ids picked up in this pass
    pub collected: Vec<String>,
    /// Touched an obstacle and was sent back to the start
    pub hit_obstacle: bool,
    /// Overlapping the goal, whether or not it counted
    pub at_goal: bool,
    /// This pass completed the level
    pub completed: bool,
}

/// Resolve every collision for the current bunny position
pub fn check_collisions(state: &mut GameState, config: &EngineConfig) -> Contacts {
    let mut contacts = Contacts::default();

    resolve_ground(&mut state.bunny, state.ground_y);

    contacts.landed = land_on_platforms(state, config.landing_band);
    if contacts.landed {
        state.bunny.on_ground = true;
    }

    contacts.collected = collect_nearby(state, |kind| kind.pickup_radius(config));
    contacts.hit_obstacle = resolve_obstacles(state);

    contacts.at_goal = state.goal.overlaps(&state.bunny.bounds());
    if contacts.at_goal
        && state.phase != Phase::Complete
        && state.all_collected()
        && state.required_met()
    {
        state.phase = Phase::Complete;
        contacts.completed = true;
    }

    clamp_to_canvas(&mut state.bunny, config);
    contacts
}

/// Snap to the ground line unless a jump is still leaving it
fn resolve_ground(bunny: &mut Bunny, ground_y: f32) {
    if bunny.bottom() >= ground_y {
        if bunny.vel.y >= 0.0 || !bunny.jumping {
            bunny.pos.y = ground_y - bunny.size.y;
            bunny.vel.y = 0.0;
            bunny.on_ground = true;
            bunny.jumping = false;
        } else {
            // Jump impulse applied this frame, let it leave the ground
            bunny.on_ground = false;
        }
    } else {
        bunny.on_ground = false;
    }
}

/// Feet inside the landing band of a platform top while not rising
fn lands_on(bunny: &Bunny, platform: &Rect, band: f32) -> bool {
    let feet = bunny.bottom();
    bunny.bounds().overlaps_x(platform)
        && feet > platform.y
        && feet < platform.y + band
        && bunny.vel.y >= 0.0
}

fn settle_on(bunny: &mut Bunny, platform: &Rect) {
    bunny.pos.y = platform.y - bunny.size.y;
    bunny.vel.y = 0.0;
    bunny.jumping = false;
}

/// Land on static then moving platforms. Moving platforms carry the bunny along.
fn land_on_platforms(state: &mut GameState, band: f32) -> bool {
    let bunny = &mut state.bunny;
    let mut landed = false;

    for platform in &state.platforms {
        if lands_on(bunny, platform, band) {
            settle_on(bunny, platform);
            landed = true;
        }
    }

    for platform in &state.moving_platforms {
        if lands_on(bunny, &platform.rect, band) {
            settle_on(bunny, &platform.rect);
            bunny.pos.x += platform.carry_x();
            landed = true;
        }
    }

    if landed {
        log::debug!("Landed on platform at y={}", bunny.pos.y + bunny.size.y);
    }
    landed
}

/// Pick up every uncollected item whose position is within `radius` of the bunny center.
/// Returns the ids newly collected, in definition order.
pub fn collect_nearby(state: &mut GameState, radius: impl Fn(CollectibleKind) -> f32) -> Vec<String> {
    let center = state.bunny.center();
    let mut hits: Vec<String> = state
        .collectibles
        .iter()
        .filter(|c| !state.is_collected(&c.id) && distance(center, c.pos) < radius(c.kind))
        .map(|c| c.id.clone())
        .collect();

    // Two items sharing an id only count once
    hits.retain(|id| state.mark_collected(id));
    for id in &hits {
        log::debug!("Collected {id} ({} total)", state.carrot_count);
    }
    hits
}

/// Any obstacle touch sends the bunny back to the start, progress is kept
fn resolve_obstacles(state: &mut GameState) -> bool {
    let bunny = &mut state.bunny;
    let mut hit = false;
    for obstacle in &state.obstacles {
        if obstacle.overlaps(&bunny.bounds()) {
            bunny.pos = state.start;
            bunny.vel = glam::Vec2::ZERO;
            hit = true;
        }
    }
    if hit {
        log::debug!("Hit obstacle, back to start ({}, {})", state.start.x, state.start.y);
    }
    hit
}

/// Keep the bunny inside the canvas horizontally and below the top edge.
/// No bottom clamp.
fn clamp_to_canvas(bunny: &mut Bunny, config: &EngineConfig) {
    if bunny.pos.x < 0.0 {
        bunny.pos.x = 0.0;
    }
    if bunny.pos.x > config.max_bunny_x() {
        bunny.pos.x = config.max_bunny_x();
    }
    if bunny.pos.y < 0.0 {
        bunny.pos.y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{Level, LevelData, PlatformData};
    use glam::Vec2;

    fn load(data: LevelData) -> GameState {
        let mut state = GameState::new(&EngineConfig::default());
        state.load(Level::from(&data));
        state
    }

    fn check(state: &mut GameState) -> Contacts {
        check_collisions(state, &EngineConfig::default())
    }

    #[test]
    fn test_ground_snap() {
        let mut state = load(LevelData::new().start(50.0, 300.0).ground(450.0));
        state.bunny.pos.y = 405.0;
        state.bunny.vel.y = 6.0;

        check(&mut state);
        assert_eq!(state.bunny.pos.y, 400.0);
        assert_eq!(state.bunny.vel.y, 0.0);
        assert!(state.bunny.on_ground);
    }

    #[test]
    fn test_jump_leaving_ground_is_not_resnapped() {
        let mut state = load(LevelData::new().start(50.0, 400.0).ground(450.0));
        state.bunny.vel.y = -15.0;
        state.bunny.jumping = true;
        state.bunny.on_ground = false;

        check(&mut state);
        assert_eq!(state.bunny.pos.y, 400.0);
        assert_eq!(state.bunny.vel.y, -15.0);
        assert!(state.bunny.jumping);
        assert!(!state.bunny.on_ground);
    }

    #[test]
    fn test_rising_without_jump_flag_snaps() {
        let mut state = load(LevelData::new().start(50.0, 405.0).ground(450.0));
        state.bunny.vel.y = -3.0;

        check(&mut state);
        assert_eq!(state.bunny.pos.y, 400.0);
        assert_eq!(state.bunny.vel.y, 0.0);
    }

    #[test]
    fn test_lands_on_static_platform() {
        let mut state = load(
            LevelData::new()
                .start(150.0, 255.0)
                .ground(450.0)
                .platform(PlatformData::fixed(100.0, 300.0, 200.0, 20.0)),
        );
        state.bunny.vel.y = 3.0;
        state.bunny.jumping = true;

        let contacts = check(&mut state);
        assert!(contacts.landed);
        assert_eq!(state.bunny.pos.y, 250.0);
        assert_eq!(state.bunny.vel.y, 0.0);
        assert!(state.bunny.on_ground);
        assert!(!state.bunny.jumping);
    }

    #[test]
    fn test_no_landing_while_rising_or_outside_band() {
        let level = LevelData::new()
            .start(150.0, 255.0)
            .ground(450.0)
            .platform(PlatformData::fixed(100.0, 300.0, 200.0, 20.0));

        let mut state = load(level.clone());
        state.bunny.vel.y = -3.0;
        assert!(!check(&mut state).landed);
        assert_eq!(state.bunny.pos.y, 255.0);

        // Feet 25 below the top, past the landing band
        let mut state = load(level.clone());
        state.bunny.pos.y = 275.0;
        state.bunny.vel.y = 3.0;
        assert!(!check(&mut state).landed);
        assert!(!state.bunny.on_ground);

        // Not over the platform horizontally
        let mut state = load(level);
        state.bunny.pos.x = 310.0;
        state.bunny.vel.y = 3.0;
        assert!(!check(&mut state).landed);
    }

    #[test]
    fn test_moving_platform_carries_rider() {
        let mut state = load(
            LevelData::new()
                .start(150.0, 255.0)
                .ground(450.0)
                .platform(PlatformData::moving(100.0, 300.0, 200.0, 20.0).speed(2.0)),
        );
        state.bunny.vel.y = 1.0;

        assert!(check(&mut state).landed);
        assert_eq!(state.bunny.pos, Vec2::new(152.0, 250.0));

        // Vertical-only platforms do not carry sideways
        let mut state = load(
            LevelData::new()
                .start(150.0, 255.0)
                .ground(450.0)
                .platform(PlatformData::moving(100.0, 300.0, 200.0, 20.0).axes(false, true)),
        );
        state.bunny.vel.y = 1.0;
        assert!(check(&mut state).landed);
        assert_eq!(state.bunny.pos.x, 150.0);
    }

    #[test]
    fn test_pickup_radius_per_kind() {
        // Bunny center is (70, 425); both items are 22 away
        let mut state = load(
            LevelData::new()
                .start(50.0, 400.0)
                .ground(450.0)
                .carrot(92.0, 425.0)
                .star(70.0, 447.0),
        );

        let contacts = check(&mut state);
        assert_eq!(contacts.collected, vec!["carrot_0".to_string()]);
        assert_eq!(state.carrot_count, 1);

        let picked = collect_nearby(&mut state, |_| 30.0);
        assert_eq!(picked, vec!["star_0".to_string()]);
        assert_eq!(state.carrot_count, 2);
    }

    #[test]
    fn test_collected_items_are_never_counted_twice() {
        let mut state = load(LevelData::new().start(50.0, 400.0).ground(450.0).coin(70.0, 425.0));
        check(&mut state);
        check(&mut state);
        assert_eq!(collect_nearby(&mut state, |_| 30.0), Vec::<String>::new());
        assert_eq!(state.carrot_count, 1);
    }

    #[test]
    fn test_obstacle_resets_position_only() {
        let mut state = load(
            LevelData::new()
                .start(50.0, 400.0)
                .ground(450.0)
                .carrot(300.0, 100.0)
                .obstacle(Rect::new(500.0, 440.0, 50.0, 10.0)),
        );
        state.mark_collected("carrot_0");
        state.move_count = 3;
        state.bunny.pos = Vec2::new(490.0, 400.0);
        state.bunny.vel = Vec2::new(5.0, 2.0);

        let contacts = check(&mut state);
        assert!(contacts.hit_obstacle);
        assert_eq!(state.bunny.pos, Vec2::new(50.0, 400.0));
        assert_eq!(state.bunny.vel, Vec2::ZERO);
        assert_eq!(state.carrot_count, 1);
        assert_eq!(state.move_count, 3);
        assert!(state.is_collected("carrot_0"));
    }

    #[test]
    fn test_goal_needs_every_carrot() {
        let mut state = load(
            LevelData::new()
                .start(600.0, 400.0)
                .ground(450.0)
                .carrot(100.0, 300.0)
                .carrot(200.0, 300.0)
                .carrot(300.0, 300.0)
                .goal(Rect::new(600.0, 400.0, 50.0, 50.0)),
        );
        state.mark_collected("carrot_0");
        state.mark_collected("carrot_2");

        let contacts = check(&mut state);
        assert!(contacts.at_goal);
        assert!(!contacts.completed);
        assert_ne!(state.phase, Phase::Complete);

        state.mark_collected("carrot_1");
        assert!(check(&mut state).completed);
        assert_eq!(state.phase, Phase::Complete);
    }

    #[test]
    fn test_goal_needs_every_kind() {
        let mut state = load(
            LevelData::new()
                .start(600.0, 400.0)
                .ground(450.0)
                .carrot(100.0, 300.0)
                .star(200.0, 300.0)
                .coin(300.0, 300.0)
                .goal(Rect::new(600.0, 400.0, 50.0, 50.0)),
        );
        state.mark_collected("carrot_0");
        state.mark_collected("star_0");
        assert!(!check(&mut state).completed);

        state.mark_collected("coin_0");
        assert!(check(&mut state).completed);
    }

    #[test]
    fn test_goal_required_count() {
        let mut state = load(
            LevelData::new()
                .start(600.0, 400.0)
                .ground(450.0)
                .required(2)
                .goal(Rect::new(600.0, 400.0, 50.0, 50.0)),
        );
        assert!(!check(&mut state).completed);

        state.carrot_count = 2;
        assert!(check(&mut state).completed);
    }

    #[test]
    fn test_empty_level_completes_on_contact() {
        let mut state = load(LevelData::new().start(600.0, 400.0).ground(450.0).goal(Rect::new(620.0, 380.0, 50.0, 50.0)));
        assert!(check(&mut state).completed);
    }

    #[test]
    fn test_canvas_clamp() {
        let mut state = load(LevelData::new().start(50.0, 100.0).ground(450.0));
        state.bunny.pos = Vec2::new(-20.0, -30.0);
        check(&mut state);
        assert_eq!(state.bunny.pos, Vec2::new(0.0, 0.0));

        state.bunny.pos = Vec2::new(900.0, 100.0);
        check(&mut state);
        assert_eq!(state.bunny.pos.x, 760.0);
    }

    #[test]
    fn test_canvas_clamp_follows_config_width() {
        let config = EngineConfig {
            canvas_width: 1024.0,
            ..EngineConfig::default()
        };
        let mut state = load(LevelData::new().start(50.0, 100.0).ground(450.0));
        state.bunny.pos = Vec2::new(1100.0, 100.0);
        check_collisions(&mut state, &config);
        assert_eq!(state.bunny.pos.x, 984.0);
    }

    #[test]
    fn test_no_bottom_clamp() {
        // Ground far below the canvas, the bunny can fall past the bottom edge
        let mut state = load(LevelData::new().start(50.0, 100.0).ground(5000.0));
        state.bunny.pos.y = 900.0;
        check(&mut state);
        assert_eq!(state.bunny.pos.y, 900.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn bunny_stays_inside_canvas(
                x in -1000.0f32..2000.0,
                y in -500.0f32..1000.0,
                vx in -50.0f32..50.0,
                vy in -50.0f32..50.0,
            ) {
                let mut state = load(LevelData::new().ground(450.0));
                state.bunny.pos = Vec2::new(x, y);
                state.bunny.vel = Vec2::new(vx, vy);

                check(&mut state);

                prop_assert!(state.bunny.pos.x >= 0.0);
                prop_assert!(state.bunny.pos.x <= 760.0);
                prop_assert!(state.bunny.pos.y >= 0.0);
            }
        }
    }
}
