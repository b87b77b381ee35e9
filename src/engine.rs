//! The engine instance a script harness and a renderer share
//!
//! Wraps the pure simulation with the lifecycle (load, start, stop, reset),
//! the command surface scripts call, and read-only accessors. The engine
//! never schedules anything itself: a driver calls `tick()` once per frame.

use glam::Vec2;
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::sim::{
    Contacts, GameState, Level, LevelCatalog, LevelData, LevelError, MoveRecord, Phase,
    check_collisions, collect_nearby, tick,
};

/// Numbers shown in the stats panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub carrot_count: u32,
    pub move_count: u32,
    pub current_time: u64,
    pub level_complete: bool,
}

pub struct Engine<C: Clock = SystemClock> {
    config: EngineConfig,
    state: GameState,
    clock: C,
}

impl Engine<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(EngineConfig::default(), SystemClock)
    }
}

impl Default for Engine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Engine<C> {
    pub fn with_clock(config: EngineConfig, clock: C) -> Self {
        let state = GameState::new(&config);
        Self {
            config,
            state,
            clock,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read-only snapshot of every entity and counter
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    // === Lifecycle ===

    /// Replace the current level. Stops the run and clears all progress.
    pub fn load_level(&mut self, data: &LevelData) {
        self.state.load(Level::from(data));
        log::info!(
            "Loaded level '{}': {} platforms ({} moving), {} items, {} obstacles",
            data.name,
            self.state.platforms.len() + self.state.moving_platforms.len(),
            self.state.moving_platforms.len(),
            self.state.collectibles.len(),
            self.state.obstacles.len()
        );
    }

    /// Load a numbered level. Unknown numbers are reported, never substituted.
    pub fn load_from_catalog(&mut self, catalog: &LevelCatalog, number: u32) -> Result<(), LevelError> {
        let data = catalog.get(number).inspect_err(|e| log::warn!("{e}"))?;
        self.load_level(data);
        Ok(())
    }

    /// Begin (or resume) running. No-op unless Loaded or Stopped.
    pub fn start(&mut self) {
        match self.state.phase {
            Phase::Loaded | Phase::Stopped => {
                self.state.phase = Phase::Running;
                self.state.start_time_ms = Some(self.clock.now_ms());
                log::info!("Run started");
            }
            Phase::Idle => log::warn!("start() ignored, no level loaded"),
            Phase::Running | Phase::Complete => {}
        }
    }

    /// Pause. Safe in any phase; a completed level stays complete.
    pub fn stop(&mut self) {
        if self.state.phase == Phase::Running {
            self.state.phase = Phase::Stopped;
            log::info!("Run stopped after {} ticks", self.state.ticks);
        }
    }

    /// Stop and put everything back the way the last load left it
    pub fn reset(&mut self) {
        if self.state.phase == Phase::Idle {
            return;
        }
        self.stop();
        self.state.restart();
        log::info!("Level reset");
    }

    /// One physics step. No-op unless running.
    pub fn update(&mut self) {
        let Some(contacts) = tick(&mut self.state, &self.config) else {
            return;
        };
        self.log_contacts(&contacts);
        self.refresh_time();
    }

    /// Advance one frame. Returns whether the driver should schedule another.
    pub fn tick(&mut self) -> bool {
        self.update();
        self.wants_frame()
    }

    /// Run a collision pass on the current position without integrating
    pub fn check_collisions(&mut self) -> Contacts {
        let contacts = check_collisions(&mut self.state, &self.config);
        self.log_contacts(&contacts);
        contacts
    }

    fn log_contacts(&self, contacts: &Contacts) {
        if contacts.completed {
            log::info!(
                "Level complete: {} moves, {} items, {}s",
                self.state.move_count,
                self.state.carrot_count,
                self.state.current_time
            );
        }
    }

    fn refresh_time(&mut self) {
        if let Some(start) = self.state.start_time_ms {
            let elapsed = (self.clock.now_ms() - start).max(0.0);
            self.state.current_time = (elapsed / 1000.0).floor() as u64;
        }
    }

    // === Commands (silently ignored unless running) ===

    pub fn move_right(&mut self, steps: f32) {
        if !self.is_running() {
            return;
        }
        self.state.move_count += 1;
        self.state.bunny.vel.x += self.config.move_accel * steps;
        self.state.move_history.push(MoveRecord::MoveRight { steps });
    }

    pub fn move_left(&mut self, steps: f32) {
        if !self.is_running() {
            return;
        }
        self.state.move_count += 1;
        self.state.bunny.vel.x -= self.config.move_accel * steps;
        self.state.move_history.push(MoveRecord::MoveLeft { steps });
    }

    /// Jump if standing on something and not already mid-jump
    pub fn jump(&mut self) {
        if !self.is_running() || !self.state.bunny.can_jump() {
            return;
        }
        self.state.move_count += 1;
        let bunny = &mut self.state.bunny;
        bunny.vel.y = self.config.jump_velocity;
        bunny.jumping = true;
        bunny.on_ground = false;
        self.state.move_history.push(MoveRecord::Jump);
    }

    /// Pick up anything within the collect radius. Returns how many items were taken.
    pub fn collect(&mut self) -> usize {
        if !self.is_running() {
            return 0;
        }
        let radius = self.config.collect_radius;
        collect_nearby(&mut self.state, |_| radius).len()
    }

    /// Record a wait. The caller does the actual waiting.
    pub fn wait(&mut self, seconds: f32) {
        if !self.is_running() {
            return;
        }
        self.state.move_history.push(MoveRecord::Wait { seconds });
    }

    // === Accessors ===

    /// Top-left corner of the bunny
    pub fn position(&self) -> Vec2 {
        self.state.bunny.pos
    }

    pub fn velocity(&self) -> Vec2 {
        self.state.bunny.vel
    }

    pub fn carrot_count(&self) -> u32 {
        self.state.carrot_count
    }

    pub fn move_count(&self) -> u32 {
        self.state.move_count
    }

    pub fn current_time(&self) -> u64 {
        self.state.current_time
    }

    pub fn is_on_ground(&self) -> bool {
        self.state.bunny.on_ground
    }

    pub fn can_jump(&self) -> bool {
        self.state.bunny.can_jump()
    }

    pub fn is_running(&self) -> bool {
        self.state.phase == Phase::Running
    }

    pub fn level_complete(&self) -> bool {
        self.state.phase == Phase::Complete
    }

    /// Running and not yet complete
    pub fn wants_frame(&self) -> bool {
        self.is_running()
    }

    pub fn move_history(&self) -> &[MoveRecord] {
        &self.state.move_history
    }

    pub fn stats(&self) -> Stats {
        Stats {
            carrot_count: self.state.carrot_count,
            move_count: self.state.move_count,
            current_time: self.state.current_time,
            level_complete: self.level_complete(),
        }
    }
}
