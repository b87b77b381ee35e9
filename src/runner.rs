//! Paced script execution on simulated time
//!
//! Commands between waits run as one batch, then frames elapse at 60 per
//! second until the next wait or the end of the script. After the last
//! statement the run keeps ticking until the bunny settles, the level
//! completes or the time limit hits.

use serde::Serialize;

use crate::clock::{Clock, ManualClock};
use crate::engine::{Engine, Stats};
use crate::script::{Script, Statement};

#[derive(Debug, Clone, PartialEq)]
pub struct RunLimits {
    pub frame_ms: f64,
    /// Frames that elapse after each batch of commands
    pub batch_pause_ms: f64,
    /// A single wait never holds the run longer than this
    pub max_wait_secs: f32,
    /// Simulated time allowed after the last statement before the run is abandoned
    pub max_run_ms: f64,
    pub settle_frames: u32,
    /// Extra frames after settling so a late landing can still finish the level
    pub settle_grace_ms: f64,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            frame_ms: 1000.0 / 60.0,
            batch_pause_ms: 50.0,
            max_wait_secs: 10.0,
            max_run_ms: 30_000.0,
            settle_frames: 30,
            settle_grace_ms: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RunOutcome {
    Complete,
    /// Reached the goal without every collectible
    NeedsItems { required: usize },
    Settled,
    TimedOut,
    NoLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunReport {
    #[serde(flatten)]
    pub outcome: RunOutcome,
    pub stats: Stats,
    pub frames: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptRunner {
    limits: RunLimits,
}

impl ScriptRunner {
    pub fn new(limits: RunLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &RunLimits {
        &self.limits
    }

    /// Reset, start and drive `engine` through `script`
    pub fn run(&self, engine: &mut Engine<ManualClock>, script: &Script) -> RunReport {
        engine.reset();
        engine.start();
        if !engine.is_running() {
            return RunReport {
                outcome: RunOutcome::NoLevel,
                stats: engine.stats(),
                frames: 0,
            };
        }

        let mut frames = 0;
        let mut pending = false;

        for statement in script.statements() {
            match *statement {
                Statement::Wait(seconds) => {
                    if pending {
                        frames += self.advance(engine, self.limits.batch_pause_ms);
                        pending = false;
                    }
                    engine.wait(seconds);
                    let capped = seconds.min(self.limits.max_wait_secs);
                    frames += self.advance(engine, f64::from(capped) * 1000.0);
                }
                Statement::MoveRight(steps) => {
                    engine.move_right(steps);
                    pending = true;
                }
                Statement::MoveLeft(steps) => {
                    engine.move_left(steps);
                    pending = true;
                }
                Statement::Jump => {
                    engine.jump();
                    pending = true;
                }
                Statement::Collect => {
                    engine.collect();
                    pending = true;
                }
            }
        }
        if pending {
            frames += self.advance(engine, self.limits.batch_pause_ms);
        }

        // Waits do not count against the run limit
        let deadline = engine.clock().now_ms() + self.limits.max_run_ms;
        let mut still = 0;
        let mut timed_out = true;
        while engine.clock().now_ms() < deadline {
            if engine.level_complete() {
                timed_out = false;
                break;
            }
            self.frame(engine);
            frames += 1;

            if is_stationary(engine) {
                still += 1;
                if still >= self.limits.settle_frames {
                    frames += self.advance(engine, self.limits.settle_grace_ms);
                    timed_out = false;
                    break;
                }
            } else {
                still = 0;
            }
        }

        let outcome = if engine.level_complete() {
            RunOutcome::Complete
        } else if timed_out {
            engine.stop();
            log::warn!("Script run timed out after {frames} frames");
            RunOutcome::TimedOut
        } else {
            settled_outcome(engine)
        };

        RunReport {
            outcome,
            stats: engine.stats(),
            frames,
        }
    }

    fn frame(&self, engine: &mut Engine<ManualClock>) {
        engine.clock().advance(self.limits.frame_ms);
        engine.tick();
    }

    /// Let `ms` of frames elapse. Stops early once the engine stops wanting frames.
    fn advance(&self, engine: &mut Engine<ManualClock>, ms: f64) -> u64 {
        let count = (ms / self.limits.frame_ms).round() as u64;
        let mut done = 0;
        while done < count && engine.wants_frame() {
            self.frame(engine);
            done += 1;
        }
        done
    }
}

fn is_stationary<C: Clock>(engine: &Engine<C>) -> bool {
    let vel = engine.velocity();
    vel.x.abs() < 0.1 && vel.y.abs() < 0.1 && !engine.state().bunny.jumping
}

fn settled_outcome<C: Clock>(engine: &Engine<C>) -> RunOutcome {
    let state = engine.state();
    let required = state.collectibles.len();
    let at_goal = state.goal.overlaps(&state.bunny.bounds());
    if at_goal && (engine.carrot_count() as usize) < required {
        RunOutcome::NeedsItems { required }
    } else {
        RunOutcome::Settled
    }
}
