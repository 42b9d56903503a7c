//! Slime Duel - two-player slime soccer with AI opponents and online play
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (physics, collisions, AI, match state machine)
//! - `scheduler`: Frame-callback driven fixed-step loop
//! - `net`: Action protocol, channel abstraction and host/client replication
//! - `settings`: Match configuration

pub mod net;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use scheduler::FixedStepScheduler;
pub use settings::{Difficulty, Settings};

use glam::Vec2;

/// Game configuration constants
///
/// Velocities are in pixels per tick and accelerations in pixels per tick²,
/// so integrator `dt` values are measured in ticks (1.0 = one 60 Hz step).
/// Every peer in an online session must run with identical values.
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Ticks run per frame callback at most. Backlog beyond this is dropped.
    pub const MAX_TICKS_PER_FRAME: u32 = 1;

    /// Field dimensions (y grows downward)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 400.0;
    pub const GROUND_Y: f32 = 360.0;

    /// Goal mouth: depth from the field edge and height above the ground
    pub const GOAL_WIDTH: f32 = 60.0;
    pub const GOAL_HEIGHT: f32 = 120.0;

    /// Slime defaults
    pub const SLIME_RADIUS: f32 = 40.0;
    pub const SLIME_SPEED: f32 = 5.0;
    pub const JUMP_POWER: f32 = -12.0;
    /// Lossy side/ceiling bounce for slimes
    pub const WALL_BOUNCE: f32 = 0.5;

    pub const GRAVITY: f32 = 0.6;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    pub const BALL_BOUNCE: f32 = 0.8;
    /// Horizontal velocity decay per tick
    pub const BALL_FRICTION: f32 = 0.99;
    /// Angular velocity decay per tick
    pub const SPIN_FRICTION: f32 = 0.98;
    /// Spin picked up from horizontal speed on a ground bounce
    pub const ROLL_SPIN: f32 = 0.05;
    /// Spin picked up from vertical speed on a wall bounce
    pub const WALL_SPIN: f32 = 0.02;

    /// Slime/ball contact response
    pub const BOUNCE_FORCE: f32 = 1.2;
    /// Fraction of slime velocity handed to the ball on contact
    pub const SLIME_PUSH: f32 = 0.5;
    /// Multiplicative boost when the touching slime is grabbing
    pub const GRAB_BOOST: f32 = 1.4;
    pub const CONTACT_SPIN: f32 = 0.02;

    /// Cosmetic grab animation
    pub const GRAB_ANGLE_MAX: f32 = 0.6;
    pub const GRAB_ANGLE_RATE: f32 = 0.1;

    /// Replication
    pub const SYNC_INTERVAL_MS: f64 = 100.0;
    pub const SMOOTHING: f32 = 0.3;
    pub const CHAT_TTL_MS: f64 = 5000.0;

    /// Match duration bounds (minutes)
    pub const MIN_DURATION_MINUTES: u8 = 1;
    pub const MAX_DURATION_MINUTES: u8 = 8;
    pub const DEFAULT_DURATION_MINUTES: u8 = 2;
}

/// Top edge of both goal mouths
#[inline]
pub fn goal_top() -> f32 {
    consts::GROUND_Y - consts::GOAL_HEIGHT
}

/// Kickoff ball placement: field center, upper third
#[inline]
pub fn kickoff_position() -> Vec2 {
    Vec2::new(consts::FIELD_WIDTH / 2.0, consts::FIELD_HEIGHT / 3.0)
}

/// Convert a wall-clock span to simulation ticks
#[inline]
pub fn ms_to_ticks(ms: f64) -> f32 {
    (ms / consts::TICK_MS) as f32
}

/// Convert whole minutes to milliseconds
#[inline]
pub fn minutes_to_ms(minutes: u8) -> f64 {
    minutes as f64 * 60_000.0
}
