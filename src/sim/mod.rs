//! Fixed-step match simulation
//!
//! All gameplay logic lives here. This module is pure and single-threaded:
//! - Fixed timestep only (velocities are per tick)
//! - Randomness only through a caller-supplied RNG (AI)
//! - No rendering, input capture or transport dependencies

pub mod ai;
pub mod collision;
pub mod fsm;
pub mod physics;
pub mod state;
pub mod tick;

pub use ai::{AiProfile, compute_input, predict_ball};
pub use collision::{CollisionResult, actor_ball_contact, detect_goal, resolve_collisions};
pub use fsm::{MatchAction, can_apply, transition};
pub use physics::{in_goal_band, step_actor, step_ball};
pub use state::{
    ActorState, BallState, GameMode, GoalState, InputState, MatchState, MatchStatus, Side, Winner,
};
pub use tick::{Ownership, TickEvents, TickInput, tick};
