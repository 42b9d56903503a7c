//! Fixed timestep simulation tick
//!
//! One 60 Hz advance of the match. `Ownership` decides which fields this peer
//! writes: offline it owns everything, online it owns its own slime and, on
//! the host, the ball, scores, clock and status.

use super::collision::resolve_collisions;
use super::fsm::{MatchAction, transition};
use super::physics::{step_actor, step_ball};
use super::state::{InputState, MatchState, Side, Winner};

/// Integrator step per tick (velocities are per-tick)
pub const STEP: f32 = 1.0;

/// Which parts of the match this peer computes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub left: bool,
    pub right: bool,
    /// Ball, scores, clock, status and winner
    pub world: bool,
}

impl Ownership {
    pub const OFFLINE: Ownership = Ownership {
        left: true,
        right: true,
        world: true,
    };

    /// Host plays left and owns the world; the client plays right
    pub fn online(is_host: bool) -> Self {
        Self {
            left: is_host,
            right: !is_host,
            world: is_host,
        }
    }

    pub fn owns_actor(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Inputs for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: InputState,
    pub right: InputState,
}

impl TickInput {
    pub fn for_side(&self, side: Side) -> &InputState {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn set(&mut self, side: Side, input: InputState) {
        match side {
            Side::Left => self.left = input,
            Side::Right => self.right = input,
        }
    }
}

/// What happened during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Side credited with a goal this tick
    pub goal: Option<Side>,
    /// Set on the tick the clock ran out
    pub ended: Option<Winner>,
}

/// Advance the match by one fixed step.
///
/// `elapsed_ms` is the wall-clock time since the previous tick; the clock
/// runs on real time even when physics falls behind.
pub fn tick(
    state: &mut MatchState,
    input: &TickInput,
    ownership: Ownership,
    elapsed_ms: f64,
) -> TickEvents {
    let mut events = TickEvents::default();
    if !state.is_playing() {
        return events;
    }

    for side in Side::BOTH {
        if ownership.owns_actor(side) {
            let next = step_actor(*state.actor(side), input.for_side(side), STEP);
            *state.actor_mut(side) = next;
        }
    }

    if !ownership.world {
        return events;
    }

    state.ball = step_ball(state.ball, STEP);
    events.goal = resolve_collisions(state);
    if let Some(scorer) = events.goal {
        log::info!(
            "Goal for {:?}: {} - {}",
            scorer,
            state.left_score,
            state.right_score
        );
    }

    state.time_remaining_ms = (state.time_remaining_ms - elapsed_ms.max(0.0)).max(0.0);
    if state.time_remaining_ms <= 0.0 {
        *state = transition(state, &MatchAction::TimeUp);
        events.ended = Some(state.winner);
        log::info!(
            "Match over ({:?}): {} - {}",
            state.winner,
            state.left_score,
            state.right_score
        );
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::kickoff_position;
    use crate::sim::state::{GameMode, MatchStatus};
    use glam::Vec2;
    use proptest::prelude::*;

    fn playing() -> MatchState {
        transition(
            &MatchState::default(),
            &MatchAction::Start {
                mode: GameMode::Local,
                duration_ms: 60_000.0,
            },
        )
    }

    #[test]
    fn test_tick_outside_playing_is_noop() {
        let mut state = MatchState::default();
        let before = state.clone();
        let input = TickInput {
            left: InputState {
                right: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &input, Ownership::OFFLINE, TICK_MS), TickEvents::default());
        assert_eq!(state, before);

        let mut paused = transition(&playing(), &MatchAction::Pause);
        let before = paused.clone();
        tick(&mut paused, &input, Ownership::OFFLINE, TICK_MS);
        assert_eq!(paused, before);
    }

    #[test]
    fn test_tick_moves_actors_and_ball() {
        let mut state = playing();
        let input = TickInput {
            left: InputState {
                right: true,
                ..Default::default()
            },
            right: InputState {
                left: true,
                ..Default::default()
            },
        };
        tick(&mut state, &input, Ownership::OFFLINE, TICK_MS);
        assert_eq!(state.left.pos.x, Side::Left.spawn_x() + SLIME_SPEED);
        assert_eq!(state.right.pos.x, Side::Right.spawn_x() - SLIME_SPEED);
        assert_eq!(state.ball.vel.y, GRAVITY);
        assert!((state.time_remaining_ms - (60_000.0 - TICK_MS)).abs() < 1e-9);
    }

    #[test]
    fn test_goal_scored_once_and_kickoff() {
        let mut state = playing();
        state.ball.pos = Vec2::new(3.0, GROUND_Y - 40.0);
        state.ball.vel = Vec2::new(-8.0, 0.0);
        let events = tick(&mut state, &TickInput::default(), Ownership::OFFLINE, TICK_MS);
        assert_eq!(events.goal, Some(Side::Right));
        assert_eq!(state.right_score, 1);
        assert_eq!(state.left_score, 0);
        assert_eq!(state.ball.pos, kickoff_position());
        assert_eq!(state.ball.vel, Vec2::ZERO);
    }

    #[test]
    fn test_clock_runs_out() {
        let mut state = playing();
        state.left_score = 2;
        state.time_remaining_ms = 10.0;
        let events = tick(&mut state, &TickInput::default(), Ownership::OFFLINE, TICK_MS);
        assert_eq!(events.ended, Some(Winner::Left));
        assert_eq!(state.status, MatchStatus::Ended);
        assert_eq!(state.time_remaining_ms, 0.0);
        assert_eq!(state.winner, Winner::Left);

        // Nothing moves once ended
        let before = state.clone();
        tick(&mut state, &TickInput::default(), Ownership::OFFLINE, TICK_MS);
        assert_eq!(state, before);
    }

    #[test]
    fn test_client_only_moves_own_actor() {
        let mut state = playing();
        let before = state.clone();
        let input = TickInput {
            left: InputState {
                right: true,
                ..Default::default()
            },
            right: InputState {
                left: true,
                ..Default::default()
            },
        };
        tick(&mut state, &input, Ownership::online(false), TICK_MS);
        assert_eq!(state.left, before.left);
        assert_eq!(state.ball, before.ball);
        assert_eq!(state.time_remaining_ms, before.time_remaining_ms);
        assert_ne!(state.right.pos, before.right.pos);
    }

    #[test]
    fn test_host_owns_left_and_world() {
        let mut state = playing();
        let before = state.clone();
        let input = TickInput {
            right: InputState {
                left: true,
                ..Default::default()
            },
            ..Default::default()
        };
        tick(&mut state, &input, Ownership::online(true), TICK_MS);
        assert_eq!(state.right, before.right);
        assert_ne!(state.ball, before.ball);
        assert!(state.time_remaining_ms < before.time_remaining_ms);
    }

    fn input_strategy() -> impl Strategy<Value = InputState> {
        any::<(bool, bool, bool, bool)>().prop_map(|(left, right, jump, grab)| InputState {
            left,
            right,
            jump,
            grab,
        })
    }

    proptest! {
        #[test]
        fn prop_scores_and_clock_monotonic(
            inputs in prop::collection::vec((input_strategy(), input_strategy()), 1..600),
            ball_vx in -12.0f32..12.0,
            elapsed in 1.0f64..40.0,
        ) {
            let mut state = playing();
            state.ball.vel.x = ball_vx;
            for (left, right) in inputs {
                let (l, r, t) = (state.left_score, state.right_score, state.time_remaining_ms);
                let events = tick(&mut state, &TickInput { left, right }, Ownership::OFFLINE, elapsed);

                prop_assert!(state.left_score >= l && state.right_score >= r);
                prop_assert!(state.left_score + state.right_score - l - r <= 1);
                if events.goal.is_some() {
                    prop_assert_eq!(state.left_score + state.right_score, l + r + 1);
                    prop_assert_eq!(state.ball.pos, kickoff_position());
                    prop_assert_eq!(state.ball.vel, Vec2::ZERO);
                }

                prop_assert!(state.time_remaining_ms >= 0.0);
                if state.status == MatchStatus::Playing {
                    prop_assert!(state.time_remaining_ms < t);
                } else {
                    prop_assert_eq!(state.time_remaining_ms, 0.0);
                    prop_assert_eq!(
                        state.winner,
                        Winner::from_scores(state.left_score, state.right_score)
                    );
                }

                for actor in [&state.left, &state.right] {
                    prop_assert!(actor.pos.y <= GROUND_Y);
                    let (min_x, max_x) = actor.side.half_bounds();
                    prop_assert!(actor.pos.x >= min_x && actor.pos.x <= max_x);
                }
            }
        }
    }
}
