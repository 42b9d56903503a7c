//! Slime/ball contact and goal detection
//!
//! Slimes are half-circles: the ball only collides with the dome, never with
//! the flat underside. Response is positional correction plus a reflected
//! impulse, so a slime standing still still bats the ball away.

use glam::Vec2;

use super::physics::in_goal_band;
use super::state::{ActorState, BallState, MatchState, Side};
use crate::consts::*;

/// Result of a slime/ball overlap test
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit normal from slime center toward ball center
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check the ball against a slime's dome
pub fn actor_ball_contact(actor: &ActorState, ball: &BallState) -> CollisionResult {
    let delta = ball.pos - actor.pos;
    let dist = delta.length();
    let reach = SLIME_RADIUS + BALL_RADIUS;

    // Below the center line there is no slime
    if dist >= reach || ball.pos.y > actor.pos.y {
        return CollisionResult::miss();
    }

    // Coincident centers have no usable normal
    let normal = delta.normalize_or_zero();
    if normal == Vec2::ZERO {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        normal,
        penetration: reach - dist,
    }
}

/// Push the ball out of a slime and bounce it if they are closing
pub fn resolve_actor_ball(actor: &ActorState, ball: BallState) -> BallState {
    let contact = actor_ball_contact(actor, &ball);
    if !contact.hit {
        return ball;
    }

    let mut b = ball;
    b.pos += contact.normal * contact.penetration;

    let relative = b.vel - actor.vel;
    let closing = relative.dot(contact.normal);
    if closing < 0.0 {
        let before = b.vel;
        let reflected = relative - contact.normal * (2.0 * closing);
        b.vel = reflected * BOUNCE_FORCE + actor.vel * SLIME_PUSH;

        if actor.is_grabbing {
            b.vel *= GRAB_BOOST;
        }
        b.angular_vel += (b.vel.x - before.x) * CONTACT_SPIN;
    }

    b
}

/// Side credited with a goal, if the ball has left through a goal mouth
pub fn detect_goal(ball: &BallState) -> Option<Side> {
    if !in_goal_band(ball.pos.y) {
        return None;
    }
    if ball.pos.x < 0.0 {
        Some(Side::Right)
    } else if ball.pos.x > FIELD_WIDTH {
        Some(Side::Left)
    } else {
        None
    }
}

/// Credit `scorer` and restart from kickoff immediately
pub fn apply_goal(state: &mut MatchState, scorer: Side) {
    match scorer {
        Side::Left => state.left_score += 1,
        Side::Right => state.right_score += 1,
    }
    state.reset_positions();
}

/// Resolve both slimes against the ball, then check for a goal.
///
/// Returns the scoring side when a goal was applied.
pub fn resolve_collisions(state: &mut MatchState) -> Option<Side> {
    for side in Side::BOTH {
        let actor = *state.actor(side);
        state.ball = resolve_actor_ball(&actor, state.ball);
    }

    let scorer = detect_goal(&state.ball)?;
    apply_goal(state, scorer);
    Some(scorer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kickoff_position;
    use proptest::prelude::*;

    fn ball_at(pos: Vec2, vel: Vec2) -> BallState {
        BallState {
            pos,
            vel,
            ..BallState::kickoff()
        }
    }

    fn grab_return(v: f32) -> BallState {
        let mut actor = ActorState::new(Side::Left);
        actor.is_grabbing = true;
        let ball = ball_at(
            actor.pos + Vec2::new(SLIME_RADIUS + BALL_RADIUS - 2.0, 0.0),
            Vec2::new(-v, 0.0),
        );
        resolve_actor_ball(&actor, ball)
    }

    #[test]
    fn test_fast_ball_keeps_full_grab_boost() {
        for v in [12.0, 15.0, 18.0, 25.0] {
            let result = grab_return(v);
            assert!(
                result.vel.x >= v * BOUNCE_FORCE * GRAB_BOOST - 1e-3,
                "v={v} returned {}",
                result.vel.x
            );
        }
    }

    proptest! {
        #[test]
        fn prop_grab_return_at_least_boosted(v in 0.01f32..=18.0) {
            let result = grab_return(v);
            prop_assert!(result.vel.x >= v * BOUNCE_FORCE * GRAB_BOOST - 1e-4 * v.max(1.0));
            prop_assert!(result.vel.y.abs() < 1e-4);
        }
    }

    #[test]
    fn test_grab_boosts_and_redirects() {
        let mut actor = ActorState::new(Side::Left);
        actor.is_grabbing = true;
        let v = 5.0;
        // Touching the dome's side at center height
        let ball = ball_at(
            actor.pos + Vec2::new(SLIME_RADIUS + BALL_RADIUS - 2.0, 0.0),
            Vec2::new(-v, 0.0),
        );

        let result = resolve_actor_ball(&actor, ball);
        assert!(result.vel.x > 0.0, "ball must head away from the slime");
        assert!(result.vel.x > v * BOUNCE_FORCE);
        assert!(result.vel.x >= v * BOUNCE_FORCE * GRAB_BOOST - 1e-4);
        // Pushed out to the contact distance
        let dist = (result.pos - actor.pos).length();
        assert!((dist - (SLIME_RADIUS + BALL_RADIUS)).abs() < 1e-3);
    }

    #[test]
    fn test_no_grab_no_boost() {
        let actor = ActorState::new(Side::Left);
        let ball = ball_at(
            actor.pos + Vec2::new(SLIME_RADIUS + BALL_RADIUS - 2.0, 0.0),
            Vec2::new(-5.0, 0.0),
        );
        let result = resolve_actor_ball(&actor, ball);
        assert!((result.vel.x - 5.0 * BOUNCE_FORCE).abs() < 1e-4);
    }

    #[test]
    fn test_header_sends_ball_up() {
        let actor = ActorState::new(Side::Right);
        let ball = ball_at(
            actor.pos - Vec2::new(0.0, SLIME_RADIUS + BALL_RADIUS - 3.0),
            Vec2::new(0.0, 6.0),
        );
        let result = resolve_actor_ball(&actor, ball);
        assert!(result.vel.y < 0.0);
        assert!(result.pos.y < ball.pos.y);
    }

    #[test]
    fn test_ball_below_center_ignored() {
        let actor = ActorState::new(Side::Left);
        let ball = ball_at(actor.pos + Vec2::new(10.0, 5.0), Vec2::new(-3.0, -3.0));
        assert!(!actor_ball_contact(&actor, &ball).hit);
        assert_eq!(resolve_actor_ball(&actor, ball), ball);
    }

    #[test]
    fn test_coincident_centers_no_nan() {
        let actor = ActorState::new(Side::Left);
        let ball = ball_at(actor.pos, Vec2::new(1.0, 1.0));
        let result = resolve_actor_ball(&actor, ball);
        assert!(result.pos.is_finite());
        assert!(result.vel.is_finite());
        assert_eq!(result, ball);
    }

    #[test]
    fn test_separating_ball_only_corrected() {
        let actor = ActorState::new(Side::Left);
        let ball = ball_at(
            actor.pos + Vec2::new(0.0, -(SLIME_RADIUS + BALL_RADIUS - 4.0)),
            Vec2::new(0.0, -3.0),
        );
        let result = resolve_actor_ball(&actor, ball);
        assert_eq!(result.vel, ball.vel);
        assert!(result.pos.y < ball.pos.y);
    }

    #[test]
    fn test_detect_goal_requires_band() {
        let band_y = GROUND_Y - GOAL_HEIGHT / 2.0;
        assert_eq!(
            detect_goal(&ball_at(Vec2::new(-1.0, band_y), Vec2::ZERO)),
            Some(Side::Right)
        );
        assert_eq!(
            detect_goal(&ball_at(Vec2::new(FIELD_WIDTH + 1.0, band_y), Vec2::ZERO)),
            Some(Side::Left)
        );
        assert_eq!(detect_goal(&ball_at(Vec2::new(-1.0, 50.0), Vec2::ZERO)), None);
        assert_eq!(detect_goal(&ball_at(Vec2::new(400.0, band_y), Vec2::ZERO)), None);
    }

    #[test]
    fn test_goal_resets_kickoff() {
        let mut state = MatchState::default();
        state.left.pos.x = 300.0;
        state.left.is_airborne = true;
        state.right.is_grabbing = true;
        state.ball = ball_at(
            Vec2::new(FIELD_WIDTH + 2.0, GROUND_Y - 30.0),
            Vec2::new(4.0, 1.0),
        );
        state.ball.angular_vel = 0.7;

        let scorer = resolve_collisions(&mut state);
        assert_eq!(scorer, Some(Side::Left));
        assert_eq!(state.left_score, 1);
        assert_eq!(state.right_score, 0);
        assert_eq!(state.ball.pos, kickoff_position());
        assert_eq!(state.ball.vel, Vec2::ZERO);
        assert_eq!(state.ball.angular_vel, 0.0);
        assert!(!state.ball.is_held);
        assert_eq!(state.left.pos.x, Side::Left.spawn_x());
        assert!(!state.left.is_airborne);
        assert!(!state.right.is_grabbing);
    }
}
