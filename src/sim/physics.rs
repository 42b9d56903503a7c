//! Fixed-step integrator for slimes and the ball
//!
//! Pure functions: state in, advanced state out. `dt` is measured in ticks,
//! the scheduler always passes 1.0. Actor/ball contact lives in `collision`.

use crate::consts::*;
use crate::goal_top;

use super::state::{ActorState, BallState, GoalState, InputState, Side};

/// Whether a ball at height `y` is inside the goal-mouth band
#[inline]
pub fn in_goal_band(y: f32) -> bool {
    y > goal_top()
}

/// Advance one slime by `dt` ticks under `input`
pub fn step_actor(actor: ActorState, input: &InputState, dt: f32) -> ActorState {
    let mut a = actor;

    // Horizontal speed is set, not accelerated
    a.vel.x = input.horizontal() * SLIME_SPEED;
    if input.jump && !a.is_airborne {
        a.vel.y = JUMP_POWER;
        a.is_airborne = true;
    }

    a.is_grabbing = input.grab;
    let target_angle = if input.grab { GRAB_ANGLE_MAX } else { 0.0 };
    let max_delta = GRAB_ANGLE_RATE * dt;
    a.grab_angle += (target_angle - a.grab_angle).clamp(-max_delta, max_delta);

    a.vel.y += GRAVITY * dt;
    a.pos += a.vel * dt;

    if a.pos.y >= GROUND_Y {
        a.pos.y = GROUND_Y;
        a.vel.y = 0.0;
        a.is_airborne = false;
    }

    let (min_x, max_x) = a.side.half_bounds();
    if a.pos.x < min_x {
        a.pos.x = min_x;
        a.vel.x = -a.vel.x * WALL_BOUNCE;
    } else if a.pos.x > max_x {
        a.pos.x = max_x;
        a.vel.x = -a.vel.x * WALL_BOUNCE;
    }

    if a.pos.y < SLIME_RADIUS {
        a.pos.y = SLIME_RADIUS;
        a.vel.y = -a.vel.y * WALL_BOUNCE;
    }

    a
}

/// Advance the ball by `dt` ticks. Held balls are returned untouched.
pub fn step_ball(ball: BallState, dt: f32) -> BallState {
    if ball.is_held {
        return ball;
    }
    let mut b = ball;
    let r = BALL_RADIUS;

    b.vel.y += GRAVITY * dt;
    b.vel.x *= BALL_FRICTION.powf(dt);
    b.angular_vel *= SPIN_FRICTION.powf(dt);
    b.pos += b.vel * dt;
    b.rotation += b.angular_vel * dt;

    // Ground
    if b.pos.y + r > GROUND_Y {
        b.pos.y = GROUND_Y - r;
        b.vel.y = -b.vel.y * BALL_BOUNCE;
        // Settle instead of micro-bouncing forever
        if b.vel.y.abs() < GRAVITY {
            b.vel.y = 0.0;
        }
        b.angular_vel = b.vel.x * ROLL_SPIN;
    }

    // Side walls, open inside the goal mouth
    if b.pos.x - r < 0.0 && !in_goal_band(b.pos.y) {
        b.pos.x = r;
        b.vel.x = -b.vel.x * BALL_BOUNCE;
        b.angular_vel += b.vel.y * WALL_SPIN;
    } else if b.pos.x + r > FIELD_WIDTH && !in_goal_band(b.pos.y) {
        b.pos.x = FIELD_WIDTH - r;
        b.vel.x = -b.vel.x * BALL_BOUNCE;
        b.angular_vel -= b.vel.y * WALL_SPIN;
    }

    for side in Side::BOTH {
        bounce_off_post(&mut b, &GoalState::for_side(side));
    }

    // Ceiling
    if b.pos.y - r < 0.0 {
        b.pos.y = r;
        b.vel.y = -b.vel.y * BALL_BOUNCE;
    }

    b
}

/// Reflect off the crossbar end, only when approaching from the field
fn bounce_off_post(b: &mut BallState, goal: &GoalState) {
    let r = BALL_RADIUS;
    let post_x = goal.post_x();
    if (b.pos.x - post_x).abs() > r || (b.pos.y - goal.y).abs() > r {
        return;
    }
    match goal.side {
        Side::Left if b.vel.x < 0.0 && b.pos.x >= post_x => {
            b.pos.x = post_x + r;
            b.vel.x = -b.vel.x * BALL_BOUNCE;
        }
        Side::Right if b.vel.x > 0.0 && b.pos.x <= post_x => {
            b.pos.x = post_x - r;
            b.vel.x = -b.vel.x * BALL_BOUNCE;
        }
        _ => {}
    }
}
