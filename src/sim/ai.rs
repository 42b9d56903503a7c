//! Computer-controlled slime
//!
//! Stateless policy: each call forecasts the ball with the real integrator
//! (no slime contacts), picks a target x and returns an input. Randomness
//! comes from the caller's RNG so matches replay for a given seed.

use rand::Rng;

use super::physics::step_ball;
use super::state::{ActorState, BallState, GoalState, InputState};
use crate::consts::*;
use crate::settings::Difficulty;

/// Tuning for one difficulty tier
#[derive(Debug, Clone, Copy)]
pub struct AiProfile {
    /// Per-tick chance of doing nothing (reaction lag)
    pub idle_chance: f64,
    /// Forecast horizon in ticks
    pub horizon: usize,
    /// Second, longer horizon used for attacking (hard only)
    pub attack_horizon: usize,
}

impl AiProfile {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                idle_chance: 0.3,
                horizon: 20,
                attack_horizon: 20,
            },
            Difficulty::Medium => Self {
                idle_chance: 0.15,
                horizon: 30,
                attack_horizon: 30,
            },
            Difficulty::Hard => Self {
                idle_chance: 0.03,
                horizon: 30,
                attack_horizon: 60,
            },
        }
    }
}

/// Medium reacts this far past the center line
const MEDIUM_REACH: f32 = 120.0;
/// Hard chases a ball moving away within this radius
const ATTACK_RADIUS: f32 = 250.0;
/// Opponent this close to the ball makes hard press forward
const PRESS_RADIUS: f32 = 150.0;
/// Ball this close to the own post puts hard in scramble mode
const POST_DANGER: f32 = 80.0;

/// Forecast the ball `steps` ticks ahead without touching the real state
pub fn predict_ball(ball: &BallState, steps: usize) -> BallState {
    let mut b = *ball;
    for _ in 0..steps {
        b = step_ball(b, 1.0);
    }
    b
}

/// Compute this tick's input for `me`
pub fn compute_input<R: Rng + ?Sized>(
    me: &ActorState,
    ball: &BallState,
    opponent: &ActorState,
    difficulty: Difficulty,
    rng: &mut R,
) -> InputState {
    let profile = AiProfile::for_difficulty(difficulty);
    if rng.random_bool(profile.idle_chance) {
        return InputState::IDLE;
    }
    match difficulty {
        Difficulty::Easy => easy(me, ball, &profile, rng),
        Difficulty::Medium => medium(me, ball, &profile, rng),
        Difficulty::Hard => hard(me, ball, opponent, &profile),
    }
}

fn steer_toward(x: f32, target: f32, deadzone: f32) -> InputState {
    InputState {
        left: target < x - deadzone,
        right: target > x + deadzone,
        ..InputState::IDLE
    }
}

fn ball_above(me: &ActorState, ball: &BallState) -> bool {
    ball.pos.y < me.pos.y
}

fn easy<R: Rng + ?Sized>(
    me: &ActorState,
    ball: &BallState,
    profile: &AiProfile,
    rng: &mut R,
) -> InputState {
    let predicted = predict_ball(ball, profile.horizon).pos;
    if !me.side.owns_x(predicted.x) {
        return InputState::IDLE;
    }

    let target = predicted.x - me.side.attack_dir() * 10.0;
    let mut input = steer_toward(me.pos.x, target, 6.0);

    let overhead = (ball.pos.x - me.pos.x).abs() < SLIME_RADIUS;
    let close = ball_above(me, ball) && me.pos.y - ball.pos.y < 140.0;
    if overhead && close && !me.is_airborne && rng.random_bool(0.3) {
        input.jump = true;
    }
    input
}

fn medium<R: Rng + ?Sized>(
    me: &ActorState,
    ball: &BallState,
    profile: &AiProfile,
    rng: &mut R,
) -> InputState {
    let dir = me.side.attack_dir();
    let predicted = predict_ball(ball, profile.horizon).pos;
    // Signed distance past the center line into the opponent's half
    let past_center = (predicted.x - FIELD_WIDTH / 2.0) * dir;
    let in_reach = past_center < MEDIUM_REACH;

    let target = if in_reach {
        predicted.x - dir * 12.0
    } else {
        me.side.spawn_x()
    };
    let mut input = steer_toward(me.pos.x, target, 5.0);

    let dist = me.pos.distance(ball.pos);
    if in_reach
        && dist < 130.0
        && ball_above(me, ball)
        && !me.is_airborne
        && rng.random_bool(0.5)
    {
        input.jump = true;
    }
    if dist < SLIME_RADIUS + BALL_RADIUS + 25.0 && rng.random_bool(0.5) {
        input.grab = true;
    }
    input
}

fn hard(
    me: &ActorState,
    ball: &BallState,
    opponent: &ActorState,
    profile: &AiProfile,
) -> InputState {
    let side = me.side;
    let dir = side.attack_dir();
    let defend_at = predict_ball(ball, profile.horizon).pos;
    let attack_at = predict_ball(ball, profile.attack_horizon).pos;

    let dist = me.pos.distance(ball.pos);
    let approaching = ball.vel.x * dir < 0.0;
    let should_attack = !approaching && dist < ATTACK_RADIUS;
    let should_defend = approaching || side.owns_x(ball.pos.x);

    let own_post = GoalState::for_side(side).post_x();
    let near_post = (ball.pos.x - own_post).abs() < POST_DANGER;

    let target = if should_attack {
        attack_at.x - dir * 15.0
    } else if should_defend {
        let (min_x, max_x) = side.half_bounds();
        (defend_at.x - dir * 18.0).clamp(min_x, max_x)
    } else if opponent.pos.distance(ball.pos) < PRESS_RADIUS {
        FIELD_WIDTH / 2.0 - dir * SLIME_RADIUS * 2.0
    } else {
        side.spawn_x() - dir * SLIME_RADIUS
    };
    let mut input = steer_toward(me.pos.x, target, 4.0);

    if !me.is_airborne && ball_above(me, ball) {
        let under = (ball.pos.x - me.pos.x).abs() < SLIME_RADIUS * 1.5;
        let scramble = should_defend && near_post && dist < 160.0;
        if (under && dist < 140.0) || scramble {
            input.jump = true;
        }
    }

    // Heading toward the opponent and within reach: always grab
    if ball.vel.x * dir > 0.0 && dist < 90.0 {
        input.grab = true;
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Side;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ball_at(x: f32, y: f32, vx: f32, vy: f32) -> BallState {
        BallState {
            pos: Vec2::new(x, y),
            vel: Vec2::new(vx, vy),
            ..BallState::kickoff()
        }
    }

    fn actor_at(side: Side, x: f32) -> ActorState {
        let mut actor = ActorState::new(side);
        actor.pos.x = x;
        actor
    }

    #[test]
    fn test_predict_matches_integrator_and_is_pure() {
        let ball = ball_at(300.0, 100.0, 4.0, -3.0);
        let copy = ball;
        let predicted = predict_ball(&ball, 30);
        assert_eq!(ball, copy);

        let mut stepped = ball;
        for _ in 0..30 {
            stepped = step_ball(stepped, 1.0);
        }
        assert_eq!(predicted, stepped);
        assert_eq!(predict_ball(&ball, 0), ball);
    }

    #[test]
    fn test_easy_ignores_far_half() {
        let mut rng = Pcg32::seed_from_u64(7);
        let me = actor_at(Side::Left, 200.0);
        let opponent = ActorState::new(Side::Right);
        let ball = ball_at(650.0, GROUND_Y - BALL_RADIUS, 0.0, 0.0);
        for _ in 0..100 {
            let input = compute_input(&me, &ball, &opponent, Difficulty::Easy, &mut rng);
            assert_eq!(input, InputState::IDLE);
        }
    }

    #[test]
    fn test_easy_chases_on_own_half() {
        let mut rng = Pcg32::seed_from_u64(11);
        let me = actor_at(Side::Right, 700.0);
        let opponent = ActorState::new(Side::Left);
        let ball = ball_at(500.0, GROUND_Y - BALL_RADIUS, 0.0, 0.0);
        let mut moved = 0;
        for _ in 0..100 {
            let input = compute_input(&me, &ball, &opponent, Difficulty::Easy, &mut rng);
            assert!(!input.right);
            if input.left {
                moved += 1;
            }
        }
        assert!(moved > 50);
    }

    #[test]
    fn test_medium_retreats_home_when_ball_far() {
        let mut rng = Pcg32::seed_from_u64(3);
        let me = actor_at(Side::Left, 320.0);
        let opponent = ActorState::new(Side::Right);
        let ball = ball_at(700.0, GROUND_Y - BALL_RADIUS, 0.0, 0.0);
        let mut retreated = 0;
        for _ in 0..100 {
            let input = compute_input(&me, &ball, &opponent, Difficulty::Medium, &mut rng);
            assert!(!input.right);
            assert!(!input.jump);
            if input.left {
                retreated += 1;
            }
        }
        assert!(retreated > 60);
    }

    #[test]
    fn test_hard_always_grabs_toward_opponent() {
        let mut rng = Pcg32::seed_from_u64(42);
        let me = actor_at(Side::Left, 200.0);
        let opponent = ActorState::new(Side::Right);
        let ball = ball_at(230.0, 300.0, 5.0, 0.0);
        let mut grabs = 0;
        for _ in 0..100 {
            let input = compute_input(&me, &ball, &opponent, Difficulty::Hard, &mut rng);
            if input != InputState::IDLE {
                assert!(input.grab);
                grabs += 1;
            }
        }
        assert!(grabs > 80);
    }

    #[test]
    fn test_hard_defends_inside_own_half() {
        let mut rng = Pcg32::seed_from_u64(5);
        let me = actor_at(Side::Left, 350.0);
        let opponent = ActorState::new(Side::Right);
        let ball = ball_at(150.0, 120.0, -6.0, 0.0);
        for _ in 0..50 {
            let input = compute_input(&me, &ball, &opponent, Difficulty::Hard, &mut rng);
            assert!(!input.right);
        }
    }

    #[test]
    fn test_hard_presses_when_opponent_on_ball() {
        let me = actor_at(Side::Left, 200.0);
        let ball = ball_at(600.0, GROUND_Y - BALL_RADIUS, 0.0, 0.0);
        let profile = AiProfile::for_difficulty(Difficulty::Hard);

        let pressing = actor_at(Side::Right, 620.0);
        let input = hard(&me, &ball, &pressing, &profile);
        assert!(input.right);

        let distant = actor_at(Side::Right, 760.0);
        let input = hard(&me, &ball, &distant, &profile);
        assert!(input.left);
    }

    #[test]
    fn test_profiles_lengthen_with_difficulty() {
        let easy = AiProfile::for_difficulty(Difficulty::Easy);
        let medium = AiProfile::for_difficulty(Difficulty::Medium);
        let hard = AiProfile::for_difficulty(Difficulty::Hard);
        assert!(easy.idle_chance > medium.idle_chance);
        assert!(medium.idle_chance > hard.idle_chance);
        assert!(easy.horizon < medium.horizon);
        assert_eq!(hard.attack_horizon, 60);
    }
}
