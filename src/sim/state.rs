//! Match state and world model types
//!
//! Everything the renderer reads and the replication layer ships lives here.
//! These are plain values: behavior lives in `physics`, `collision` and `tick`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::{goal_top, kickoff_position, minutes_to_ms};

/// Which half of the field a slime defends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn opponent(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Sign of x pointing at the opponent's goal
    pub fn attack_dir(self) -> f32 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }

    /// Range the slime center may occupy horizontally
    pub fn half_bounds(self) -> (f32, f32) {
        match self {
            Side::Left => (SLIME_RADIUS, FIELD_WIDTH / 2.0 - SLIME_RADIUS),
            Side::Right => (FIELD_WIDTH / 2.0 + SLIME_RADIUS, FIELD_WIDTH - SLIME_RADIUS),
        }
    }

    /// Whether `x` lies on this side's half of the field
    pub fn owns_x(self, x: f32) -> bool {
        match self {
            Side::Left => x < FIELD_WIDTH / 2.0,
            Side::Right => x >= FIELD_WIDTH / 2.0,
        }
    }

    /// Kickoff x position
    pub fn spawn_x(self) -> f32 {
        match self {
            Side::Left => FIELD_WIDTH * 0.25,
            Side::Right => FIELD_WIDTH * 0.75,
        }
    }

    pub fn default_color(self) -> u32 {
        match self {
            Side::Left => 0x00_d4_ff,
            Side::Right => 0xff_4d_6d,
        }
    }
}

/// One slime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorState {
    pub side: Side,
    pub pos: Vec2,
    pub vel: Vec2,
    pub is_airborne: bool,
    pub is_grabbing: bool,
    /// Cosmetic eye/arm angle while grabbing
    pub grab_angle: f32,
    /// Reserved for anti-stalling; never read by the simulation
    pub camping_timer: f32,
    /// Display color (0xRRGGBB)
    pub color: u32,
}

impl ActorState {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            pos: Vec2::new(side.spawn_x(), GROUND_Y),
            vel: Vec2::ZERO,
            is_airborne: false,
            is_grabbing: false,
            grab_angle: 0.0,
            camping_timer: 0.0,
            color: side.default_color(),
        }
    }

    /// Back to the kickoff spot, keeping identity fields
    pub fn reset(&mut self) {
        self.pos = Vec2::new(self.side.spawn_x(), GROUND_Y);
        self.vel = Vec2::ZERO;
        self.is_airborne = false;
        self.is_grabbing = false;
        self.grab_angle = 0.0;
    }
}

/// The ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallState {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angular_vel: f32,
    pub rotation: f32,
    /// Held balls are not integrated
    pub is_held: bool,
    /// Reserved; collision resolution does not consult it
    pub holder: Option<Side>,
}

impl BallState {
    /// Ball at the kickoff point, at rest
    pub fn kickoff() -> Self {
        Self {
            pos: kickoff_position(),
            vel: Vec2::ZERO,
            angular_vel: 0.0,
            rotation: 0.0,
            is_held: false,
            holder: None,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

impl Default for BallState {
    fn default() -> Self {
        Self::kickoff()
    }
}

/// Immutable goal descriptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalState {
    pub side: Side,
    /// Left edge of the goal box
    pub x: f32,
    /// Top of the goal mouth (crossbar line)
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl GoalState {
    pub fn for_side(side: Side) -> Self {
        let x = match side {
            Side::Left => 0.0,
            Side::Right => FIELD_WIDTH - GOAL_WIDTH,
        };
        Self {
            side,
            x,
            y: goal_top(),
            width: GOAL_WIDTH,
            height: GOAL_HEIGHT,
        }
    }

    /// x of the post facing the field
    pub fn post_x(&self) -> f32 {
        match self.side {
            Side::Left => self.x + self.width,
            Side::Right => self.x,
        }
    }
}

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Menu,
    Playing,
    Paused,
    Ended,
}

/// Who controls the slimes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Human (left) vs AI (right)
    #[default]
    Single,
    /// Two humans on one device
    Local,
    /// One human per peer
    Online,
}

/// Match result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    #[default]
    None,
    Left,
    Right,
    Draw,
}

impl Winner {
    pub fn from_scores(left: u32, right: u32) -> Self {
        match left.cmp(&right) {
            std::cmp::Ordering::Greater => Winner::Left,
            std::cmp::Ordering::Less => Winner::Right,
            std::cmp::Ordering::Equal => Winner::Draw,
        }
    }
}

/// Per-player input for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub grab: bool,
}

impl InputState {
    pub const IDLE: InputState = InputState {
        left: false,
        right: false,
        jump: false,
        grab: false,
    };

    /// Net horizontal intent; left and right together cancel out
    pub fn horizontal(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Complete match state, owned by the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    pub status: MatchStatus,
    pub mode: GameMode,
    pub left: ActorState,
    pub right: ActorState,
    pub ball: BallState,
    pub goals: [GoalState; 2],
    pub left_score: u32,
    pub right_score: u32,
    /// Counts down while playing, never below zero
    pub time_remaining_ms: f64,
    pub duration_ms: f64,
    pub winner: Winner,
}

impl MatchState {
    pub fn new(mode: GameMode, duration_ms: f64) -> Self {
        Self {
            status: MatchStatus::Menu,
            mode,
            left: ActorState::new(Side::Left),
            right: ActorState::new(Side::Right),
            ball: BallState::kickoff(),
            goals: [GoalState::for_side(Side::Left), GoalState::for_side(Side::Right)],
            left_score: 0,
            right_score: 0,
            time_remaining_ms: duration_ms,
            duration_ms,
            winner: Winner::None,
        }
    }

    pub fn actor(&self, side: Side) -> &ActorState {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn actor_mut(&mut self, side: Side) -> &mut ActorState {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn goal(&self, side: Side) -> &GoalState {
        match side {
            Side::Left => &self.goals[0],
            Side::Right => &self.goals[1],
        }
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left_score,
            Side::Right => self.right_score,
        }
    }

    /// Kickoff placement for ball and both slimes
    pub fn reset_positions(&mut self) {
        self.ball = BallState::kickoff();
        self.left.reset();
        self.right.reset();
    }

    pub fn is_playing(&self) -> bool {
        self.status == MatchStatus::Playing
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(GameMode::default(), minutes_to_ms(DEFAULT_DURATION_MINUTES))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_match_starts_in_menu() {
        let state = MatchState::default();
        assert_eq!(state.status, MatchStatus::Menu);
        assert_eq!(state.winner, Winner::None);
        assert_eq!(state.left_score, 0);
        assert_eq!(state.right_score, 0);
        assert_eq!(state.time_remaining_ms, state.duration_ms);
        assert_eq!(state.ball.pos, kickoff_position());
    }

    #[test]
    fn test_spawn_positions_inside_half() {
        for side in Side::BOTH {
            let actor = ActorState::new(side);
            let (min, max) = side.half_bounds();
            assert!(actor.pos.x >= min && actor.pos.x <= max);
            assert_eq!(actor.pos.y, GROUND_Y);
            assert!(side.owns_x(actor.pos.x));
        }
    }

    #[test]
    fn test_input_conflict_cancels() {
        let input = InputState {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(input.horizontal(), 0.0);
        assert_eq!(InputState::IDLE.horizontal(), 0.0);
        let left = InputState {
            left: true,
            ..Default::default()
        };
        assert_eq!(left.horizontal(), -1.0);
    }

    #[test]
    fn test_winner_from_scores() {
        assert_eq!(Winner::from_scores(3, 1), Winner::Left);
        assert_eq!(Winner::from_scores(0, 2), Winner::Right);
        assert_eq!(Winner::from_scores(2, 2), Winner::Draw);
    }

    #[test]
    fn test_goal_posts_face_field() {
        let left = GoalState::for_side(Side::Left);
        let right = GoalState::for_side(Side::Right);
        assert_eq!(left.post_x(), GOAL_WIDTH);
        assert_eq!(right.post_x(), FIELD_WIDTH - GOAL_WIDTH);
        assert_eq!(left.y, GROUND_Y - GOAL_HEIGHT);
    }

    #[test]
    fn test_status_wire_names() {
        let json = serde_json::to_string(&MatchStatus::Playing).unwrap();
        assert_eq!(json, "\"playing\"");
        let winner: Winner = serde_json::from_str("\"draw\"").unwrap();
        assert_eq!(winner, Winner::Draw);
    }
}
