//! Match lifecycle state machine
//!
//! `Menu -> Playing <-> Paused -> Ended -> Menu`, plus `Reset` from anywhere.
//! Each action has its own pure transition returning a new state. Actions
//! that do not apply to the current status hand the state back unchanged,
//! so `transition` is total.

use super::state::{GameMode, MatchState, MatchStatus, Winner};
use crate::consts::*;
use crate::minutes_to_ms;

/// Actions that drive status changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchAction {
    /// Fresh match: scores, positions and clock reset, play begins
    Start { mode: GameMode, duration_ms: f64 },
    Pause,
    Resume,
    /// Clock hit zero; winner comes from the scores
    TimeUp,
    /// Discard the match and return to the menu
    Reset,
    /// Configure the next match's length
    SetDuration { duration_ms: f64 },
}

/// Whether `action` changes anything from `status`
pub fn can_apply(status: MatchStatus, action: &MatchAction) -> bool {
    match (status, action) {
        (MatchStatus::Menu | MatchStatus::Ended, MatchAction::Start { .. }) => true,
        (MatchStatus::Playing, MatchAction::Pause) => true,
        (MatchStatus::Paused, MatchAction::Resume) => true,
        (MatchStatus::Playing, MatchAction::TimeUp) => true,
        (_, MatchAction::Reset) => true,
        (MatchStatus::Menu | MatchStatus::Ended, MatchAction::SetDuration { .. }) => true,
        _ => false,
    }
}

/// Apply `action` to `state`
pub fn transition(state: &MatchState, action: &MatchAction) -> MatchState {
    if !can_apply(state.status, action) {
        return state.clone();
    }
    match *action {
        MatchAction::Start { mode, duration_ms } => start(mode, duration_ms),
        MatchAction::Pause => with_status(state, MatchStatus::Paused),
        MatchAction::Resume => with_status(state, MatchStatus::Playing),
        MatchAction::TimeUp => time_up(state),
        MatchAction::Reset => reset(state),
        MatchAction::SetDuration { duration_ms } => set_duration(state, duration_ms),
    }
}

fn clamp_duration(duration_ms: f64) -> f64 {
    duration_ms.clamp(
        minutes_to_ms(MIN_DURATION_MINUTES),
        minutes_to_ms(MAX_DURATION_MINUTES),
    )
}

fn start(mode: GameMode, duration_ms: f64) -> MatchState {
    let mut next = MatchState::new(mode, clamp_duration(duration_ms));
    next.status = MatchStatus::Playing;
    next
}

fn with_status(state: &MatchState, status: MatchStatus) -> MatchState {
    MatchState {
        status,
        ..state.clone()
    }
}

fn time_up(state: &MatchState) -> MatchState {
    MatchState {
        status: MatchStatus::Ended,
        time_remaining_ms: 0.0,
        winner: Winner::from_scores(state.left_score, state.right_score),
        ..state.clone()
    }
}

fn reset(state: &MatchState) -> MatchState {
    MatchState::new(state.mode, state.duration_ms)
}

fn set_duration(state: &MatchState, duration_ms: f64) -> MatchState {
    let duration_ms = clamp_duration(duration_ms);
    let mut next = state.clone();
    next.duration_ms = duration_ms;
    if next.status == MatchStatus::Menu {
        next.time_remaining_ms = duration_ms;
    }
    next
}
