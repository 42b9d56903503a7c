//! Host/client state replication
//!
//! Each peer owns its own slime; the host also owns the ball, scores, clock
//! and status. Owned state goes out every `SYNC_INTERVAL_MS`. Received state
//! is parked with its arrival time and, every tick, dead-reckoned forward and
//! eased into the displayed match by an exponential filter. Parked snapshots
//! stay until a newer one replaces them or a start/reset clears them.
//!
//! Nothing a peer reports about its own slime is checked for plausibility.

use glam::Vec2;

use super::protocol::{ActionMessage, BallSyncPayload, ChatPayload, NetAction, ProtocolError};
use crate::consts::*;
use crate::ms_to_ticks;
use crate::sim::{ActorState, BallState, MatchState, MatchStatus, Ownership, Side};

/// Remote slime waiting to be displayed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteActor {
    pub actor: ActorState,
    pub received_at_ms: f64,
}

/// Host world state waiting to be displayed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteWorld {
    pub world: BallSyncPayload,
    pub received_at_ms: f64,
}

/// Control messages the scheduler maps onto match actions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifecycleEvent {
    Start { duration_ms: f64 },
    Reset,
    Settings { duration_ms: f64 },
}

/// Display-only chat line
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub from: String,
    pub from_name: String,
    pub content: String,
    pub expires_at_ms: f64,
}

/// Linear extrapolation from the receipt time to `now_ms`
pub fn dead_reckon(pos: Vec2, vel: Vec2, received_at_ms: f64, now_ms: f64) -> Vec2 {
    pos + vel * ms_to_ticks((now_ms - received_at_ms).max(0.0))
}

/// Move `current` a fixed fraction of the way toward `target`
pub fn ease(current: Vec2, target: Vec2, factor: f32) -> Vec2 {
    current + (target - current) * factor
}

fn clamp_to_half(side: Side, pos: Vec2) -> Vec2 {
    let (min_x, max_x) = side.half_bounds();
    Vec2::new(pos.x.clamp(min_x, max_x), pos.y.min(GROUND_Y))
}

fn smooth_actor(displayed: &ActorState, remote: &RemoteActor, now_ms: f64) -> ActorState {
    let actor = &remote.actor;
    let target = clamp_to_half(
        actor.side,
        dead_reckon(actor.pos, actor.vel, remote.received_at_ms, now_ms),
    );
    ActorState {
        pos: ease(displayed.pos, target, SMOOTHING),
        vel: ease(displayed.vel, actor.vel, SMOOTHING),
        ..*actor
    }
}

fn smooth_ball(displayed: &BallState, remote: &RemoteWorld, now_ms: f64) -> BallState {
    let ball = &remote.world.ball_state;
    let mut target = dead_reckon(ball.pos, ball.vel, remote.received_at_ms, now_ms);
    target.y = target.y.clamp(BALL_RADIUS, GROUND_Y - BALL_RADIUS);
    BallState {
        pos: ease(displayed.pos, target, SMOOTHING),
        vel: ease(displayed.vel, ball.vel, SMOOTHING),
        ..*ball
    }
}

/// Per-peer replication state
#[derive(Debug, Clone)]
pub struct Replicator {
    is_host: bool,
    remote_actor: Option<RemoteActor>,
    remote_world: Option<RemoteWorld>,
    last_sync_ms: Option<f64>,
    chat: Vec<ChatMessage>,
}

impl Replicator {
    pub fn new(is_host: bool) -> Self {
        Self {
            is_host,
            remote_actor: None,
            remote_world: None,
            last_sync_ms: None,
            chat: Vec::new(),
        }
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// Host plays left, client plays right
    pub fn local_side(&self) -> Side {
        if self.is_host { Side::Left } else { Side::Right }
    }

    pub fn remote_side(&self) -> Side {
        self.local_side().opponent()
    }

    pub fn ownership(&self) -> Ownership {
        Ownership::online(self.is_host)
    }

    pub fn remote_actor(&self) -> Option<&RemoteActor> {
        self.remote_actor.as_ref()
    }

    pub fn remote_world(&self) -> Option<&RemoteWorld> {
        self.remote_world.as_ref()
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    /// Forget everything received and send on the next frame
    pub fn clear_snapshots(&mut self) {
        self.remote_actor = None;
        self.remote_world = None;
        self.last_sync_ms = None;
    }

    /// Park one inbound message. Control messages come back as events.
    pub fn receive(&mut self, msg: &ActionMessage, now_ms: f64) -> Option<LifecycleEvent> {
        let action = match NetAction::decode(msg) {
            Ok(action) => action,
            Err(ProtocolError::UnknownAction(name)) => {
                log::debug!("Ignoring unknown action `{name}`");
                return None;
            }
            Err(e) => {
                log::debug!("Dropping message: {e}");
                return None;
            }
        };

        match action {
            NetAction::SlimeSync(actor) => {
                if actor.side != self.remote_side() {
                    log::debug!("Ignoring slime_sync for locally owned {:?}", actor.side);
                    return None;
                }
                self.remote_actor = Some(RemoteActor {
                    actor,
                    received_at_ms: now_ms,
                });
                None
            }
            NetAction::BallSync(world) => {
                if self.is_host {
                    log::debug!("Host ignores ball_sync");
                    return None;
                }
                self.remote_world = Some(RemoteWorld {
                    world,
                    received_at_ms: now_ms,
                });
                None
            }
            NetAction::Start { duration_ms } => {
                if self.is_host {
                    log::warn!("Ignoring start from client");
                    return None;
                }
                self.clear_snapshots();
                Some(LifecycleEvent::Start { duration_ms })
            }
            NetAction::Settings { duration_ms } => {
                if self.is_host {
                    log::warn!("Ignoring settings from client");
                    return None;
                }
                Some(LifecycleEvent::Settings { duration_ms })
            }
            NetAction::Reset => {
                self.clear_snapshots();
                Some(LifecycleEvent::Reset)
            }
            NetAction::Chat(chat) => {
                self.push_chat(chat, now_ms);
                None
            }
        }
    }

    /// Copy host-owned scalars (scores, clock, status, winner) into `state`.
    /// Applied every frame so a paused or ended client still follows the host.
    pub fn apply_authoritative(&self, state: &mut MatchState) {
        if self.is_host || state.status == MatchStatus::Menu {
            return;
        }
        if let Some(remote) = &self.remote_world {
            let world = &remote.world;
            state.left_score = world.left_score;
            state.right_score = world.right_score;
            state.time_remaining_ms = world.time_remaining.max(0.0);
            state.status = world.status;
            state.winner = world.winner;
        }
    }

    /// Ease displayed remote-owned positions toward their dead-reckoned targets
    pub fn smooth_remote(&self, state: &mut MatchState, now_ms: f64) {
        if let Some(remote) = &self.remote_actor {
            let side = self.remote_side();
            let next = smooth_actor(state.actor(side), remote, now_ms);
            *state.actor_mut(side) = next;
        }
        if self.is_host {
            return;
        }
        if let Some(remote) = &self.remote_world {
            state.ball = smooth_ball(&state.ball, remote, now_ms);
        }
    }

    /// Sync messages due at `now_ms`; empty inside the sync interval
    pub fn outbound(&mut self, state: &MatchState, now_ms: f64) -> Vec<ActionMessage> {
        if let Some(last) = self.last_sync_ms {
            if now_ms - last < SYNC_INTERVAL_MS {
                return Vec::new();
            }
        }
        self.last_sync_ms = Some(now_ms);

        let mut actions = vec![NetAction::SlimeSync(*state.actor(self.local_side()))];
        if self.is_host {
            actions.push(NetAction::BallSync(BallSyncPayload::from_match(state)));
        }
        actions
            .iter()
            .filter_map(|action| match action.encode() {
                Ok(msg) => Some(msg),
                Err(e) => {
                    log::warn!("Failed to encode {}: {e}", action.name());
                    None
                }
            })
            .collect()
    }

    pub fn push_chat(&mut self, chat: ChatPayload, now_ms: f64) {
        self.chat.push(ChatMessage {
            from: chat.from,
            from_name: chat.from_name,
            content: chat.content,
            expires_at_ms: now_ms + CHAT_TTL_MS,
        });
    }

    /// Drop expired chat lines
    pub fn prune_chat(&mut self, now_ms: f64) {
        self.chat.retain(|line| line.expires_at_ms > now_ms);
    }
}
