//! Frame-callback driven fixed-step loop
//!
//! The embedding calls `frame(now_ms)` once per render callback with a
//! monotonic timestamp. Elapsed time is banked and at most
//! `MAX_TICKS_PER_FRAME` ticks run per callback, so a slow host sees slow
//! motion instead of a burst of catch-up ticks. The match clock still runs
//! on wall time.
//!
//! The scheduler is the only writer of the canonical `MatchState`. Network
//! messages are drained at the top of each frame into the replicator's
//! holding area and merged from there.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::net::{
    ActionChannel, ChatMessage, ChatPayload, LifecycleEvent, NetAction, Replicator,
};
use crate::settings::{Difficulty, Settings};
use crate::sim::{
    GameMode, InputState, MatchAction, MatchState, MatchStatus, Ownership, Side, TickEvents,
    TickInput, can_apply, compute_input, tick, transition,
};

/// Who drives a slime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    Human,
    Ai(Difficulty),
}

/// What a frame callback did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub ticks: u32,
    pub events: TickEvents,
}

struct OnlineSession {
    channel: Box<dyn ActionChannel>,
    replicator: Replicator,
}

impl OnlineSession {
    fn send(&mut self, action: NetAction) {
        match action.encode() {
            Ok(msg) => self.channel.send(msg),
            Err(e) => log::warn!("Failed to encode {}: {e}", action.name()),
        }
    }
}

fn whole_minutes(duration_ms: f64) -> u8 {
    (duration_ms / 60_000.0)
        .round()
        .clamp(MIN_DURATION_MINUTES as f64, MAX_DURATION_MINUTES as f64) as u8
}

pub struct FixedStepScheduler {
    state: MatchState,
    settings: Settings,
    controllers: [Controller; 2],
    inputs: TickInput,
    rng: Pcg32,
    accumulator_ms: f64,
    /// Wall time since the last tick, fed to the match clock
    since_tick_ms: f64,
    last_frame_ms: Option<f64>,
    online: Option<OnlineSession>,
}

impl FixedStepScheduler {
    /// Offline scheduler. Single mode puts the AI on the right.
    pub fn new(mut settings: Settings) -> Self {
        if settings.mode == GameMode::Online {
            log::warn!("Online mode needs a channel; falling back to local play");
            settings.mode = GameMode::Local;
        }
        let controllers = match settings.mode {
            GameMode::Single => [Controller::Human, Controller::Ai(settings.difficulty)],
            _ => [Controller::Human, Controller::Human],
        };
        Self::build(settings, controllers, None)
    }

    /// Online scheduler over `channel`. The host plays left.
    pub fn online(mut settings: Settings, channel: Box<dyn ActionChannel>) -> Self {
        settings.mode = GameMode::Online;
        let replicator = Replicator::new(channel.is_host());
        log::info!(
            "Online session as {} ({:?} side)",
            if replicator.is_host() { "host" } else { "client" },
            replicator.local_side()
        );
        let session = OnlineSession {
            channel,
            replicator,
        };
        Self::build(settings, [Controller::Human; 2], Some(session))
    }

    fn build(
        settings: Settings,
        controllers: [Controller; 2],
        online: Option<OnlineSession>,
    ) -> Self {
        Self {
            state: MatchState::new(settings.mode, settings.duration_ms()),
            rng: Pcg32::seed_from_u64(settings.seed),
            settings,
            controllers,
            inputs: TickInput::default(),
            accumulator_ms: 0.0,
            since_tick_ms: 0.0,
            last_frame_ms: None,
            online,
        }
    }

    /// Copy of the match for rendering
    pub fn snapshot(&self) -> MatchState {
        self.state.clone()
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn controller(&self, side: Side) -> Controller {
        self.controllers[side as usize]
    }

    pub fn set_controller(&mut self, side: Side, controller: Controller) {
        self.controllers[side as usize] = controller;
    }

    /// Latest input level for a human-driven side
    pub fn set_input(&mut self, side: Side, input: InputState) {
        self.inputs.set(side, input);
    }

    /// The side this peer plays online; `None` offline
    pub fn local_side(&self) -> Option<Side> {
        self.online.as_ref().map(|s| s.replicator.local_side())
    }

    pub fn chat(&self) -> &[ChatMessage] {
        self.online
            .as_ref()
            .map_or(&[][..], |s| s.replicator.chat())
    }

    fn is_client(&self) -> bool {
        self.online
            .as_ref()
            .is_some_and(|s| !s.replicator.is_host())
    }

    /// Stop scheduling ticks and forget frame timing
    pub fn stop(&mut self) {
        self.last_frame_ms = None;
        self.accumulator_ms = 0.0;
        self.since_tick_ms = 0.0;
    }

    fn dispatch(&mut self, action: MatchAction) -> bool {
        if !can_apply(self.state.status, &action) {
            log::debug!("{action:?} ignored while {:?}", self.state.status);
            return false;
        }
        let next = transition(&self.state, &action);
        if next.status != self.state.status {
            log::info!("Match {:?} -> {:?}", self.state.status, next.status);
        }
        self.state = next;
        if !self.state.is_playing() || matches!(action, MatchAction::Start { .. }) {
            self.stop();
        }
        true
    }

    /// Begin a match with the configured duration. Online, only the host may.
    pub fn start_match(&mut self) {
        let duration_ms = self.settings.duration_ms();
        let action = MatchAction::Start {
            mode: self.state.mode,
            duration_ms,
        };
        if !can_apply(self.state.status, &action) {
            log::warn!("Cannot start a match while {:?}", self.state.status);
            return;
        }
        if let Some(session) = self.online.as_mut() {
            if !session.replicator.is_host() {
                log::warn!("Only the host can start an online match");
                return;
            }
            if !session.channel.peer_connected() {
                log::warn!("Cannot start: waiting for a peer");
                return;
            }
            session.replicator.clear_snapshots();
            session.send(NetAction::Start { duration_ms });
        }
        self.dispatch(action);
    }

    pub fn pause(&mut self) {
        if self.is_client() {
            log::warn!("Only the host can pause an online match");
            return;
        }
        self.dispatch(MatchAction::Pause);
    }

    pub fn resume(&mut self) {
        if self.is_client() {
            log::warn!("Only the host can resume an online match");
            return;
        }
        self.dispatch(MatchAction::Resume);
    }

    /// Back to the menu. Online, the peer is told too.
    pub fn reset(&mut self) {
        if let Some(session) = self.online.as_mut() {
            session.replicator.clear_snapshots();
            session.send(NetAction::Reset);
        }
        self.dispatch(MatchAction::Reset);
    }

    /// Configure the next match length (clamped to 1-8 minutes)
    pub fn set_duration_minutes(&mut self, minutes: u8) {
        if self.is_client() {
            log::warn!("Only the host can change match settings");
            return;
        }
        self.settings.set_duration_minutes(minutes);
        let duration_ms = self.settings.duration_ms();
        if let Some(session) = self.online.as_mut() {
            session.send(NetAction::Settings { duration_ms });
        }
        self.dispatch(MatchAction::SetDuration { duration_ms });
    }

    pub fn send_chat(&mut self, from: &str, from_name: &str, content: &str, now_ms: f64) {
        let Some(session) = self.online.as_mut() else {
            log::warn!("Chat needs an online session");
            return;
        };
        let chat = ChatPayload {
            from: from.to_string(),
            from_name: from_name.to_string(),
            content: content.to_string(),
        };
        session.send(NetAction::Chat(chat.clone()));
        session.replicator.push_chat(chat, now_ms);
    }

    /// Render-frame callback
    pub fn frame(&mut self, now_ms: f64) -> FrameReport {
        let mut report = FrameReport::default();
        self.poll_network(now_ms);

        if self.state.is_playing() {
            let elapsed = self
                .last_frame_ms
                .map_or(0.0, |last| (now_ms - last).max(0.0));
            self.last_frame_ms = Some(now_ms);
            self.accumulator_ms += elapsed;
            self.since_tick_ms += elapsed;

            while self.accumulator_ms >= TICK_MS
                && report.ticks < MAX_TICKS_PER_FRAME
                && self.state.is_playing()
            {
                self.accumulator_ms -= TICK_MS;
                let events = self.run_tick(now_ms);
                report.events.goal = events.goal.or(report.events.goal);
                report.events.ended = events.ended.or(report.events.ended);
                report.ticks += 1;
            }
            // Backlog is dropped; only the sub-tick remainder carries over
            self.accumulator_ms %= TICK_MS;
        }
        if !self.state.is_playing() {
            self.stop();
        }

        self.send_outbound(now_ms);
        report
    }

    fn run_tick(&mut self, now_ms: f64) -> TickEvents {
        let elapsed_ms = std::mem::take(&mut self.since_tick_ms);
        let ownership = match &self.online {
            Some(session) => {
                session.replicator.smooth_remote(&mut self.state, now_ms);
                session.replicator.ownership()
            }
            None => Ownership::OFFLINE,
        };
        let input = self.resolve_inputs(ownership);
        tick(&mut self.state, &input, ownership, elapsed_ms)
    }

    fn resolve_inputs(&mut self, ownership: Ownership) -> TickInput {
        let mut input = TickInput::default();
        for side in Side::BOTH {
            if !ownership.owns_actor(side) {
                continue;
            }
            let chosen = match self.controller(side) {
                Controller::Human => *self.inputs.for_side(side),
                Controller::Ai(difficulty) => compute_input(
                    self.state.actor(side),
                    &self.state.ball,
                    self.state.actor(side.opponent()),
                    difficulty,
                    &mut self.rng,
                ),
            };
            input.set(side, chosen);
        }
        input
    }

    fn poll_network(&mut self, now_ms: f64) {
        let Some(session) = self.online.as_mut() else {
            return;
        };
        if !session.channel.peer_connected() {
            session.replicator.clear_snapshots();
            if self.state.status != MatchStatus::Menu {
                log::warn!("Peer left the room; returning to menu");
                self.state = transition(&self.state, &MatchAction::Reset);
                self.stop();
            }
            return;
        }

        let mut events = Vec::new();
        while let Some(msg) = session.channel.try_recv() {
            if let Some(event) = session.replicator.receive(&msg, now_ms) {
                events.push(event);
            }
        }
        session.replicator.prune_chat(now_ms);

        for event in events {
            self.apply_lifecycle(event);
        }

        if let Some(session) = &self.online {
            let before = self.state.status;
            session.replicator.apply_authoritative(&mut self.state);
            if self.state.status != before {
                log::info!("Host moved match {:?} -> {:?}", before, self.state.status);
            }
        }
    }

    fn apply_lifecycle(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Start { duration_ms } => {
                self.settings.set_duration_minutes(whole_minutes(duration_ms));
                self.state = transition(&self.state, &MatchAction::Reset);
                self.dispatch(MatchAction::Start {
                    mode: GameMode::Online,
                    duration_ms,
                });
            }
            LifecycleEvent::Reset => {
                self.dispatch(MatchAction::Reset);
            }
            LifecycleEvent::Settings { duration_ms } => {
                self.settings.set_duration_minutes(whole_minutes(duration_ms));
                self.dispatch(MatchAction::SetDuration { duration_ms });
            }
        }
    }

    fn send_outbound(&mut self, now_ms: f64) {
        let Some(session) = self.online.as_mut() else {
            return;
        };
        if self.state.status == MatchStatus::Menu || !session.channel.peer_connected() {
            return;
        }
        for msg in session.replicator.outbound(&self.state, now_ms) {
            session.channel.send(msg);
        }
    }
}
