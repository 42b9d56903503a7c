//! Slime Duel headless driver
//!
//! Plays a match without a renderer, feeding the scheduler synthetic 60 Hz
//! frame timestamps. Both sides are driven by the AI.
//!
//! Usage: `slime-duel [settings.json] [--online]`

#[cfg(not(target_arch = "wasm32"))]
use slime_duel::scheduler::{Controller, FixedStepScheduler, FrameReport};
#[cfg(not(target_arch = "wasm32"))]
use slime_duel::{Settings, net::LoopbackChannel, sim::MatchState, sim::Side};

/// Synthetic frame spacing (a 60 Hz display)
#[cfg(not(target_arch = "wasm32"))]
const FRAME_MS: f64 = 1000.0 / 60.0 + 0.01;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Slime Duel (headless) starting...");

    let mut settings_path = None;
    let mut online = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--online" => online = true,
            path => settings_path = Some(path.to_string()),
        }
    }
    let settings = settings_path
        .map(Settings::load_or_default)
        .unwrap_or_default();

    if online {
        run_online(settings);
    } else {
        run_offline(settings);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Embedders drive `FixedStepScheduler` directly
}

#[cfg(not(target_arch = "wasm32"))]
fn log_report(who: &str, report: &FrameReport, state: &MatchState) {
    if let Some(side) = report.events.goal {
        log::info!(
            "[{who}] {side:?} scores ({} - {}, {:.0}s left)",
            state.left_score,
            state.right_score,
            state.time_remaining_ms / 1000.0
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn summary(who: &str, state: &MatchState) {
    log::info!(
        "[{who}] final {} - {} ({:?}, {:?})",
        state.left_score,
        state.right_score,
        state.status,
        state.winner
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn run_offline(settings: Settings) {
    let difficulty = settings.difficulty;
    let mut scheduler = FixedStepScheduler::new(settings);
    for side in Side::BOTH {
        scheduler.set_controller(side, Controller::Ai(difficulty));
    }
    scheduler.start_match();

    let mut now = 0.0;
    while scheduler.state().is_playing() {
        let report = scheduler.frame(now);
        log_report("local", &report, scheduler.state());
        now += FRAME_MS;
    }
    summary("local", scheduler.state());
}

#[cfg(not(target_arch = "wasm32"))]
fn run_online(settings: Settings) {
    let difficulty = settings.difficulty;
    let (host_channel, client_channel) = LoopbackChannel::pair();
    let mut host = FixedStepScheduler::online(settings.clone(), Box::new(host_channel));
    let mut client = FixedStepScheduler::online(settings, Box::new(client_channel));
    host.set_controller(Side::Left, Controller::Ai(difficulty));
    client.set_controller(Side::Right, Controller::Ai(difficulty));

    host.start_match();
    host.send_chat("host", "Host", "good luck", 0.0);

    let mut now = 0.0;
    // The client may still be catching its last ball_sync when the host ends
    let mut grace_frames = 30;
    while grace_frames > 0 {
        let report = host.frame(now);
        log_report("host", &report, host.state());
        client.frame(now);
        if !host.state().is_playing() {
            grace_frames -= 1;
        }
        now += FRAME_MS;
    }

    summary("host", host.state());
    summary("client", client.state());
}
