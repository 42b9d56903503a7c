//! Network action protocol
//!
//! Peers exchange `(action, payload)` pairs where the payload is an opaque
//! JSON object. Typed views are decoded on receipt; unknown or malformed
//! messages come back as errors and the caller drops them.
//!
//! Durations on the wire are milliseconds.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::sim::{ActorState, BallState, MatchState, MatchStatus, Winner};

pub const START: &str = "start";
pub const RESET: &str = "reset";
pub const SETTINGS: &str = "settings";
pub const CHAT: &str = "chat";
pub const SLIME_SYNC: &str = "slime_sync";
pub const BALL_SYNC: &str = "ball_sync";

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("malformed `{action}` payload: {source}")]
    MalformedPayload {
        action: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Raw message as carried by the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMessage {
    pub action: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
}

impl ActionMessage {
    pub fn new(action: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            action: action.into(),
            payload,
        }
    }

    /// Serialize for text transports
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from a text transport
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct DurationPayload {
    duration: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub from: String,
    pub from_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlimeSyncPayload {
    actor_state: ActorState,
}

/// Host-owned world state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallSyncPayload {
    pub ball_state: BallState,
    pub left_score: u32,
    pub right_score: u32,
    /// Milliseconds
    pub time_remaining: f64,
    pub status: MatchStatus,
    pub winner: Winner,
}

impl BallSyncPayload {
    pub fn from_match(state: &MatchState) -> Self {
        Self {
            ball_state: state.ball,
            left_score: state.left_score,
            right_score: state.right_score,
            time_remaining: state.time_remaining_ms,
            status: state.status,
            winner: state.winner,
        }
    }
}

/// Decoded action
#[derive(Debug, Clone, PartialEq)]
pub enum NetAction {
    Start { duration_ms: f64 },
    Reset,
    Settings { duration_ms: f64 },
    Chat(ChatPayload),
    SlimeSync(ActorState),
    BallSync(BallSyncPayload),
}

fn parse<T: DeserializeOwned>(msg: &ActionMessage) -> Result<T, ProtocolError> {
    serde_json::from_value(Value::Object(msg.payload.clone())).map_err(|source| {
        ProtocolError::MalformedPayload {
            action: msg.action.clone(),
            source,
        }
    })
}

impl NetAction {
    pub fn name(&self) -> &'static str {
        match self {
            NetAction::Start { .. } => START,
            NetAction::Reset => RESET,
            NetAction::Settings { .. } => SETTINGS,
            NetAction::Chat(_) => CHAT,
            NetAction::SlimeSync(_) => SLIME_SYNC,
            NetAction::BallSync(_) => BALL_SYNC,
        }
    }

    pub fn decode(msg: &ActionMessage) -> Result<Self, ProtocolError> {
        let action = match msg.action.as_str() {
            START => {
                let p: DurationPayload = parse(msg)?;
                NetAction::Start {
                    duration_ms: p.duration,
                }
            }
            RESET => NetAction::Reset,
            SETTINGS => {
                let p: DurationPayload = parse(msg)?;
                NetAction::Settings {
                    duration_ms: p.duration,
                }
            }
            CHAT => NetAction::Chat(parse(msg)?),
            SLIME_SYNC => {
                let p: SlimeSyncPayload = parse(msg)?;
                NetAction::SlimeSync(p.actor_state)
            }
            BALL_SYNC => NetAction::BallSync(parse(msg)?),
            other => return Err(ProtocolError::UnknownAction(other.to_string())),
        };
        Ok(action)
    }

    pub fn encode(&self) -> Result<ActionMessage, ProtocolError> {
        let value = match self {
            NetAction::Start { duration_ms } | NetAction::Settings { duration_ms } => {
                serde_json::to_value(DurationPayload {
                    duration: *duration_ms,
                })?
            }
            NetAction::Reset => Value::Object(Map::new()),
            NetAction::Chat(chat) => serde_json::to_value(chat)?,
            NetAction::SlimeSync(actor) => serde_json::to_value(SlimeSyncPayload {
                actor_state: *actor,
            })?,
            NetAction::BallSync(world) => serde_json::to_value(world)?,
        };
        let payload = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Ok(ActionMessage::new(self.name(), payload))
    }
}
