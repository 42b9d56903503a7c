//! Online play
//!
//! `protocol` defines the action messages, `channel` the transport seam and
//! `replication` the host/client ownership split with smoothing.

pub mod channel;
pub mod protocol;
pub mod replication;

pub use channel::{ActionChannel, Connection, LoopbackChannel};
pub use protocol::{ActionMessage, BallSyncPayload, ChatPayload, NetAction, ProtocolError};
pub use replication::{ChatMessage, LifecycleEvent, Replicator, dead_reckon, ease};
