//! Room lifecycle and event routing for the AirJam broker.
//!
//! Each room runs as an isolated Tokio task (the actor model): a
//! [`RoomRegistry`] creates and looks up [`room::RoomHandle`]s, and all
//! state mutation happens inside the corresponding `RoomActor`, one command
//! at a time, off its own `mpsc` channel. Two rooms never share a lock and
//! make progress independently.
//!
//! This crate knows nothing about sockets or API keys: it's driven purely
//! by [`room::RoomCommand`]s, which the router (outside this crate)
//! constructs after resolving auth and transport concerns.

mod conn;
mod error;
mod registry;
mod room;
mod state;

pub use conn::{ConnId, OutboundSender};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{
    spawn_room, ControllerJoinAck, LaunchAck, RoomActor, RoomCommand, RoomHandle, RoomIdAck,
    RoomInfo, DEFAULT_MAX_PLAYERS_STANDALONE, DEFAULT_MAX_PLAYERS_SYSTEM,
};
pub use state::Focus;
