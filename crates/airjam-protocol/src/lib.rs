//! Wire protocol for the AirJam broker.
//!
//! This crate defines the "language" hosts and controllers speak: the
//! event catalog ([`ClientEvent`], [`ServerEvent`]), the identifiers and
//! entities that appear in it ([`RoomCode`], [`ControllerId`],
//! [`PlayerProfile`], [`JoinToken`]), the ack envelope and closed error
//! taxonomy ([`Ack`], [`ErrorCode`]), and how it's all turned into bytes
//! ([`Codec`], [`JsonCodec`]).
//!
//! It doesn't know about rooms, connections, or authorization — those
//! live in `airjam-room` and `airjam-auth`. This crate only knows how to
//! name, validate the shape of, and serialize a message.

mod ack;
mod codec;
mod error;
mod events;
mod ids;

pub use ack::{Ack, AckErr, AckOk, ErrorCode};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{
    ClientEvent, ControllerCommand, GameState, HostCommand, ServerEvent, StatePatch,
    StateSnapshot,
};
pub use ids::{
    normalize_color, palette_color, ControllerId, JoinToken, PlayerProfile, RoomCode,
    COLOR_PALETTE,
};
