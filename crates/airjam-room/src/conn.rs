//! Connection identity as seen by the room layer.
//!
//! The room registry and room actors never touch an actual socket — they
//! only need a stable identity per connection (`ConnId`) and a channel to
//! push outbound events back to whoever owns that socket. Minting real
//! connection ids and wiring them to sockets is the router's job
//! (`airjam`'s per-connection handler).

use std::fmt;

use airjam_protocol::ServerEvent;
use tokio::sync::mpsc;

/// Opaque connection identity, assigned by the router when a socket is
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(u64);

impl ConnId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// The sending half of a connection's outbound event channel. Cloned into
/// a room actor whenever that connection attaches (as host or controller)
/// so the actor can push `ServerEvent`s to it directly.
pub type OutboundSender = mpsc::UnboundedSender<ServerEvent>;
