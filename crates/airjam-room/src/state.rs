//! The room focus state machine.
//!
//! `GameState` (playing/paused) lives in `airjam-protocol` since it's
//! serialized directly onto the wire (`server:state`); `Focus` never
//! appears in a wire message, so it stays internal to the room layer.

use std::fmt;

/// Which host is currently authoritative for controller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The master (system/arcade) host owns input.
    System,
    /// The child (embedded game) host owns input.
    Game,
}

impl Focus {
    pub fn is_game(self) -> bool {
        matches!(self, Focus::Game)
    }
}

impl Default for Focus {
    fn default() -> Self {
        Focus::System
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Focus::System => f.write_str("SYSTEM"),
            Focus::Game => f.write_str("GAME"),
        }
    }
}
