//! Error types for the room layer.

use airjam_protocol::RoomCode;

/// Errors that can occur while routing an event against a room.
///
/// These map onto the closed `ErrorCode` taxonomy at the router boundary;
/// they exist as a distinct enum so the room layer can carry slightly
/// richer detail (e.g. which room) through its own logging.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("room {0} not found")]
    NotFound(RoomCode),

    #[error("room {0} is full")]
    RoomFull(RoomCode),

    #[error("caller is not authorized for this action on room {0}")]
    Unauthorized(RoomCode),

    #[error("join token mismatch for room {0}")]
    InvalidToken(RoomCode),

    #[error("a child host is already attached to room {0}")]
    AlreadyConnected(RoomCode),

    #[error("room actor for {0} is gone")]
    ActorGone(RoomCode),
}
