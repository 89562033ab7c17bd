//! Top-level error type, used only where bootstrap or setup code needs to
//! unify errors from every layer. Per-connection handling never surfaces
//! these as internal detail to a client — only the closed `ErrorCode`
//! taxonomy crosses the wire.

use airjam_auth::AuthError;
use airjam_protocol::ProtocolError;
use airjam_room::RoomError;
use airjam_transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error("failed to connect to the credential store: {0}")]
    Store(#[from] sqlx::Error),

    #[error("failed to bind listener: {0}")]
    Bind(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use airjam_protocol::RoomCode;

    #[test]
    fn wraps_room_error() {
        let err = RoomError::NotFound(RoomCode::new("ABCD").unwrap());
        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::Room(_)));
    }

    #[test]
    fn wraps_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let app_err: AppError = err.into();
        assert!(matches!(app_err, AppError::Protocol(_)));
    }
}
