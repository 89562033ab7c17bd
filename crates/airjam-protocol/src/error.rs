//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type). The most
    /// common cause at the router is an unrecognized `type` tag or a
    /// payload that fails the event's schema — both surface to the caller
    /// as `ErrorCode::InvalidPayload`.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message is structurally valid but invalid at the protocol
    /// level, e.g. an empty room code.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
