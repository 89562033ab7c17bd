/// Errors that can occur on a connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed (by either side).
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] axum::Error),

    /// Receiving a frame failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] axum::Error),
}
