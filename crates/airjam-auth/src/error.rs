//! Error types for the auth layer.

/// Errors that can occur while resolving an API key.
///
/// Per the propagation policy, a store failure must never leak internal
/// detail to the caller — it degrades to the same `InvalidApiKey` ack the
/// caller would see for a plain bad key. `Store` exists so the router can
/// still log the underlying cause.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The supplied key did not resolve to an active credential.
    #[error("invalid api key")]
    InvalidApiKey,

    /// The credential store could not be reached or queried.
    #[cfg(feature = "store")]
    #[error("credential store error: {0}")]
    Store(#[source] sqlx::Error),
}
