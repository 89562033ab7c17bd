//! API-key verification for the AirJam broker.
//!
//! Three modes, resolved once at startup from environment (see
//! `airjam`'s `Config`):
//!
//! 1. **Dev** — no credential check at all ([`DevVerifier`]).
//! 2. **Master key** — one shared secret ([`MasterKeyVerifier`]).
//! 3. **Store** — a real `api_keys` table, behind the `store` feature
//!    ([`StoreVerifier`]).
//!
//! The [`ApiKeyVerifier`] trait is the seam between them; the router only
//! ever calls `verify`.

#![allow(async_fn_in_trait)]

mod error;
mod verifier;

pub use error::AuthError;
#[cfg(feature = "store")]
pub use verifier::StoreVerifier;
pub use verifier::{ApiKeyVerifier, DevVerifier, MasterKeyVerifier};
