//! AirJam: a real-time room broker connecting a system (arcade) host, an
//! optional child game host, and phone-based controllers.
//!
//! This crate wires together the lower layers — `airjam-protocol` (wire
//! format), `airjam-auth` (API-key verification), `airjam-room` (room
//! registry and actors), `airjam-transport` (WebSocket connections) —
//! behind an `axum` HTTP/WebSocket listener.

mod config;
mod error;
mod handler;
mod server;

pub use config::{AuthMode, Config};
pub use error::AppError;
pub use server::{build_app, run};
