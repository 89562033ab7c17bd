//! Identifiers and entity-shaped values that travel on the wire: room codes,
//! controller ids, join tokens, and player profiles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The 20-entry color palette controllers are assigned from, indexed by
/// `controllers.size` at the moment of admission (mod 20, so the palette
/// wraps and can collide beyond 20 players — see the open question in the
/// design notes).
pub const COLOR_PALETTE: [&str; 20] = [
    "#38bdf8", "#f472b6", "#facc15", "#4ade80", "#a78bfa", "#fb923c", "#2dd4bf", "#f87171",
    "#60a5fa", "#c084fc", "#34d399", "#fbbf24", "#e879f9", "#818cf8", "#fca5a5", "#22d3ee",
    "#a3e635", "#f9a8d4", "#fdba74", "#93c5fd",
];

/// Uppercase alphanumerics with `O`, `I`, `0`, `1` removed, used when the
/// broker generates a room code.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// A short, case-sensitive identifier for a room, unique among live rooms.
///
/// Client-supplied codes are accepted as long as they're non-empty; the
/// restricted alphabet only constrains codes the broker itself generates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Wraps an already-known room code, e.g. one supplied by a client.
    ///
    /// Returns `None` for an empty string; the broker never creates or
    /// looks up rooms under an empty code.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Generates a fresh room code from the unambiguous alphabet using the
    /// given byte source (one byte consumed per character).
    pub fn generate(len: usize, random_bytes: impl Iterator<Item = u8>) -> Self {
        let code: String = random_bytes
            .take(len)
            .map(|b| ROOM_CODE_ALPHABET[(b as usize) % ROOM_CODE_ALPHABET.len()] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-generated identifier for a controller, persisted in the
/// controller's local storage so it can reconnect as "the same" controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControllerId(String);

impl ControllerId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque one-shot credential minted by the broker to bind a launched game
/// to the room that launched it. Any non-empty string is a structurally
/// valid token; the broker itself only ever generates UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinToken(String);

impl JoinToken {
    /// Mints a fresh token. The broker's own tokens are always UUIDs.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `{id, label, color}`, assigned to a controller at join time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: ControllerId,
    pub label: String,
    pub color: String,
}

/// Validates and normalizes a color to canonical `#` + six lowercase hex
/// digits. Returns `None` if the input can't be coerced.
pub fn normalize_color(raw: &str) -> Option<String> {
    let hex = raw.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", hex.to_ascii_lowercase()))
}

/// Returns the color assigned to the `n`-th controller admitted into a room
/// (`n` is `controllers.size` *before* insertion), normalized to canonical
/// form. Falls back to `palette[0]` if the palette entry is somehow
/// malformed (it never is, in practice — the palette is a compile-time
/// constant — but §8 requires the fallback to exist).
pub fn palette_color(n: usize) -> String {
    let raw = COLOR_PALETTE[n % COLOR_PALETTE.len()];
    normalize_color(raw).unwrap_or_else(|| normalize_color(COLOR_PALETTE[0]).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_code_rejects_empty() {
        assert!(RoomCode::new("").is_none());
        assert!(RoomCode::new("ABCD").is_some());
    }

    #[test]
    fn room_code_generate_uses_unambiguous_alphabet() {
        let code = RoomCode::generate(8, (0u8..=255).cycle());
        for c in code.as_str().chars() {
            assert!(!"OI01".contains(c), "ambiguous char {c} leaked into generated code");
        }
        assert_eq!(code.as_str().len(), 8);
    }

    #[test]
    fn normalize_color_lowercases_and_validates() {
        assert_eq!(normalize_color("#ABCDEF"), Some("#abcdef".to_string()));
        assert_eq!(normalize_color("#abc"), None);
        assert_eq!(normalize_color("abcdef"), None);
        assert_eq!(normalize_color("#12345g"), None);
    }

    #[test]
    fn palette_color_wraps_at_twenty() {
        assert_eq!(palette_color(0), palette_color(20));
        assert_eq!(palette_color(1), palette_color(21));
    }

    #[test]
    fn join_token_round_trips_through_json() {
        let token = JoinToken::generate();
        let json = serde_json::to_string(&token).unwrap();
        let decoded: JoinToken = serde_json::from_str(&json).unwrap();
        assert_eq!(token, decoded);
    }
}
