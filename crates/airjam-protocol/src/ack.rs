//! Acknowledgement envelope and the closed error-code taxonomy.
//!
//! Registration-class calls (`host:register*`, `host:joinAsChild`,
//! `system:launchGame`, `controller:join`) reply with a callback shaped
//! either `{ok:true, ...}` or `{ok:false, message, code}`. `Ack<T>` models
//! both shapes: `T` is whatever the success payload looks like for a given
//! call (e.g. `{roomId}` for registration, `{joinToken}` for launch).

use serde::{Deserialize, Serialize};

/// The closed set of error codes the broker ever returns, either in an ack
/// or in a `server:error` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Schema validation failed.
    InvalidPayload,
    /// The auth verifier rejected the supplied API key.
    InvalidApiKey,
    /// `roomId` does not name a live room.
    RoomNotFound,
    /// `controllers.size` is already at `maxPlayers`.
    RoomFull,
    /// The caller is not the expected role (e.g. not the master) for this command.
    Unauthorized,
    /// The supplied join token does not match the room's current token.
    InvalidToken,
    /// A child host is already attached to this room.
    AlreadyConnected,
}

/// The success half of an ack: `{ok: true, ...}`, with `T` providing the
/// rest of the fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckOk<T> {
    pub ok: bool,
    #[serde(flatten)]
    pub data: T,
}

/// The failure half of an ack: `{ok: false, message, code}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckErr {
    pub ok: bool,
    pub message: String,
    pub code: ErrorCode,
}

/// An acknowledgement sent back to the caller of a registration-class event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ack<T> {
    Ok(AckOk<T>),
    Err(AckErr),
}

impl<T> Ack<T> {
    pub fn ok(data: T) -> Self {
        Ack::Ok(AckOk { ok: true, data })
    }

    pub fn err(code: ErrorCode, message: impl Into<String>) -> Self {
        Ack::Err(AckErr {
            ok: false,
            message: message.into(),
            code,
        })
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Ack::Ok(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct RoomIdPayload {
        room_id: String,
    }

    #[test]
    fn ok_ack_flattens_into_ok_true_plus_fields() {
        let ack = Ack::ok(RoomIdPayload { room_id: "ABCD".into() });
        let value = serde_json::to_value(&ack).unwrap();
        assert_eq!(value, json!({"ok": true, "room_id": "ABCD"}));
    }

    #[test]
    fn err_ack_has_message_and_code() {
        let ack: Ack<RoomIdPayload> = Ack::err(ErrorCode::RoomFull, "room is full");
        let value = serde_json::to_value(&ack).unwrap();
        assert_eq!(
            value,
            json!({"ok": false, "message": "room is full", "code": "ROOM_FULL"})
        );
    }

    #[test]
    fn error_code_serializes_as_screaming_snake_case() {
        assert_eq!(
            serde_json::to_value(ErrorCode::InvalidApiKey).unwrap(),
            json!("INVALID_API_KEY")
        );
    }
}
