//! The event catalog: every message that can cross the wire, tagged by a
//! stable `type` name. Client events are internally tagged on `type`;
//! server events (including the `client:*` instructions routed to
//! controllers) share the same shape so a single codec round-trips both
//! directions.

use serde::{Deserialize, Serialize};

use crate::ack::ErrorCode;
use crate::ids::{ControllerId, PlayerProfile, RoomCode};

/// Room-authoritative play/pause state. `paused` is the initial value for a
/// newly created room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Playing,
    Paused,
}

impl Default for GameState {
    fn default() -> Self {
        GameState::Paused
    }
}

/// `host:system{toggle_pause}` is the only currently defined host system command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostCommand {
    TogglePause,
}

/// `controller:system{exit | toggle_pause}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerCommand {
    Exit,
    TogglePause,
}

/// The optional patch carried by `host:state`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePatch {
    pub game_state: Option<GameState>,
    pub message: Option<String>,
}

/// The snapshot broadcast in `server:state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub game_state: GameState,
}

/// Every client-to-server message, tagged by its canonical event name.
/// Unrecognized `type` values, and payloads that fail to match a known
/// variant's schema, fail to deserialize — the router turns that failure
/// into `ErrorCode::InvalidPayload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientEvent {
    #[serde(rename = "host:registerSystem", rename_all = "camelCase")]
    HostRegisterSystem {
        room_id: RoomCode,
        api_key: String,
    },
    #[serde(rename = "host:register", rename_all = "camelCase")]
    HostRegister {
        room_id: RoomCode,
        max_players: Option<u32>,
    },
    #[serde(rename = "host:joinAsChild", rename_all = "camelCase")]
    HostJoinAsChild {
        room_id: RoomCode,
        join_token: String,
    },
    #[serde(rename = "system:launchGame", rename_all = "camelCase")]
    SystemLaunchGame {
        room_id: RoomCode,
        game_id: String,
        game_url: String,
    },
    #[serde(rename = "system:closeGame", rename_all = "camelCase")]
    SystemCloseGame { room_id: RoomCode },
    #[serde(rename = "host:state", rename_all = "camelCase")]
    HostState {
        room_id: RoomCode,
        #[serde(default)]
        state: StatePatch,
    },
    #[serde(rename = "host:system", rename_all = "camelCase")]
    HostSystem {
        room_id: RoomCode,
        command: HostCommand,
    },
    #[serde(rename = "host:signal", rename_all = "camelCase")]
    HostSignal {
        room_id: RoomCode,
        target_id: Option<ControllerId>,
        #[serde(flatten)]
        payload: serde_json::Map<String, serde_json::Value>,
    },
    #[serde(rename = "host:play_sound", rename_all = "camelCase")]
    HostPlaySound {
        room_id: RoomCode,
        target_controller_id: Option<ControllerId>,
        sound_id: String,
        volume: Option<f64>,
        #[serde(rename = "loop")]
        looped: Option<bool>,
    },
    #[serde(rename = "controller:join", rename_all = "camelCase")]
    ControllerJoin {
        room_id: RoomCode,
        controller_id: ControllerId,
        nickname: Option<String>,
    },
    #[serde(rename = "controller:leave", rename_all = "camelCase")]
    ControllerLeave {
        room_id: RoomCode,
        controller_id: ControllerId,
    },
    #[serde(rename = "controller:input", rename_all = "camelCase")]
    ControllerInput {
        room_id: RoomCode,
        controller_id: ControllerId,
        input: serde_json::Value,
    },
    #[serde(rename = "controller:system", rename_all = "camelCase")]
    ControllerSystem {
        room_id: RoomCode,
        command: ControllerCommand,
    },
    #[serde(rename = "controller:play_sound", rename_all = "camelCase")]
    ControllerPlaySound {
        room_id: RoomCode,
        sound_id: String,
        volume: Option<f64>,
        #[serde(rename = "loop")]
        looped: Option<bool>,
    },
}

/// Every server-to-client message, including the `client:*` instructions
/// routed to controllers when a child attaches or detaches.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    #[serde(rename = "server:roomReady", rename_all = "camelCase")]
    RoomReady { room_id: RoomCode },
    #[serde(rename = "server:welcome", rename_all = "camelCase")]
    Welcome {
        controller_id: ControllerId,
        room_id: RoomCode,
        player: PlayerProfile,
    },
    #[serde(rename = "server:controllerJoined", rename_all = "camelCase")]
    ControllerJoined {
        room_id: RoomCode,
        controller_id: ControllerId,
        player: PlayerProfile,
    },
    #[serde(rename = "server:controllerLeft", rename_all = "camelCase")]
    ControllerLeft {
        room_id: RoomCode,
        controller_id: ControllerId,
    },
    #[serde(rename = "server:hostLeft", rename_all = "camelCase")]
    HostLeft { room_id: RoomCode, reason: String },
    #[serde(rename = "server:closeChild", rename_all = "camelCase")]
    CloseChild { room_id: RoomCode },
    #[serde(rename = "server:state", rename_all = "camelCase")]
    State {
        room_id: RoomCode,
        state: StateSnapshot,
    },
    #[serde(rename = "server:input", rename_all = "camelCase")]
    Input {
        room_id: RoomCode,
        controller_id: ControllerId,
        input: serde_json::Value,
    },
    #[serde(rename = "server:signal", rename_all = "camelCase")]
    Signal {
        room_id: RoomCode,
        sender_controller_id: Option<ControllerId>,
        #[serde(flatten)]
        payload: serde_json::Map<String, serde_json::Value>,
    },
    #[serde(rename = "server:playSound", rename_all = "camelCase")]
    PlaySound {
        id: String,
        volume: Option<f64>,
        #[serde(rename = "loop")]
        looped: Option<bool>,
    },
    #[serde(rename = "server:error", rename_all = "camelCase")]
    Error { code: ErrorCode, message: String },
    #[serde(rename = "client:loadUi", rename_all = "camelCase")]
    ClientLoadUi { url: String },
    #[serde(rename = "client:unloadUi", rename_all = "camelCase")]
    ClientUnloadUi {},
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn host_register_system_deserializes_by_type_tag() {
        let raw = json!({
            "type": "host:registerSystem",
            "roomId": "ABCD",
            "apiKey": "secret",
        });
        let event: ClientEvent = serde_json::from_value(raw).unwrap();
        match event {
            ClientEvent::HostRegisterSystem { room_id, api_key } => {
                assert_eq!(room_id.as_str(), "ABCD");
                assert_eq!(api_key, "secret");
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn controller_input_carries_opaque_payload_verbatim() {
        let raw = json!({
            "type": "controller:input",
            "roomId": "ABCD",
            "controllerId": "c-1",
            "input": {"vector": {"x": 1, "y": 0}, "action": false},
        });
        let event: ClientEvent = serde_json::from_value(raw.clone()).unwrap();
        match event {
            ClientEvent::ControllerInput { input, .. } => {
                assert_eq!(input, raw["input"]);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_tag_fails_to_deserialize() {
        let raw = json!({"type": "host:doesNotExist", "roomId": "ABCD"});
        assert!(serde_json::from_value::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn server_welcome_serializes_with_colon_type_tag() {
        let event = ServerEvent::Welcome {
            controller_id: ControllerId::new("c-1"),
            room_id: RoomCode::new("ABCD").unwrap(),
            player: PlayerProfile {
                id: ControllerId::new("c-1"),
                label: "Player 0".into(),
                color: "#38bdf8".into(),
            },
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], json!("server:welcome"));
        assert_eq!(value["player"]["color"], json!("#38bdf8"));
    }

    #[test]
    fn client_unload_ui_serializes_with_no_extra_fields() {
        let value = serde_json::to_value(ServerEvent::ClientUnloadUi {}).unwrap();
        assert_eq!(value, json!({"type": "client:unloadUi"}));
    }
}
