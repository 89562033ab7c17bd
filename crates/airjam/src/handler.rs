//! Per-connection handler: decodes client events, resolves them against
//! the room registry, and forwards whatever a room actor sends back.
//!
//! Each connection runs two cooperating halves: this function's own loop
//! reads and dispatches inbound frames, while a spawned "writer" task
//! drains the connection's outbound channel and serializes it back onto
//! the socket. A connection's outbound channel is only ever held by the
//! room actor(s) it has attached to and by this handler's writer task —
//! when a room actor drops its copy (on takeover or teardown), the writer
//! task's receive loop ends on its own.

use std::sync::Arc;

use airjam_auth::ApiKeyVerifier;
use airjam_protocol::{Ack, ClientEvent, Codec, ErrorCode, JsonCodec, RoomCode, ServerEvent};
use airjam_room::{ConnId, ControllerJoinAck, LaunchAck, RoomCommand, RoomIdAck};
use airjam_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::{mpsc, oneshot};

use crate::server::AppState;

enum Role {
    Unknown,
    Master { room: RoomCode },
    Child { room: RoomCode },
    Controller { room: RoomCode, controller_id: airjam_protocol::ControllerId },
}

pub(crate) async fn handle_socket(socket: axum::extract::ws::WebSocket, state: Arc<AppState>) {
    let conn_num = state.next_conn_id();
    let conn = ConnId::new(conn_num);
    let connection = Arc::new(WebSocketConnection::new(ConnectionId::new(conn_num), socket));
    let codec = JsonCodec;

    tracing::debug!(%conn, "connection accepted");

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ServerEvent>();

    let writer_conn = Arc::clone(&connection);
    let writer = tokio::spawn(async move {
        while let Some(event) = out_rx.recv().await {
            let is_host_left = matches!(event, ServerEvent::HostLeft { .. });
            match codec.encode(&event) {
                Ok(bytes) => {
                    if writer_conn.send(&bytes).await.is_err() {
                        break;
                    }
                }
                Err(error) => tracing::warn!(%error, "failed to encode outbound event"),
            }
            if is_host_left {
                let _ = writer_conn.close().await;
                break;
            }
        }
    });

    let mut role = Role::Unknown;
    loop {
        let data = match connection.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => break,
            Err(error) => {
                tracing::debug!(%conn, %error, "receive error");
                break;
            }
        };

        let event: ClientEvent = match codec.decode(&data) {
            Ok(event) => event,
            Err(error) => {
                tracing::debug!(%conn, %error, "failed to decode client event, dropping frame");
                continue;
            }
        };

        role = dispatch(&state, &connection, &codec, conn, &out_tx, role, event).await;
    }

    tracing::debug!(%conn, "connection closed");
    on_disconnect(&state, conn, role).await;
    writer.abort();
}

async fn send_ack<T: serde::Serialize>(connection: &WebSocketConnection, codec: &JsonCodec, ack: &Ack<T>) {
    match codec.encode(ack) {
        Ok(bytes) => {
            let _ = connection.send(&bytes).await;
        }
        Err(error) => tracing::warn!(%error, "failed to encode ack"),
    }
}

async fn send_error(connection: &WebSocketConnection, codec: &JsonCodec, code: ErrorCode, message: impl Into<String>) {
    let event = ServerEvent::Error { code, message: message.into() };
    if let Ok(bytes) = codec.encode(&event) {
        let _ = connection.send(&bytes).await;
    }
}

async fn dispatch(
    state: &Arc<AppState>,
    connection: &Arc<WebSocketConnection>,
    codec: &JsonCodec,
    conn: ConnId,
    out_tx: &mpsc::UnboundedSender<ServerEvent>,
    role: Role,
    event: ClientEvent,
) -> Role {
    match event {
        ClientEvent::HostRegisterSystem { room_id, api_key } => {
            if let Err(error) = state.verifier.verify(&api_key).await {
                tracing::warn!(%room_id, %error, "rejected invalid api key");
                send_ack::<RoomIdAck>(
                    connection,
                    codec,
                    &Ack::err(ErrorCode::InvalidApiKey, "invalid api key"),
                )
                .await;
                return role;
            }
            let room = state.registry.lock().await.room_for_system_register(room_id.clone());
            let (reply_tx, reply_rx) = oneshot::channel();
            if room
                .send(RoomCommand::BecomeMaster { conn, sender: out_tx.clone(), reply: reply_tx })
                .await
                .is_err()
            {
                return role;
            }
            let Ok(ack) = reply_rx.await else { return role };
            let became_master = ack.is_ok();
            send_ack(connection, codec, &ack).await;
            if became_master {
                state.registry.lock().await.set_host(conn, room_id.clone());
                return Role::Master { room: room_id };
            }
            role
        }

        ClientEvent::HostRegister { room_id, max_players } => {
            let room = state
                .registry
                .lock()
                .await
                .room_for_legacy_register(room_id.clone(), max_players);
            let (reply_tx, reply_rx) = oneshot::channel();
            if room
                .send(RoomCommand::BecomeMaster { conn, sender: out_tx.clone(), reply: reply_tx })
                .await
                .is_err()
            {
                return role;
            }
            let Ok(ack) = reply_rx.await else { return role };
            let became_master = ack.is_ok();
            send_ack(connection, codec, &ack).await;
            if became_master {
                state.registry.lock().await.set_host(conn, room_id.clone());
                return Role::Master { room: room_id };
            }
            role
        }

        ClientEvent::HostJoinAsChild { room_id, join_token } => {
            let Some(room) = state.registry.lock().await.get_room(&room_id) else {
                send_ack::<RoomIdAck>(connection, codec, &Ack::err(ErrorCode::RoomNotFound, "room not found")).await;
                return role;
            };
            let (reply_tx, reply_rx) = oneshot::channel();
            if room
                .send(RoomCommand::JoinAsChild { conn, sender: out_tx.clone(), join_token, reply: reply_tx })
                .await
                .is_err()
            {
                return role;
            }
            let Ok(ack) = reply_rx.await else { return role };
            let became_child = ack.is_ok();
            send_ack(connection, codec, &ack).await;
            if became_child {
                state.registry.lock().await.set_host(conn, room_id.clone());
                return Role::Child { room: room_id };
            }
            role
        }

        ClientEvent::SystemLaunchGame { room_id, game_id, game_url } => {
            let Some(room) = state.registry.lock().await.get_room(&room_id) else {
                send_ack::<LaunchAck>(connection, codec, &Ack::err(ErrorCode::RoomNotFound, "room not found")).await;
                return role;
            };
            let (reply_tx, reply_rx) = oneshot::channel();
            if room.send(RoomCommand::LaunchGame { conn, game_id, game_url, reply: reply_tx }).await.is_err() {
                return role;
            }
            if let Ok(ack) = reply_rx.await {
                send_ack(connection, codec, &ack).await;
            }
            role
        }

        ClientEvent::SystemCloseGame { room_id } => {
            match state.registry.lock().await.get_room(&room_id) {
                Some(room) => {
                    let _ = room.send(RoomCommand::CloseGame { conn }).await;
                }
                None => send_error(connection, codec, ErrorCode::RoomNotFound, "room not found").await,
            }
            role
        }

        ClientEvent::HostState { room_id, state: patch } => {
            match state.registry.lock().await.get_room(&room_id) {
                Some(room) => {
                    let _ = room
                        .send(RoomCommand::HostState { conn, game_state: patch.game_state, message: patch.message })
                        .await;
                }
                None => send_error(connection, codec, ErrorCode::RoomNotFound, "room not found").await,
            }
            role
        }

        ClientEvent::HostSystem { room_id, command } => {
            match state.registry.lock().await.get_room(&room_id) {
                Some(room) => {
                    let _ = room.send(RoomCommand::HostSystem { conn, command }).await;
                }
                None => send_error(connection, codec, ErrorCode::RoomNotFound, "room not found").await,
            }
            role
        }

        ClientEvent::HostSignal { room_id, target_id, payload } => {
            if let Some(room) = state.registry.lock().await.get_room(&room_id) {
                let _ = room.send(RoomCommand::HostSignal { conn, target_id, payload }).await;
            }
            role
        }

        ClientEvent::HostPlaySound { room_id, target_controller_id, sound_id, volume, looped } => {
            if let Some(room) = state.registry.lock().await.get_room(&room_id) {
                let _ = room
                    .send(RoomCommand::HostPlaySound {
                        conn,
                        target_controller_id,
                        sound_id,
                        volume,
                        looped,
                    })
                    .await;
            }
            role
        }

        ClientEvent::ControllerJoin { room_id, controller_id, nickname } => {
            let Some(room) = state.registry.lock().await.get_room(&room_id) else {
                send_ack::<ControllerJoinAck>(connection, codec, &Ack::err(ErrorCode::RoomNotFound, "room not found"))
                    .await;
                return role;
            };
            let (reply_tx, reply_rx) = oneshot::channel();
            if room
                .send(RoomCommand::ControllerJoin {
                    conn,
                    sender: out_tx.clone(),
                    controller_id: controller_id.clone(),
                    nickname,
                    reply: reply_tx,
                })
                .await
                .is_err()
            {
                return role;
            }
            let Ok(ack) = reply_rx.await else { return role };
            let joined = ack.is_ok();
            send_ack(connection, codec, &ack).await;
            if joined {
                state.registry.lock().await.set_controller(conn, room_id.clone(), controller_id.clone());
                return Role::Controller { room: room_id, controller_id };
            }
            role
        }

        ClientEvent::ControllerLeave { room_id, controller_id } => {
            if let Some(room) = state.registry.lock().await.get_room(&room_id) {
                let _ = room.send(RoomCommand::ControllerLeave { conn, controller_id }).await;
            }
            state.registry.lock().await.delete_controller(conn);
            Role::Unknown
        }

        ClientEvent::ControllerInput { room_id, controller_id, input } => {
            if let Some(room) = state.registry.lock().await.get_room(&room_id) {
                let _ = room.send(RoomCommand::ControllerInput { conn, controller_id, input }).await;
            }
            role
        }

        ClientEvent::ControllerSystem { room_id, command } => {
            let Role::Controller { controller_id, .. } = &role else {
                send_error(connection, codec, ErrorCode::Unauthorized, "caller is not a joined controller").await;
                return role;
            };
            if let Some(room) = state.registry.lock().await.get_room(&room_id) {
                let _ = room
                    .send(RoomCommand::ControllerSystem { conn, controller_id: controller_id.clone(), command })
                    .await;
            }
            role
        }

        ClientEvent::ControllerPlaySound { room_id, sound_id, volume, looped } => {
            let Role::Controller { controller_id, .. } = &role else {
                return role;
            };
            if let Some(room) = state.registry.lock().await.get_room(&room_id) {
                let _ = room
                    .send(RoomCommand::ControllerPlaySound {
                        conn,
                        controller_id: controller_id.clone(),
                        sound_id,
                        volume,
                        looped,
                    })
                    .await;
            }
            role
        }
    }
}

async fn on_disconnect(state: &Arc<AppState>, conn: ConnId, role: Role) {
    match role {
        Role::Unknown => {}
        Role::Master { room: room_code } => {
            if let Some(room) = state.registry.lock().await.get_room(&room_code) {
                let _ = room.send(RoomCommand::DisconnectMaster { conn }).await;
            }
            state.registry.lock().await.delete_host(conn);
        }
        Role::Child { room: room_code } => {
            if let Some(room) = state.registry.lock().await.get_room(&room_code) {
                let _ = room.send(RoomCommand::DisconnectChild { conn }).await;
            }
            state.registry.lock().await.delete_host(conn);
        }
        Role::Controller { room: room_code, controller_id } => {
            if let Some(room) = state.registry.lock().await.get_room(&room_code) {
                let _ = room.send(RoomCommand::DisconnectController { conn, controller_id }).await;
            }
            state.registry.lock().await.delete_controller(conn);
        }
    }
}
