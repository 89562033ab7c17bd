//! The room actor: one Tokio task per room, owning all mutable state for
//! that room and applying commands strictly in arrival order. Different
//! rooms run as independent tasks and never share a lock.

use std::collections::HashMap;
use std::time::Duration;

use airjam_protocol::{
    Ack, ControllerCommand, ControllerId, ErrorCode, GameState, HostCommand, JoinToken,
    PlayerProfile, RoomCode, ServerEvent, StateSnapshot,
};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::conn::{ConnId, OutboundSender};
use crate::state::Focus;

/// Window after master disconnect during which a re-register preserves the room.
const GRACE_PERIOD: Duration = Duration::from_millis(3_000);
/// Delay after a child attaches before its roster replay is sent.
const ROSTER_REPLAY_DELAY: Duration = Duration::from_millis(100);
/// Default capacity for rooms created via `host:registerSystem`.
pub const DEFAULT_MAX_PLAYERS_SYSTEM: u32 = 32;
/// Default capacity for rooms created via the legacy `host:register` path.
pub const DEFAULT_MAX_PLAYERS_STANDALONE: u32 = 8;

#[derive(Debug, Clone, Serialize)]
pub struct RoomIdAck {
    pub room_id: RoomCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct LaunchAck {
    pub join_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ControllerJoinAck {
    pub controller_id: ControllerId,
    pub room_id: RoomCode,
}

/// A read-only snapshot of a room's state, handed out for health/inspection.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub focus: Focus,
    pub game_state: GameState,
    pub controller_count: usize,
    pub max_players: u32,
    pub has_master: bool,
    pub has_child: bool,
}

struct ControllerEntry {
    conn: ConnId,
    #[allow(dead_code)]
    nickname: Option<String>,
    profile: PlayerProfile,
}

/// Commands accepted by a room actor. Each carries whatever per-connection
/// context the router already knows (the caller's `conn`, and for the
/// first message on a connection, the `OutboundSender` used to push future
/// `ServerEvent`s back to it).
pub enum RoomCommand {
    /// Register or re-register as master (`host:registerSystem` and the
    /// legacy `host:register` both reduce to this once the router has
    /// resolved auth and room creation).
    BecomeMaster {
        conn: ConnId,
        sender: OutboundSender,
        reply: oneshot::Sender<Ack<RoomIdAck>>,
    },
    JoinAsChild {
        conn: ConnId,
        sender: OutboundSender,
        join_token: String,
        reply: oneshot::Sender<Ack<RoomIdAck>>,
    },
    LaunchGame {
        conn: ConnId,
        game_id: String,
        game_url: String,
        reply: oneshot::Sender<Ack<LaunchAck>>,
    },
    CloseGame {
        conn: ConnId,
    },
    ControllerJoin {
        conn: ConnId,
        sender: OutboundSender,
        controller_id: ControllerId,
        nickname: Option<String>,
        reply: oneshot::Sender<Ack<ControllerJoinAck>>,
    },
    ControllerLeave {
        conn: ConnId,
        controller_id: ControllerId,
    },
    ControllerInput {
        conn: ConnId,
        controller_id: ControllerId,
        input: serde_json::Value,
    },
    HostState {
        conn: ConnId,
        game_state: Option<GameState>,
        message: Option<String>,
    },
    HostSystem {
        conn: ConnId,
        command: HostCommand,
    },
    ControllerSystem {
        conn: ConnId,
        controller_id: ControllerId,
        command: ControllerCommand,
    },
    HostSignal {
        conn: ConnId,
        target_id: Option<ControllerId>,
        payload: serde_json::Map<String, serde_json::Value>,
    },
    HostPlaySound {
        conn: ConnId,
        target_controller_id: Option<ControllerId>,
        sound_id: String,
        volume: Option<f64>,
        looped: Option<bool>,
    },
    ControllerPlaySound {
        conn: ConnId,
        controller_id: ControllerId,
        sound_id: String,
        volume: Option<f64>,
        looped: Option<bool>,
    },
    DisconnectMaster {
        conn: ConnId,
    },
    DisconnectChild {
        conn: ConnId,
    },
    DisconnectController {
        conn: ConnId,
        controller_id: ControllerId,
    },
    /// The broker is shutting down: every room drains the same way.
    Shutdown,
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },
    // -- internal, self-scheduled --
    #[doc(hidden)]
    ReplayRoster { child_conn: ConnId, generation: u64 },
    #[doc(hidden)]
    MasterGraceExpired { conn: ConnId, generation: u64 },
}

/// A cheap-to-clone handle to a running room actor.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    tx: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Whether the actor behind this handle is still running.
    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }

    pub async fn send(&self, command: RoomCommand) -> Result<(), crate::RoomError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| crate::RoomError::ActorGone(self.code.clone()))
    }

    pub async fn info(&self) -> Result<RoomInfo, crate::RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| crate::RoomError::ActorGone(self.code.clone()))
    }
}

struct RoomData {
    code: RoomCode,
    master: Option<ConnId>,
    child: Option<ConnId>,
    focus: Focus,
    join_token: Option<JoinToken>,
    active_controller_url: Option<String>,
    game_state: GameState,
    controllers: HashMap<ControllerId, ControllerEntry>,
    max_players: u32,
}

/// Owns a room's state and applies [`RoomCommand`]s one at a time.
pub struct RoomActor {
    data: RoomData,
    senders: HashMap<ConnId, OutboundSender>,
    receiver: mpsc::Receiver<RoomCommand>,
    self_tx: mpsc::Sender<RoomCommand>,
    master_generation: u64,
    child_generation: u64,
}

/// Spawns a new room actor and returns a handle to it.
pub fn spawn_room(code: RoomCode, max_players: u32) -> RoomHandle {
    let (tx, rx) = mpsc::channel(256);
    let actor = RoomActor {
        data: RoomData {
            code: code.clone(),
            master: None,
            child: None,
            focus: Focus::System,
            join_token: None,
            active_controller_url: None,
            game_state: GameState::Paused,
            controllers: HashMap::new(),
            max_players,
        },
        senders: HashMap::new(),
        receiver: rx,
        self_tx: tx.clone(),
        master_generation: 0,
        child_generation: 0,
    };
    tokio::spawn(actor.run());
    RoomHandle { code, tx }
}

impl RoomActor {
    pub async fn run(mut self) {
        tracing::debug!(room = %self.data.code, "room actor started");
        while let Some(command) = self.receiver.recv().await {
            self.apply(command).await;
        }
        tracing::debug!(room = %self.data.code, "room actor stopped");
    }

    async fn apply(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::BecomeMaster { conn, sender, reply } => {
                let ack = self.become_master(conn, sender);
                let _ = reply.send(ack);
            }
            RoomCommand::JoinAsChild { conn, sender, join_token, reply } => {
                let ack = self.join_as_child(conn, sender, &join_token);
                let _ = reply.send(ack);
            }
            RoomCommand::LaunchGame { conn, game_id, game_url, reply } => {
                let ack = self.launch_game(conn, game_id, game_url);
                let _ = reply.send(ack);
            }
            RoomCommand::CloseGame { conn } => self.close_game(conn),
            RoomCommand::ControllerJoin {
                conn,
                sender,
                controller_id,
                nickname,
                reply,
            } => {
                let ack = self.controller_join(conn, sender, controller_id, nickname);
                let _ = reply.send(ack);
            }
            RoomCommand::ControllerLeave { conn, controller_id } => {
                self.controller_leave(conn, controller_id, "left")
            }
            RoomCommand::ControllerInput { conn, controller_id, input } => {
                self.controller_input(conn, controller_id, input)
            }
            RoomCommand::HostState { conn, game_state, message } => {
                self.host_state(conn, game_state, message)
            }
            RoomCommand::HostSystem { conn, command } => self.host_system(conn, command),
            RoomCommand::ControllerSystem { conn, controller_id, command } => {
                self.controller_system(conn, controller_id, command)
            }
            RoomCommand::HostSignal { conn, target_id, payload } => {
                self.host_signal(conn, target_id, payload)
            }
            RoomCommand::HostPlaySound {
                conn,
                target_controller_id,
                sound_id,
                volume,
                looped,
            } => self.host_play_sound(conn, target_controller_id, sound_id, volume, looped),
            RoomCommand::ControllerPlaySound {
                conn,
                controller_id,
                sound_id,
                volume,
                looped,
            } => self.controller_play_sound(conn, controller_id, sound_id, volume, looped),
            RoomCommand::DisconnectMaster { conn } => self.disconnect_master(conn),
            RoomCommand::DisconnectChild { conn } => {
                self.disconnect_child(conn, "Child host disconnected")
            }
            RoomCommand::DisconnectController { conn, controller_id } => {
                self.controller_leave(conn, controller_id, "disconnected")
            }
            RoomCommand::Shutdown => self.shutdown(),
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::ReplayRoster { child_conn, generation } => {
                self.replay_roster(child_conn, generation)
            }
            RoomCommand::MasterGraceExpired { conn, generation } => {
                self.master_grace_expired(conn, generation)
            }
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.data.code.clone(),
            focus: self.data.focus,
            game_state: self.data.game_state,
            controller_count: self.data.controllers.len(),
            max_players: self.data.max_players,
            has_master: self.data.master.is_some(),
            has_child: self.data.child.is_some(),
        }
    }

    fn active_host(&self) -> Option<ConnId> {
        if self.data.focus.is_game() && self.data.child.is_some() {
            self.data.child
        } else {
            self.data.master
        }
    }

    fn send_to(&self, conn: ConnId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&conn) {
            let _ = sender.send(event);
        }
    }

    fn broadcast_group(&self, event: ServerEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }

    fn broadcast_to_controllers_except(&self, exclude: Option<ConnId>, event: ServerEvent) {
        for entry in self.data.controllers.values() {
            if Some(entry.conn) == exclude {
                continue;
            }
            self.send_to(entry.conn, event.clone());
        }
    }

    fn schedule_roster_replay(&self, child_conn: ConnId) {
        let tx = self.self_tx.clone();
        let generation = self.child_generation;
        tokio::spawn(async move {
            tokio::time::sleep(ROSTER_REPLAY_DELAY).await;
            let _ = tx
                .send(RoomCommand::ReplayRoster { child_conn, generation })
                .await;
        });
    }

    fn schedule_grace_timer(&self, conn: ConnId) {
        let tx = self.self_tx.clone();
        let generation = self.master_generation;
        tokio::spawn(async move {
            tokio::time::sleep(GRACE_PERIOD).await;
            let _ = tx
                .send(RoomCommand::MasterGraceExpired { conn, generation })
                .await;
        });
    }

    // -- host:registerSystem / host:register --

    fn become_master(&mut self, conn: ConnId, sender: OutboundSender) -> Ack<RoomIdAck> {
        if let Some(old) = self.data.master {
            if old != conn {
                self.senders.remove(&old);
            }
        }
        self.data.master = Some(conn);
        self.master_generation += 1;
        self.senders.insert(conn, sender);
        tracing::info!(room = %self.data.code, %conn, "master host registered");
        self.broadcast_group(ServerEvent::RoomReady {
            room_id: self.data.code.clone(),
        });
        Ack::ok(RoomIdAck {
            room_id: self.data.code.clone(),
        })
    }

    // -- system:launchGame --

    fn launch_game(&mut self, conn: ConnId, game_id: String, game_url: String) -> Ack<LaunchAck> {
        let _ = game_id;
        if self.data.master != Some(conn) {
            return Ack::err(ErrorCode::Unauthorized, "caller is not the master host");
        }
        if self.data.child.is_some() {
            return Ack::err(
                ErrorCode::AlreadyConnected,
                "a child host is already attached",
            );
        }
        if let Some(existing) = &self.data.join_token {
            // Idempotent: a second launch before any child join returns the
            // existing token without mutating state again.
            return Ack::ok(LaunchAck {
                join_token: existing.as_str().to_string(),
            });
        }
        let token = JoinToken::generate();
        self.data.join_token = Some(token.clone());
        self.data.active_controller_url = Some(game_url.clone());
        self.broadcast_group(ServerEvent::ClientLoadUi { url: game_url });
        Ack::ok(LaunchAck {
            join_token: token.as_str().to_string(),
        })
    }

    // -- host:joinAsChild --

    fn join_as_child(&mut self, conn: ConnId, sender: OutboundSender, join_token: &str) -> Ack<RoomIdAck> {
        match &self.data.join_token {
            Some(expected) if expected.as_str() == join_token => {}
            _ => {
                return Ack::err(ErrorCode::InvalidToken, "join token mismatch");
            }
        }
        self.data.join_token = None;
        self.data.child = Some(conn);
        self.data.focus = Focus::Game;
        self.child_generation += 1;
        self.senders.insert(conn, sender);
        tracing::info!(room = %self.data.code, %conn, "child host attached");
        self.schedule_roster_replay(conn);
        Ack::ok(RoomIdAck {
            room_id: self.data.code.clone(),
        })
    }

    fn replay_roster(&mut self, child_conn: ConnId, generation: u64) {
        if self.data.child != Some(child_conn) || self.child_generation != generation {
            // The child detached or was replaced before the delay elapsed.
            return;
        }
        let controllers: Vec<_> = self
            .data
            .controllers
            .iter()
            .map(|(id, entry)| (id.clone(), entry.profile.clone()))
            .collect();
        for (controller_id, player) in controllers {
            self.send_to(
                child_conn,
                ServerEvent::ControllerJoined {
                    room_id: self.data.code.clone(),
                    controller_id,
                    player,
                },
            );
        }
        self.send_to(
            child_conn,
            ServerEvent::State {
                room_id: self.data.code.clone(),
                state: StateSnapshot {
                    game_state: self.data.game_state,
                },
            },
        );
    }

    // -- system:closeGame --

    fn close_game(&mut self, conn: ConnId) {
        if self.data.master != Some(conn) {
            self.send_to(
                conn,
                ServerEvent::Error {
                    code: ErrorCode::Unauthorized,
                    message: "caller is not the master host".into(),
                },
            );
            return;
        }
        self.detach_child("Game closed by master");
    }

    fn detach_child(&mut self, reason: &str) {
        let _ = reason;
        if let Some(child) = self.data.child.take() {
            self.senders.remove(&child);
        }
        self.data.join_token = None;
        self.data.active_controller_url = None;
        self.data.focus = Focus::System;
        self.broadcast_group(ServerEvent::ClientUnloadUi {});
    }

    // -- controller:join --

    fn controller_join(
        &mut self,
        conn: ConnId,
        sender: OutboundSender,
        controller_id: ControllerId,
        nickname: Option<String>,
    ) -> Ack<ControllerJoinAck> {
        if self.data.controllers.len() >= self.data.max_players as usize
            && !self.data.controllers.contains_key(&controller_id)
        {
            // Not yet in `self.senders` (that only happens on the success
            // path below), so the error has to go out over `sender` directly.
            let _ = sender.send(ServerEvent::Error {
                code: ErrorCode::RoomFull,
                message: "room is full".into(),
            });
            return Ack::err(ErrorCode::RoomFull, "room is full");
        }

        // Reconnect under the same controller id: the old socket is left
        // to be cleaned up by its own disconnect.
        let n = self.data.controllers.len();
        let color = airjam_protocol::palette_color(n);
        let label = nickname.clone().unwrap_or_else(|| format!("Player {n}"));
        let profile = PlayerProfile {
            id: controller_id.clone(),
            label,
            color,
        };

        self.data.controllers.insert(
            controller_id.clone(),
            ControllerEntry {
                conn,
                nickname,
                profile: profile.clone(),
            },
        );
        self.senders.insert(conn, sender);

        if let Some(active_host) = self.active_host() {
            self.send_to(
                active_host,
                ServerEvent::ControllerJoined {
                    room_id: self.data.code.clone(),
                    controller_id: controller_id.clone(),
                    player: profile.clone(),
                },
            );
        }

        self.send_to(
            conn,
            ServerEvent::Welcome {
                controller_id: controller_id.clone(),
                room_id: self.data.code.clone(),
                player: profile,
            },
        );
        self.send_to(
            conn,
            ServerEvent::State {
                room_id: self.data.code.clone(),
                state: StateSnapshot {
                    game_state: self.data.game_state,
                },
            },
        );
        if let Some(url) = self.data.active_controller_url.clone() {
            self.send_to(conn, ServerEvent::ClientLoadUi { url });
        }

        Ack::ok(ControllerJoinAck {
            controller_id,
            room_id: self.data.code.clone(),
        })
    }

    fn controller_leave(&mut self, conn: ConnId, controller_id: ControllerId, _reason: &str) {
        let Some(entry) = self.data.controllers.get(&controller_id) else {
            return;
        };
        if entry.conn != conn {
            // Stale socket from a controller that already reconnected elsewhere.
            return;
        }
        self.data.controllers.remove(&controller_id);
        self.senders.remove(&conn);
        if let Some(active_host) = self.active_host() {
            self.send_to(
                active_host,
                ServerEvent::ControllerLeft {
                    room_id: self.data.code.clone(),
                    controller_id,
                },
            );
        }
    }

    // -- controller:input --

    fn controller_input(&mut self, conn: ConnId, controller_id: ControllerId, input: serde_json::Value) {
        let Some(entry) = self.data.controllers.get(&controller_id) else {
            return;
        };
        if entry.conn != conn {
            return;
        }
        if let Some(active_host) = self.active_host() {
            self.send_to(
                active_host,
                ServerEvent::Input {
                    room_id: self.data.code.clone(),
                    controller_id,
                    input,
                },
            );
        }
    }

    // -- host:state --

    fn host_state(&mut self, conn: ConnId, game_state: Option<GameState>, message: Option<String>) {
        if self.data.master != Some(conn) && self.data.child != Some(conn) {
            self.send_to(
                conn,
                ServerEvent::Error {
                    code: ErrorCode::Unauthorized,
                    message: "caller is not a host of this room".into(),
                },
            );
            return;
        }
        if let Some(message) = message {
            tracing::debug!(room = %self.data.code, message, "host state message (not persisted)");
        }
        if let Some(game_state) = game_state {
            self.data.game_state = game_state;
        }
        self.broadcast_group(ServerEvent::State {
            room_id: self.data.code.clone(),
            state: StateSnapshot {
                game_state: self.data.game_state,
            },
        });
    }

    // -- host:system / controller:system{toggle_pause} --

    fn host_system(&mut self, conn: ConnId, command: HostCommand) {
        if self.data.master != Some(conn) && self.data.child != Some(conn) {
            self.send_to(
                conn,
                ServerEvent::Error {
                    code: ErrorCode::Unauthorized,
                    message: "caller is not a host of this room".into(),
                },
            );
            return;
        }
        match command {
            HostCommand::TogglePause => self.toggle_pause(),
        }
    }

    fn controller_system(&mut self, conn: ConnId, controller_id: ControllerId, command: ControllerCommand) {
        let Some(entry) = self.data.controllers.get(&controller_id) else {
            return;
        };
        if entry.conn != conn {
            return;
        }
        match command {
            ControllerCommand::Exit => {
                self.detach_child("Controller requested exit");
                // Exit force-resets play state; close/disconnect leave it untouched.
                self.data.game_state = GameState::Paused;
                if let Some(master) = self.data.master {
                    self.send_to(
                        master,
                        ServerEvent::CloseChild {
                            room_id: self.data.code.clone(),
                        },
                    );
                }
            }
            ControllerCommand::TogglePause => self.toggle_pause(),
        }
    }

    fn toggle_pause(&mut self) {
        self.data.game_state = match self.data.game_state {
            GameState::Playing => GameState::Paused,
            GameState::Paused => GameState::Playing,
        };
        self.broadcast_group(ServerEvent::State {
            room_id: self.data.code.clone(),
            state: StateSnapshot {
                game_state: self.data.game_state,
            },
        });
    }

    // -- host:signal / host:play_sound / controller:play_sound --

    fn host_signal(
        &mut self,
        conn: ConnId,
        target_id: Option<ControllerId>,
        payload: serde_json::Map<String, serde_json::Value>,
    ) {
        if self.data.master != Some(conn) && self.data.child != Some(conn) {
            return;
        }
        let event = ServerEvent::Signal {
            room_id: self.data.code.clone(),
            sender_controller_id: None,
            payload,
        };
        match target_id {
            Some(id) => {
                if let Some(entry) = self.data.controllers.get(&id) {
                    self.send_to(entry.conn, event);
                }
            }
            None => self.broadcast_to_controllers_except(Some(conn), event),
        }
    }

    fn host_play_sound(
        &mut self,
        conn: ConnId,
        target_controller_id: Option<ControllerId>,
        sound_id: String,
        volume: Option<f64>,
        looped: Option<bool>,
    ) {
        if self.data.master != Some(conn) && self.data.child != Some(conn) {
            return;
        }
        let event = ServerEvent::PlaySound {
            id: sound_id,
            volume,
            looped,
        };
        match target_controller_id {
            Some(id) => {
                if let Some(entry) = self.data.controllers.get(&id) {
                    self.send_to(entry.conn, event);
                }
            }
            None => self.broadcast_to_controllers_except(Some(conn), event),
        }
    }

    fn controller_play_sound(
        &mut self,
        conn: ConnId,
        controller_id: ControllerId,
        sound_id: String,
        volume: Option<f64>,
        looped: Option<bool>,
    ) {
        let Some(entry) = self.data.controllers.get(&controller_id) else {
            return;
        };
        if entry.conn != conn {
            return;
        }
        if let Some(active_host) = self.active_host() {
            self.send_to(
                active_host,
                ServerEvent::PlaySound {
                    id: sound_id,
                    volume,
                    looped,
                },
            );
        }
    }

    // -- disconnects --

    fn disconnect_master(&mut self, conn: ConnId) {
        if self.data.master != Some(conn) {
            return;
        }
        tracing::info!(room = %self.data.code, %conn, "master disconnected, starting grace period");
        self.schedule_grace_timer(conn);
    }

    fn master_grace_expired(&mut self, conn: ConnId, generation: u64) {
        if self.data.master != Some(conn) || self.master_generation != generation {
            // A takeover happened in the meantime; the room survives.
            return;
        }
        tracing::info!(room = %self.data.code, "master grace period elapsed, tearing down room");
        self.broadcast_group(ServerEvent::HostLeft {
            room_id: self.data.code.clone(),
            reason: "Host disconnected".into(),
        });
        self.senders.clear();
        self.receiver.close();
    }

    fn disconnect_child(&mut self, conn: ConnId, reason: &str) {
        if self.data.child != Some(conn) {
            return;
        }
        tracing::info!(room = %self.data.code, %conn, "child host disconnected");
        self.detach_child(reason);
    }

    fn shutdown(&mut self) {
        self.broadcast_group(ServerEvent::HostLeft {
            room_id: self.data.code.clone(),
            reason: "shutdown".into(),
        });
        self.senders.clear();
        self.receiver.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn outbound() -> (OutboundSender, mpsc::UnboundedReceiver<ServerEvent>) {
        unbounded_channel()
    }

    #[tokio::test]
    async fn become_master_then_launch_then_join_as_child() {
        let handle = spawn_room(RoomCode::new("ABCD").unwrap(), DEFAULT_MAX_PLAYERS_SYSTEM);
        let (master_tx, mut master_rx) = outbound();
        let master_conn = ConnId::new(1);

        let (reply_tx, reply_rx) = oneshot::channel();
        handle
            .send(RoomCommand::BecomeMaster {
                conn: master_conn,
                sender: master_tx,
                reply: reply_tx,
            })
            .await
            .unwrap();
        let ack = reply_rx.await.unwrap();
        assert!(ack.is_ok());
        assert!(matches!(master_rx.recv().await, Some(ServerEvent::RoomReady { .. })));

        let (reply_tx, reply_rx) = oneshot::channel();
        handle
            .send(RoomCommand::LaunchGame {
                conn: master_conn,
                game_id: "g1".into(),
                game_url: "https://g/x".into(),
                reply: reply_tx,
            })
            .await
            .unwrap();
        let ack = reply_rx.await.unwrap();
        let Ack::Ok(ok) = ack else { panic!("expected ok ack") };
        let token = ok.data.join_token;
        assert!(matches!(master_rx.recv().await, Some(ServerEvent::ClientLoadUi { .. })));

        let (child_tx, mut child_rx) = outbound();
        let child_conn = ConnId::new(2);
        let (reply_tx, reply_rx) = oneshot::channel();
        handle
            .send(RoomCommand::JoinAsChild {
                conn: child_conn,
                sender: child_tx,
                join_token: token,
                reply: reply_tx,
            })
            .await
            .unwrap();
        assert!(reply_rx.await.unwrap().is_ok());

        let info = handle.info().await.unwrap();
        assert!(info.has_child);
        assert_eq!(info.focus, Focus::Game);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(matches!(child_rx.recv().await, Some(ServerEvent::State { .. })));
    }

    #[tokio::test]
    async fn room_full_rejects_extra_controller() {
        let handle = spawn_room(RoomCode::new("FULL").unwrap(), 1);
        let (tx1, _rx1) = outbound();
        let (reply_tx, reply_rx) = oneshot::channel();
        handle
            .send(RoomCommand::ControllerJoin {
                conn: ConnId::new(1),
                sender: tx1,
                controller_id: ControllerId::new("c-1"),
                nickname: None,
                reply: reply_tx,
            })
            .await
            .unwrap();
        assert!(reply_rx.await.unwrap().is_ok());

        let (tx2, _rx2) = outbound();
        let (reply_tx, reply_rx) = oneshot::channel();
        handle
            .send(RoomCommand::ControllerJoin {
                conn: ConnId::new(2),
                sender: tx2,
                controller_id: ControllerId::new("c-2"),
                nickname: None,
                reply: reply_tx,
            })
            .await
            .unwrap();
        let ack = reply_rx.await.unwrap();
        assert!(!ack.is_ok());
    }
}
