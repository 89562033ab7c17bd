//! The room registry: tracks every live room plus the auxiliary,
//! non-authoritative indices the router needs to resolve a bare `ConnId`
//! back to its room (e.g. on socket close). The registry itself never
//! mutates room state directly — it only creates actors and forwards
//! commands to them.

use std::collections::HashMap;

use airjam_protocol::{ControllerId, RoomCode};
use rand::RngCore;

use crate::conn::ConnId;
use crate::room::{
    spawn_room, RoomHandle, DEFAULT_MAX_PLAYERS_STANDALONE, DEFAULT_MAX_PLAYERS_SYSTEM,
};

const GENERATED_CODE_LEN: usize = 6;

/// Registry of live rooms plus host/controller connection indices.
///
/// The indices are derived, not authoritative: a room actor's own state is
/// always the source of truth for who is currently attached to it. They
/// exist purely so the router can answer "which room was this connection
/// in?" without asking every room actor.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
    host_index: HashMap<ConnId, RoomCode>,
    controller_index: HashMap<ConnId, (RoomCode, ControllerId)>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a room, pruning it from the registry first if its actor has
    /// already exited (the only way a room ever disappears).
    pub fn get_room(&mut self, code: &RoomCode) -> Option<RoomHandle> {
        let alive = self.rooms.get(code).map(|h| h.is_alive()).unwrap_or(false);
        if !alive {
            self.rooms.remove(code);
            return None;
        }
        self.rooms.get(code).cloned()
    }

    /// Returns the room for `code`, creating it (with `max_players`) if it
    /// doesn't already exist or its previous actor has exited.
    fn get_or_create_room(&mut self, code: RoomCode, max_players: u32) -> RoomHandle {
        if let Some(handle) = self.get_room(&code) {
            return handle;
        }
        let handle = spawn_room(code.clone(), max_players);
        self.rooms.insert(code, handle.clone());
        handle
    }

    /// Resolves the room a `host:registerSystem` call should target,
    /// creating it with the system default capacity if new.
    pub fn room_for_system_register(&mut self, code: RoomCode) -> RoomHandle {
        self.get_or_create_room(code, DEFAULT_MAX_PLAYERS_SYSTEM)
    }

    /// Resolves the room a legacy `host:register` call should target,
    /// creating it with the standalone default capacity (or the caller's
    /// override) if new.
    pub fn room_for_legacy_register(&mut self, code: RoomCode, max_players: Option<u32>) -> RoomHandle {
        self.get_or_create_room(code, max_players.unwrap_or(DEFAULT_MAX_PLAYERS_STANDALONE))
    }

    /// Generates a fresh, currently-unused room code.
    pub fn generate_room_code(&mut self) -> RoomCode {
        loop {
            let mut bytes = [0u8; GENERATED_CODE_LEN];
            rand::rng().fill_bytes(&mut bytes);
            let code = RoomCode::generate(GENERATED_CODE_LEN, bytes.into_iter());
            if self.get_room(&code).is_none() {
                return code;
            }
        }
    }

    pub fn set_host(&mut self, conn: ConnId, code: RoomCode) {
        self.host_index.insert(conn, code);
    }

    pub fn host_room(&self, conn: ConnId) -> Option<RoomCode> {
        self.host_index.get(&conn).cloned()
    }

    pub fn delete_host(&mut self, conn: ConnId) -> Option<RoomCode> {
        self.host_index.remove(&conn)
    }

    pub fn set_controller(&mut self, conn: ConnId, code: RoomCode, controller_id: ControllerId) {
        self.controller_index.insert(conn, (code, controller_id));
    }

    pub fn controller_info(&self, conn: ConnId) -> Option<(RoomCode, ControllerId)> {
        self.controller_index.get(&conn).cloned()
    }

    pub fn delete_controller(&mut self, conn: ConnId) -> Option<(RoomCode, ControllerId)> {
        self.controller_index.remove(&conn)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Signals every live room to drain for process shutdown.
    pub async fn shutdown_all(&mut self) {
        for handle in self.rooms.values() {
            let _ = handle.send(crate::room::RoomCommand::Shutdown).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_or_create_is_idempotent_for_a_live_room() {
        let mut registry = RoomRegistry::new();
        let code = RoomCode::new("ABCD").unwrap();
        let a = registry.room_for_system_register(code.clone());
        let b = registry.room_for_system_register(code);
        assert_eq!(a.code(), b.code());
    }

    #[tokio::test]
    async fn generated_codes_are_unique_on_collision_retry() {
        let mut registry = RoomRegistry::new();
        let code = registry.generate_room_code();
        assert!(!code.as_str().is_empty());
    }

    #[test]
    fn host_index_round_trips() {
        let mut registry = RoomRegistry::new();
        let conn = ConnId::new(1);
        let code = RoomCode::new("ABCD").unwrap();
        registry.set_host(conn, code.clone());
        assert_eq!(registry.host_room(conn), Some(code.clone()));
        assert_eq!(registry.delete_host(conn), Some(code));
        assert_eq!(registry.host_room(conn), None);
    }
}
