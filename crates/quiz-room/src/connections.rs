use dashmap::DashMap;
use quiz_protocol::{ConnectionId, PlayerId, Role, RoomCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionBinding {
    pub room_code: RoomCode,
    pub role: Role,
    pub player_id: Option<PlayerId>,
}

/// Concurrent connection-id -> binding map. A rebind overwrites the
/// previous entry atomically (via `DashMap::insert`); callers needing to
/// react to what a connection *was* bound to should read before they bind.
#[derive(Debug, Default)]
pub struct ConnectionIndex {
    bindings: DashMap<ConnectionId, ConnectionBinding>,
}

impl ConnectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_host(&self, conn: ConnectionId, room_code: RoomCode) {
        self.bindings.insert(
            conn,
            ConnectionBinding {
                room_code,
                role: Role::Host,
                player_id: None,
            },
        );
    }

    pub fn bind_player(&self, conn: ConnectionId, room_code: RoomCode, player_id: PlayerId) {
        self.bindings.insert(
            conn,
            ConnectionBinding {
                room_code,
                role: Role::Player,
                player_id: Some(player_id),
            },
        );
    }

    pub fn unbind(&self, conn: ConnectionId) -> Option<ConnectionBinding> {
        self.bindings.remove(&conn).map(|(_, v)| v)
    }

    pub fn get(&self, conn: ConnectionId) -> Option<ConnectionBinding> {
        self.bindings.get(&conn).map(|e| e.clone())
    }

    pub fn list_for_room(&self, room_code: &RoomCode) -> Vec<ConnectionId> {
        self.bindings
            .iter()
            .filter(|entry| &entry.value().room_code == room_code)
            .map(|entry| *entry.key())
            .collect()
    }
}
