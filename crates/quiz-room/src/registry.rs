use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use quiz_content::ContentProvider;
use quiz_engine::{Clock, EngineConfig};
use quiz_protocol::RoomCode;

use crate::actor::spawn_room;
use crate::broadcast::Broadcaster;
use crate::config::RoomConfig;
use crate::handle::RoomHandle;
use crate::room_state::Room;

/// Retries code generation this many times before giving up; at four
/// alphanumeric characters from a 31-symbol alphabet collisions this
/// persistent would indicate something is badly wrong with the RNG.
const MAX_CODE_ATTEMPTS: usize = 20;

/// Every live room, keyed by its code, plus what a freshly created room
/// needs wired in. One registry per server process.
pub struct RoomRegistry {
    rooms: DashMap<RoomCode, RoomHandle>,
    content: Arc<dyn ContentProvider>,
    engine_cfg: EngineConfig,
    clock: Arc<dyn Clock>,
    broadcaster: Arc<dyn Broadcaster>,
    room_config: RoomConfig,
}

impl RoomRegistry {
    pub fn new(
        content: Arc<dyn ContentProvider>,
        engine_cfg: EngineConfig,
        clock: Arc<dyn Clock>,
        broadcaster: Arc<dyn Broadcaster>,
        room_config: RoomConfig,
    ) -> Self {
        Self {
            rooms: DashMap::new(),
            content,
            engine_cfg,
            clock,
            broadcaster,
            room_config,
        }
    }

    /// Generates a fresh, currently-unused room code and spawns its actor.
    pub fn create(&self) -> RoomHandle {
        let mut rng = rand::rng();
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = quiz_protocol::room_code::generate(&mut rng);
            if let Entry::Vacant(slot) = self.rooms.entry(code.clone()) {
                let room = Room::new(code.clone(), self.room_config.max_players, self.clock.now());
                let sender = spawn_room(room, self.content.clone(), self.engine_cfg.clone(), self.clock.clone(), self.broadcaster.clone());
                let handle = RoomHandle::new(code, sender);
                slot.insert(handle.clone());
                return handle;
            }
        }
        panic!("exhausted {MAX_CODE_ATTEMPTS} room code attempts without finding a free one");
    }

    pub fn get(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.get(code).map(|e| e.clone())
    }

    pub fn remove(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms.remove(code).map(|(_, v)| v)
    }

    pub fn all(&self) -> Vec<RoomHandle> {
        self.rooms.iter().map(|e| e.value().clone()).collect()
    }
}
