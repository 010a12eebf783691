use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quiz_protocol::{ConnectionId, PlayerId, PlayerSnapshot, RoomCode, RoomSnapshot, RoomStatus};

use crate::error::RoomError;

pub const MAX_DISPLAY_NAME_LEN: usize = 20;

/// Trims and validates a display name per the lobby contract: non-empty,
/// at most 20 characters after trimming.
pub fn validate_display_name(raw: &str) -> Result<String, RoomError> {
    let trimmed = raw.trim().to_string();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(RoomError::NameInvalid(format!(
            "name must be 1..{MAX_DISPLAY_NAME_LEN} characters, got {}",
            trimmed.chars().count()
        )));
    }
    Ok(trimmed)
}

#[derive(Debug, Clone)]
pub struct Player {
    pub player_id: PlayerId,
    pub display_name: String,
    pub connection_id: Option<ConnectionId>,
    pub connected: bool,
    pub last_seen: DateTime<Utc>,
    pub score: u32,
    pub is_bot: bool,
    pub bot_skill: Option<u8>,
}

impl Player {
    pub fn new(player_id: PlayerId, display_name: String, connection_id: ConnectionId, now: DateTime<Utc>) -> Self {
        Self {
            player_id,
            display_name,
            connection_id: Some(connection_id),
            connected: true,
            last_seen: now,
            score: 0,
            is_bot: false,
            bot_skill: None,
        }
    }

    pub fn to_snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            player_id: self.player_id,
            display_name: self.display_name.clone(),
            connected: self.connected,
            score: self.score,
            is_bot: self.is_bot,
        }
    }
}

/// Authoritative lobby-level record for one room, mutated only from inside
/// that room's actor task.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: RoomCode,
    pub created_at: DateTime<Utc>,
    pub status: RoomStatus,
    pub locked: bool,
    pub max_players: u32,
    pub host_connection: Option<ConnectionId>,
    pub host_disconnected_at: Option<DateTime<Utc>>,
    pub players: HashMap<PlayerId, Player>,
    pub game_type: Option<String>,
}

impl Room {
    pub fn new(code: RoomCode, max_players: u32, now: DateTime<Utc>) -> Self {
        Self {
            code,
            created_at: now,
            status: RoomStatus::Lobby,
            locked: false,
            max_players,
            host_connection: None,
            host_disconnected_at: None,
            players: HashMap::new(),
            game_type: None,
        }
    }

    pub fn name_taken(&self, name: &str, excluding: Option<PlayerId>) -> bool {
        self.players
            .values()
            .filter(|p| Some(p.player_id) != excluding)
            .any(|p| p.display_name.eq_ignore_ascii_case(name))
    }

    pub fn to_snapshot(&self) -> RoomSnapshot {
        let mut players: Vec<PlayerSnapshot> = self.players.values().map(Player::to_snapshot).collect();
        players.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        RoomSnapshot {
            code: self.code.clone(),
            status: self.status,
            locked: self.locked,
            max_players: self.max_players,
            has_host: self.host_connection.is_some(),
            players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_display_name_trims_whitespace() {
        assert_eq!(validate_display_name("  Alice  ").unwrap(), "Alice");
    }

    #[test]
    fn test_validate_display_name_rejects_empty_after_trim() {
        assert!(validate_display_name("   ").is_err());
    }

    #[test]
    fn test_validate_display_name_accepts_exactly_twenty_chars() {
        let name = "a".repeat(20);
        assert!(validate_display_name(&name).is_ok());
    }

    #[test]
    fn test_validate_display_name_rejects_twenty_one_chars() {
        let name = "a".repeat(21);
        assert!(validate_display_name(&name).is_err());
    }

    #[test]
    fn test_room_name_taken_is_case_insensitive() {
        let code = RoomCode::normalize("abcd");
        let mut room = Room::new(code, 8, Utc::now());
        let pid = PlayerId::new();
        room.players.insert(
            pid,
            Player::new(pid, "Alice".into(), ConnectionId(1), Utc::now()),
        );
        assert!(room.name_taken("alice", None));
        assert!(!room.name_taken("alice", Some(pid)));
    }

    #[test]
    fn test_room_snapshot_orders_players_by_name() {
        let code = RoomCode::normalize("abcd");
        let mut room = Room::new(code, 8, Utc::now());
        let p1 = PlayerId::new();
        let p2 = PlayerId::new();
        room.players.insert(p1, Player::new(p1, "Zed".into(), ConnectionId(1), Utc::now()));
        room.players.insert(p2, Player::new(p2, "Amy".into(), ConnectionId(2), Utc::now()));
        let snapshot = room.to_snapshot();
        assert_eq!(snapshot.players[0].display_name, "Amy");
        assert_eq!(snapshot.players[1].display_name, "Zed");
    }
}
