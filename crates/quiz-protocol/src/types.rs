use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PlayerId, RoomCode};

/// The role a connection is bound to within its room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Role {
    Host,
    Player,
}

/// Inbound messages a connection may send, internally tagged so the raw
/// JSON carries an explicit `type` discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    RegisterHost {
        code: RoomCode,
    },
    JoinRoom {
        code: RoomCode,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "displayName")]
        display_name: String,
    },
    LeaveRoom {
        code: RoomCode,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    SetRoomLocked {
        code: RoomCode,
        #[serde(rename = "isLocked")]
        is_locked: bool,
    },
    StartGame {
        code: RoomCode,
        #[serde(rename = "gameType")]
        game_type: String,
    },
    SelectCategory {
        code: RoomCode,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        category: String,
    },
    SubmitAnswer {
        code: RoomCode,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        #[serde(rename = "optionKey")]
        option_key: String,
    },
    SubmitRankingVote {
        code: RoomCode,
        #[serde(rename = "voterId")]
        voter_id: PlayerId,
        #[serde(rename = "votedForId")]
        voted_for_id: PlayerId,
    },
    NextQuestion {
        code: RoomCode,
    },
}

/// Outbound messages the server pushes to one or more connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    LobbyUpdated { room: RoomSnapshot },
    QuizStateUpdated { quiz: QuizSnapshot },
    GameStarted { session: GameSessionInfo },
    Error { error: ErrorDto },
}

/// Every inbound command travels in one of these; `seq` is assigned by the
/// sender and is only used for client-side diagnostics, never relied on by
/// the server for ordering (the transport already delivers in order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEnvelope {
    pub seq: u64,
    pub payload: ClientCommand,
}

/// Every outbound push travels in one of these; `timestamp` is assigned at
/// send time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerEnvelope {
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub payload: ServerEvent,
}

impl ServerEnvelope {
    pub fn new(seq: u64, timestamp: DateTime<Utc>, payload: ServerEvent) -> Self {
        Self {
            seq,
            timestamp,
            payload,
        }
    }
}

/// Status of a room, independent of whether a game is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RoomStatus {
    Lobby,
    InGame,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub connected: bool,
    pub score: u32,
    #[serde(rename = "isBot")]
    pub is_bot: bool,
}

/// The lobby-level view of a room, broadcast on every visible mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub status: RoomStatus,
    pub locked: bool,
    #[serde(rename = "maxPlayers")]
    pub max_players: u32,
    #[serde(rename = "hasHost")]
    pub has_host: bool,
    pub players: Vec<PlayerSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSessionInfo {
    pub code: RoomCode,
    #[serde(rename = "gameType")]
    pub game_type: String,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
}

/// The quiz-level view broadcast during and after a game; `remainingSeconds`
/// is computed fresh at emission time from `phaseEndsUtc` and the caller's
/// clock, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSnapshot {
    pub phase: String,
    #[serde(rename = "remainingSeconds")]
    pub remaining_seconds: u64,
    #[serde(rename = "roundNumber")]
    pub round_number: u32,
    #[serde(rename = "roundType")]
    pub round_type: String,
    #[serde(rename = "leaderPlayerId")]
    pub leader_player_id: Option<PlayerId>,
    pub category: Option<String>,
    #[serde(rename = "availableCategories")]
    pub available_categories: Option<Vec<String>>,
    pub question: Option<QuestionView>,
    pub scoreboard: Option<Vec<ScoreboardEntryView>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    pub options: Vec<(String, String)>,
    #[serde(rename = "correctOptionKey", skip_serializing_if = "Option::is_none")]
    pub correct_option_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(rename = "hasAnswered")]
    pub has_answered: Vec<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreboardEntryView {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub score: u32,
    pub position: u32,
    #[serde(rename = "answeredCorrectly", skip_serializing_if = "Option::is_none")]
    pub answered_correctly: Option<bool>,
    #[serde(rename = "selectedOption", skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<String>,
    #[serde(rename = "pointsThisQuestion", skip_serializing_if = "Option::is_none")]
    pub points_this_question: Option<u32>,
    #[serde(rename = "speedBonus")]
    pub speed_bonus: bool,
    #[serde(rename = "rankingStar")]
    pub ranking_star: bool,
    #[serde(rename = "rankingVotesReceived")]
    pub ranking_votes_received: u32,
}

/// Error kinds carried to clients on the command's reply channel only,
/// never broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    RoomNotFound,
    RoomLocked,
    RoomFull,
    NameInvalid,
    NameTaken,
    AlreadyHost,
    NotHost,
    NotRoundLeader,
    RoundAlreadyStarted,
    InvalidCategory,
    InvalidState,
    NotEnoughPlayers,
    PlayerNoped,
    BoosterBlockedByShield,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub code: ErrorCode,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid() -> PlayerId {
        PlayerId(uuid::Uuid::nil())
    }

    #[test]
    fn test_join_room_command_json_shape() {
        let cmd = ClientCommand::JoinRoom {
            code: RoomCode::normalize("abcd"),
            player_id: pid(),
            display_name: "Alice".into(),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "JoinRoom");
        assert_eq!(json["displayName"], "Alice");
    }

    #[test]
    fn test_client_command_round_trips() {
        let cmd = ClientCommand::SubmitAnswer {
            code: RoomCode::normalize("wxyz"),
            player_id: pid(),
            option_key: "B".into(),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let back: ClientCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, back);
    }

    #[test]
    fn test_error_dto_uses_screaming_snake_case_code() {
        let dto = ErrorDto {
            code: ErrorCode::NameTaken,
            message: "taken".into(),
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["code"], "NAME_TAKEN");
    }

    #[test]
    fn test_decode_unknown_command_type_returns_error() {
        let raw = r#"{"type":"NotACommand"}"#;
        let result: Result<ClientCommand, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_garbage_returns_error() {
        let result: Result<ClientEnvelope, _> = serde_json::from_str("not json");
        assert!(result.is_err());
    }

    #[test]
    fn test_server_event_error_variant_round_trips() {
        let ev = ServerEvent::Error {
            error: ErrorDto {
                code: ErrorCode::RoomFull,
                message: "full".into(),
            },
        };
        let json = serde_json::to_string(&ev).unwrap();
        let back: ServerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
