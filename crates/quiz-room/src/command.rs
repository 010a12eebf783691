use quiz_engine::Phase;
use quiz_protocol::{ConnectionId, PlayerId, RoomSnapshot};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::error::RoomError;

type Reply = oneshot::Sender<Result<(), RoomError>>;

/// Everything a room actor can be asked to do. Every lobby- and game-level
/// mutation travels through this one mailbox, which is what gives a room
/// its single critical section.
pub enum RoomCommand {
    RegisterHost {
        conn: ConnectionId,
        reply: Reply,
    },
    JoinRoom {
        conn: ConnectionId,
        player_id: PlayerId,
        display_name: String,
        reply: Reply,
    },
    LeaveRoom {
        player_id: PlayerId,
        reply: Reply,
    },
    HandleDisconnect {
        conn: ConnectionId,
    },
    SetRoomLocked {
        conn: ConnectionId,
        locked: bool,
        reply: Reply,
    },
    StartGame {
        conn: ConnectionId,
        game_type: String,
        reply: Reply,
    },
    SelectCategory {
        player_id: PlayerId,
        category: String,
        reply: Reply,
    },
    SubmitAnswer {
        player_id: PlayerId,
        option_key: String,
        reply: Reply,
    },
    SubmitRankingVote {
        voter_id: PlayerId,
        voted_for_id: PlayerId,
        reply: Reply,
    },
    NextQuestion {
        conn: ConnectionId,
        reply: Reply,
    },
    /// Self-sent when a scheduled phase timer fires. Ignored unless both the
    /// phase and the generation it was scheduled under still match, so a
    /// timer outlived by a faster player-driven transition is a no-op.
    PhaseTimeout {
        phase: Phase,
        generation: u64,
    },
    GetSnapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
    RemoveDisconnectedPlayers {
        grace: Duration,
        reply: oneshot::Sender<usize>,
    },
    IsHostless {
        ttl: Duration,
        reply: oneshot::Sender<bool>,
    },
    Shutdown,
}
