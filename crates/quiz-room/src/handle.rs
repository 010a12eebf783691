use std::time::Duration;

use quiz_protocol::{ConnectionId, PlayerId, RoomCode, RoomSnapshot};
use tokio::sync::{mpsc, oneshot};

use crate::command::RoomCommand;
use crate::error::RoomError;

/// Cheaply cloneable front door to a room's actor. Every method round-trips
/// through the actor's mailbox so callers never see partial mutation.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn new(code: RoomCode, sender: mpsc::Sender<RoomCommand>) -> Self {
        Self { code, sender }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    async fn call<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> RoomCommand) -> T {
        let (reply, rx) = oneshot::channel();
        let _ = self.sender.send(build(reply)).await;
        rx.await.expect("room actor dropped reply channel before answering")
    }

    pub async fn register_host(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.call(|reply| RoomCommand::RegisterHost { conn, reply }).await
    }

    pub async fn join_room(&self, conn: ConnectionId, player_id: PlayerId, display_name: String) -> Result<(), RoomError> {
        self.call(|reply| RoomCommand::JoinRoom {
            conn,
            player_id,
            display_name,
            reply,
        })
        .await
    }

    pub async fn leave_room(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.call(|reply| RoomCommand::LeaveRoom { player_id, reply }).await
    }

    pub async fn handle_disconnect(&self, conn: ConnectionId) {
        let _ = self.sender.send(RoomCommand::HandleDisconnect { conn }).await;
    }

    pub async fn set_room_locked(&self, conn: ConnectionId, locked: bool) -> Result<(), RoomError> {
        self.call(|reply| RoomCommand::SetRoomLocked { conn, locked, reply }).await
    }

    pub async fn start_game(&self, conn: ConnectionId, game_type: String) -> Result<(), RoomError> {
        self.call(|reply| RoomCommand::StartGame { conn, game_type, reply }).await
    }

    pub async fn select_category(&self, player_id: PlayerId, category: String) -> Result<(), RoomError> {
        self.call(|reply| RoomCommand::SelectCategory { player_id, category, reply }).await
    }

    pub async fn submit_answer(&self, player_id: PlayerId, option_key: String) -> Result<(), RoomError> {
        self.call(|reply| RoomCommand::SubmitAnswer { player_id, option_key, reply }).await
    }

    pub async fn submit_ranking_vote(&self, voter_id: PlayerId, voted_for_id: PlayerId) -> Result<(), RoomError> {
        self.call(|reply| RoomCommand::SubmitRankingVote { voter_id, voted_for_id, reply }).await
    }

    pub async fn next_question(&self, conn: ConnectionId) -> Result<(), RoomError> {
        self.call(|reply| RoomCommand::NextQuestion { conn, reply }).await
    }

    pub async fn snapshot(&self) -> RoomSnapshot {
        self.call(|reply| RoomCommand::GetSnapshot { reply }).await
    }

    pub async fn remove_disconnected_players(&self, grace: Duration) -> usize {
        self.call(|reply| RoomCommand::RemoveDisconnectedPlayers { grace, reply }).await
    }

    pub async fn is_hostless(&self, ttl: Duration) -> bool {
        self.call(|reply| RoomCommand::IsHostless { ttl, reply }).await
    }

    pub async fn shutdown(&self) {
        let _ = self.sender.send(RoomCommand::Shutdown).await;
    }
}
