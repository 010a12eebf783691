//! Per-connection handler: decode inbound envelopes, dispatch to the
//! addressed room, and drain that connection's outbound channel back onto
//! the socket. Each accepted connection gets its own pair of tasks (reader
//! + writer) sharing one [`WebSocketConnection`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use quiz_protocol::{ClientCommand, ClientEnvelope, Codec, JsonCodec, RoomCode, ServerEnvelope, ServerEvent};
use quiz_room::{Broadcaster, RoomError, RoomHandle};
use quiz_transport::{Connection, WebSocketConnection};

use crate::error::ServerError;
use crate::AppState;

const IDLE_TIMEOUT: Duration = Duration::from_secs(120);

pub async fn handle_connection(conn: WebSocketConnection, state: Arc<AppState>) -> Result<(), ServerError> {
    let conn_id = conn.id();
    let conn = Arc::new(conn);
    let mut outbound_rx = state.outbound.register(conn_id);

    let writer_conn = conn.clone();
    let writer = tokio::spawn(async move {
        let codec = JsonCodec;
        let mut seq: u64 = 0;
        while let Some(event) = outbound_rx.recv().await {
            seq += 1;
            let envelope = ServerEnvelope::new(seq, Utc::now(), event);
            let Ok(bytes) = codec.encode(&envelope) else { continue };
            if writer_conn.send(&bytes).await.is_err() {
                break;
            }
        }
    });

    let codec = JsonCodec;
    loop {
        let data = match tokio::time::timeout(IDLE_TIMEOUT, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%conn_id, "connection idle timeout");
                break;
            }
        };

        let envelope: ClientEnvelope = match codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode envelope");
                continue;
            }
        };

        if let Err(err) = dispatch(&state, conn_id, envelope.payload).await {
            state.outbound.send(conn_id, ServerEvent::Error { error: err.into_dto() });
        }
    }

    writer.abort();
    cleanup_connection(&state, conn_id).await;
    Ok(())
}

async fn dispatch(state: &Arc<AppState>, conn_id: quiz_protocol::ConnectionId, cmd: ClientCommand) -> Result<(), RoomError> {
    match cmd {
        ClientCommand::RegisterHost { code } => {
            let handle = room_for(state, &code)?;
            handle.register_host(conn_id).await?;
            state.connections.bind_host(conn_id, code);
        }
        ClientCommand::JoinRoom { code, player_id, display_name } => {
            let handle = room_for(state, &code)?;
            handle.join_room(conn_id, player_id, display_name).await?;
            state.connections.bind_player(conn_id, code, player_id);
        }
        ClientCommand::LeaveRoom { code, player_id } => {
            let handle = room_for(state, &code)?;
            handle.leave_room(player_id).await?;
            state.connections.unbind(conn_id);
        }
        ClientCommand::SetRoomLocked { code, is_locked } => {
            room_for(state, &code)?.set_room_locked(conn_id, is_locked).await?;
        }
        ClientCommand::StartGame { code, game_type } => {
            room_for(state, &code)?.start_game(conn_id, game_type).await?;
        }
        ClientCommand::SelectCategory { code, player_id, category } => {
            room_for(state, &code)?.select_category(player_id, category).await?;
        }
        ClientCommand::SubmitAnswer { code, player_id, option_key } => {
            room_for(state, &code)?.submit_answer(player_id, option_key).await?;
        }
        ClientCommand::SubmitRankingVote { code, voter_id, voted_for_id } => {
            room_for(state, &code)?.submit_ranking_vote(voter_id, voted_for_id).await?;
        }
        ClientCommand::NextQuestion { code } => {
            room_for(state, &code)?.next_question(conn_id).await?;
        }
    }
    Ok(())
}

fn room_for(state: &Arc<AppState>, code: &RoomCode) -> Result<RoomHandle, RoomError> {
    state.registry.get(code).ok_or_else(|| RoomError::NotFound(code.clone()))
}

async fn cleanup_connection(state: &Arc<AppState>, conn_id: quiz_protocol::ConnectionId) {
    if let Some(binding) = state.connections.get(conn_id) {
        if let Some(handle) = state.registry.get(&binding.room_code) {
            handle.handle_disconnect(conn_id).await;
        }
        state.connections.unbind(conn_id);
    }
    state.outbound.unregister(conn_id);
}
