use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Utc;
use quiz_content::ContentProvider;
use quiz_engine::{self as engine, Clock, EngineConfig, EnginePlayer, Phase, RoundType};
use quiz_protocol::{ConnectionId, GameSessionInfo, RoomStatus, ServerEvent};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::command::RoomCommand;
use crate::room_state::{validate_display_name, Player, Room};
use crate::{broadcast::Broadcaster, error::RoomError, views};

const MAILBOX_CAPACITY: usize = 256;

/// The single critical section for one room: lobby membership and the quiz
/// state machine are mutated from nowhere else. Every public operation is a
/// message drained from `receiver`; the task that owns this struct is the
/// only writer.
pub struct RoomActor {
    room: Room,
    quiz: Option<engine::QuizGameState>,
    content: Arc<dyn ContentProvider>,
    engine_cfg: EngineConfig,
    clock: Arc<dyn Clock>,
    broadcaster: Arc<dyn Broadcaster>,
    self_sender: mpsc::Sender<RoomCommand>,
    receiver: mpsc::Receiver<RoomCommand>,
    timer_handle: Option<AbortHandle>,
    timer_generation: u64,
    active_generation: u64,
    next_seq: u64,
}

impl RoomActor {
    fn spawn_internal(
        room: Room,
        content: Arc<dyn ContentProvider>,
        engine_cfg: EngineConfig,
        clock: Arc<dyn Clock>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> mpsc::Sender<RoomCommand> {
        let (sender, receiver) = mpsc::channel(MAILBOX_CAPACITY);
        let actor = RoomActor {
            room,
            quiz: None,
            content,
            engine_cfg,
            clock,
            broadcaster,
            self_sender: sender.clone(),
            receiver,
            timer_handle: None,
            timer_generation: 0,
            active_generation: 0,
            next_seq: 0,
        };
        tokio::spawn(actor.run());
        sender
    }

    async fn run(mut self) {
        while let Some(command) = self.receiver.recv().await {
            if matches!(command, RoomCommand::Shutdown) {
                break;
            }
            self.handle(command);
        }
        if let Some(handle) = self.timer_handle.take() {
            handle.abort();
        }
    }

    fn handle(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::RegisterHost { conn, reply } => {
                let _ = reply.send(self.register_host(conn));
            }
            RoomCommand::JoinRoom {
                conn,
                player_id,
                display_name,
                reply,
            } => {
                let _ = reply.send(self.join_room(conn, player_id, display_name));
            }
            RoomCommand::LeaveRoom { player_id, reply } => {
                let _ = reply.send(self.leave_room(player_id));
            }
            RoomCommand::HandleDisconnect { conn } => self.handle_disconnect(conn),
            RoomCommand::SetRoomLocked { conn, locked, reply } => {
                let _ = reply.send(self.set_room_locked(conn, locked));
            }
            RoomCommand::StartGame { conn, game_type, reply } => {
                let _ = reply.send(self.start_game(conn, game_type));
            }
            RoomCommand::SelectCategory {
                player_id,
                category,
                reply,
            } => {
                let _ = reply.send(self.select_category(player_id, category));
            }
            RoomCommand::SubmitAnswer {
                player_id,
                option_key,
                reply,
            } => {
                let _ = reply.send(self.submit_answer(player_id, option_key));
            }
            RoomCommand::SubmitRankingVote {
                voter_id,
                voted_for_id,
                reply,
            } => {
                let _ = reply.send(self.submit_ranking_vote(voter_id, voted_for_id));
            }
            RoomCommand::NextQuestion { conn, reply } => {
                let _ = reply.send(self.next_question(conn));
            }
            RoomCommand::PhaseTimeout { phase, generation } => self.phase_timeout(phase, generation),
            RoomCommand::GetSnapshot { reply } => {
                let _ = reply.send(self.room.to_snapshot());
            }
            RoomCommand::RemoveDisconnectedPlayers { grace, reply } => {
                let _ = reply.send(self.remove_disconnected_players(grace));
            }
            RoomCommand::IsHostless { ttl, reply } => {
                let _ = reply.send(self.is_hostless(ttl));
            }
            RoomCommand::Shutdown => unreachable!("handled in run()"),
        }
    }

    // -- lobby ------------------------------------------------------------

    fn register_host(&mut self, conn: ConnectionId) -> Result<(), RoomError> {
        self.room.host_connection = Some(conn);
        self.room.host_disconnected_at = None;
        self.broadcast_lobby();
        Ok(())
    }

    fn join_room(
        &mut self,
        conn: ConnectionId,
        player_id: quiz_protocol::PlayerId,
        display_name: String,
    ) -> Result<(), RoomError> {
        if Some(conn) == self.room.host_connection {
            return Err(RoomError::AlreadyHost);
        }
        let rejoining = self.room.players.contains_key(&player_id);
        if self.room.locked && !rejoining {
            return Err(RoomError::Locked(self.room.code.clone()));
        }
        if !rejoining && self.room.players.len() as u32 >= self.room.max_players {
            return Err(RoomError::Full(self.room.code.clone()));
        }
        let name = validate_display_name(&display_name)?;
        if self.room.name_taken(&name, Some(player_id)) {
            return Err(RoomError::NameTaken);
        }
        let now = self.clock.now();
        match self.room.players.get_mut(&player_id) {
            Some(existing) => {
                existing.display_name = name;
                existing.connection_id = Some(conn);
                existing.connected = true;
                existing.last_seen = now;
            }
            None => {
                self.room.players.insert(player_id, Player::new(player_id, name, conn, now));
            }
        }
        self.broadcast_lobby();
        self.broadcast_quiz();
        Ok(())
    }

    fn leave_room(&mut self, player_id: quiz_protocol::PlayerId) -> Result<(), RoomError> {
        self.room.players.remove(&player_id);
        self.broadcast_lobby();
        Ok(())
    }

    fn handle_disconnect(&mut self, conn: ConnectionId) {
        let now = self.clock.now();
        if Some(conn) == self.room.host_connection {
            self.room.host_connection = None;
            self.room.host_disconnected_at = Some(now);
        } else if let Some(player) = self.room.players.values_mut().find(|p| p.connection_id == Some(conn)) {
            player.connected = false;
            player.connection_id = None;
            player.last_seen = now;
        }
        self.broadcast_lobby();
    }

    fn set_room_locked(&mut self, conn: ConnectionId, locked: bool) -> Result<(), RoomError> {
        self.require_host(conn)?;
        self.room.locked = locked;
        self.broadcast_lobby();
        Ok(())
    }

    fn require_host(&self, conn: ConnectionId) -> Result<(), RoomError> {
        if Some(conn) != self.room.host_connection {
            return Err(RoomError::NotHost);
        }
        Ok(())
    }

    // -- game lifecycle -----------------------------------------------------

    fn start_game(&mut self, conn: ConnectionId, game_type: String) -> Result<(), RoomError> {
        self.require_host(conn)?;
        if self.room.status != RoomStatus::Lobby {
            return Err(RoomError::RoundAlreadyStarted);
        }
        let now = self.clock.now();
        let players: Vec<EnginePlayer> = self
            .room
            .players
            .values()
            .map(|p| EnginePlayer {
                player_id: p.player_id,
                display_name: p.display_name.clone(),
                connected: p.connected,
                score: 0,
            })
            .collect();
        let state = engine::start_game(players, "en".to_string(), self.content.as_ref(), &self.engine_cfg, now)?;
        self.quiz = Some(state);
        self.room.status = RoomStatus::InGame;
        self.room.game_type = Some(game_type.clone());
        self.reschedule_timer();
        self.broadcast_lobby();
        self.broadcast(ServerEvent::GameStarted {
            session: GameSessionInfo {
                code: self.room.code.clone(),
                game_type,
                started_at: now,
            },
        });
        self.broadcast_quiz();
        Ok(())
    }

    fn select_category(&mut self, player_id: quiz_protocol::PlayerId, category: String) -> Result<(), RoomError> {
        let now = self.clock.now();
        let quiz = self.quiz.as_mut().ok_or(RoomError::InvalidState)?;
        engine::select_category(quiz, player_id, category, self.content.as_ref(), &self.engine_cfg, now)?;
        self.reschedule_timer();
        self.broadcast_quiz();
        Ok(())
    }

    fn submit_answer(&mut self, player_id: quiz_protocol::PlayerId, option_key: String) -> Result<(), RoomError> {
        let now = self.clock.now();
        let quiz = self.quiz.as_mut().ok_or(RoomError::InvalidState)?;
        match quiz.phase {
            Phase::Answering => engine::submit_answer(quiz, player_id, &option_key, now)?,
            Phase::DictionaryAnswering => {
                let index: usize = option_key.parse().map_err(|_| RoomError::InvalidState)?;
                engine::submit_dictionary_answer(quiz, player_id, index, now)?;
            }
            _ => return Err(RoomError::InvalidState),
        }
        self.maybe_auto_reveal();
        self.broadcast_quiz();
        Ok(())
    }

    fn submit_ranking_vote(
        &mut self,
        voter_id: quiz_protocol::PlayerId,
        voted_for_id: quiz_protocol::PlayerId,
    ) -> Result<(), RoomError> {
        let quiz = self.quiz.as_mut().ok_or(RoomError::InvalidState)?;
        engine::submit_ranking_vote(quiz, voter_id, voted_for_id)?;
        self.maybe_auto_reveal();
        self.broadcast_quiz();
        Ok(())
    }

    fn next_question(&mut self, conn: ConnectionId) -> Result<(), RoomError> {
        self.require_host(conn)?;
        let now = self.clock.now();
        let quiz = self.quiz.as_mut().ok_or(RoomError::InvalidState)?;
        engine::advance_past_scoreboard(quiz, self.content.as_ref(), &self.engine_cfg, now)?;
        if quiz.phase == Phase::Finished {
            self.room.status = RoomStatus::Finished;
        }
        self.reschedule_timer();
        self.broadcast_quiz();
        if self.room.status == RoomStatus::Finished {
            self.broadcast_lobby();
        }
        Ok(())
    }

    /// If every eligible player has acted, reveal immediately instead of
    /// waiting for the phase timer — matching the other example of a
    /// self-message timer being superseded by a faster player-driven path.
    fn maybe_auto_reveal(&mut self) {
        let now = self.clock.now();
        let Some(quiz) = self.quiz.as_mut() else { return };
        let eligible = quiz.eligible_player_ids();
        match quiz.phase {
            Phase::Answering if engine::all_players_answered(quiz, &eligible) => {
                let _ = engine::reveal_category_question(quiz, self.content.as_ref(), &self.engine_cfg, now);
            }
            Phase::DictionaryAnswering if engine::all_dictionary_players_answered(quiz, &eligible) => {
                let _ = engine::reveal_dictionary_word(quiz, &self.engine_cfg, now);
            }
            Phase::RankingVoting if engine::all_players_voted(quiz, &eligible) => {
                let _ = engine::reveal_ranking_prompt(quiz, &self.engine_cfg, now);
            }
            _ => return,
        }
        self.reschedule_timer();
    }

    // -- timers --------------------------------------------------------------

    fn phase_timeout(&mut self, phase: Phase, generation: u64) {
        if generation != self.active_generation {
            return;
        }
        let now = self.clock.now();
        let Some(quiz) = self.quiz.as_mut() else { return };
        if quiz.phase != phase {
            return;
        }
        let content = self.content.as_ref();
        let cfg = &self.engine_cfg;
        let result = match phase {
            Phase::CategorySelection => {
                engine::auto_select_category(quiz, content, cfg, now);
                Ok(())
            }
            Phase::Question => engine::start_answering(quiz, cfg, now),
            Phase::Answering => engine::reveal_category_question(quiz, content, cfg, now),
            Phase::Reveal => match quiz.current_round.as_ref().map(|r| r.round_type) {
                Some(RoundType::DictionaryGame) => engine::round_advance_after_dictionary_reveal(quiz, content, cfg, now),
                _ => engine::round_advance_after_category_reveal(quiz, content, cfg, now),
            },
            Phase::Scoreboard => engine::advance_past_scoreboard(quiz, content, cfg, now),
            Phase::DictionaryWord => engine::start_dictionary_answering(quiz, cfg, now),
            Phase::DictionaryAnswering => engine::reveal_dictionary_word(quiz, cfg, now),
            Phase::RankingPrompt => engine::start_ranking_voting(quiz, cfg, now),
            Phase::RankingVoting => engine::reveal_ranking_prompt(quiz, cfg, now),
            Phase::RankingReveal => engine::round_advance_after_ranking_reveal(quiz, content, cfg, now),
            Phase::Finished => Ok(()),
        };
        if result.is_err() {
            return;
        }
        if self.quiz.as_ref().map(|q| q.phase) == Some(Phase::Finished) {
            self.room.status = RoomStatus::Finished;
            self.broadcast_lobby();
        }
        self.reschedule_timer();
        self.broadcast_quiz();
    }

    /// Cancels any pending timer and, if the game is live and not finished,
    /// schedules the next one for the phase the engine just entered.
    fn reschedule_timer(&mut self) {
        if let Some(handle) = self.timer_handle.take() {
            handle.abort();
        }
        let Some(quiz) = &self.quiz else { return };
        if quiz.phase == Phase::Finished {
            return;
        }
        let Some(ends_at) = quiz.phase_ends_at else { return };
        self.timer_generation += 1;
        let generation = self.timer_generation;
        self.active_generation = generation;
        let phase = quiz.phase;
        let now = self.clock.now();
        let duration = (ends_at - now).to_std().unwrap_or(StdDuration::ZERO);
        let sender = self.self_sender.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = sender.send(RoomCommand::PhaseTimeout { phase, generation }).await;
        });
        self.timer_handle = Some(task.abort_handle());
    }

    // -- cleanup --------------------------------------------------------------

    fn remove_disconnected_players(&mut self, grace: StdDuration) -> usize {
        let now = self.clock.now();
        let grace = chrono::Duration::from_std(grace).unwrap_or_default();
        let before = self.room.players.len();
        self.room
            .players
            .retain(|_, p| p.connected || now - p.last_seen < grace);
        let removed = before - self.room.players.len();
        if removed > 0 {
            self.broadcast_lobby();
        }
        removed
    }

    fn is_hostless(&self, ttl: StdDuration) -> bool {
        if self.room.host_connection.is_some() {
            return false;
        }
        let now = self.clock.now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_default();
        let base = self.room.host_disconnected_at.unwrap_or(self.room.created_at);
        now - base >= ttl
    }

    // -- broadcast --------------------------------------------------------------

    fn broadcast_group(&self) -> Vec<ConnectionId> {
        let mut conns: Vec<ConnectionId> = self.room.host_connection.into_iter().collect();
        conns.extend(self.room.players.values().filter_map(|p| p.connection_id));
        conns
    }

    fn broadcast(&mut self, event: ServerEvent) {
        self.next_seq += 1;
        for conn in self.broadcast_group() {
            self.broadcaster.send(conn, event.clone());
        }
    }

    fn broadcast_lobby(&mut self) {
        let room = self.room.to_snapshot();
        self.broadcast(ServerEvent::LobbyUpdated { room });
    }

    fn broadcast_quiz(&mut self) {
        let Some(quiz) = &self.quiz else { return };
        let snapshot = views::build_quiz_snapshot(quiz, self.clock.now());
        self.broadcast(ServerEvent::QuizStateUpdated { quiz: snapshot });
    }
}

/// Spawns a fresh actor for `room` and returns the mailbox handle to it.
pub fn spawn_room(
    room: Room,
    content: Arc<dyn ContentProvider>,
    engine_cfg: EngineConfig,
    clock: Arc<dyn Clock>,
    broadcaster: Arc<dyn Broadcaster>,
) -> mpsc::Sender<RoomCommand> {
    RoomActor::spawn_internal(room, content, engine_cfg, clock, broadcaster)
}
