use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::Duration;
use quiz_content::{DictionaryEntry, DictionaryPack, InMemoryContentProvider, Question, QuestionOption, QuestionPack, RankingPack, RankingPrompt};
use quiz_engine::{EngineConfig, SystemClock};
use quiz_protocol::{ConnectionId, ErrorCode, PlayerId, RoomCode, RoomStatus, ServerEvent};
use quiz_room::{broadcast::Broadcaster, spawn_room, Room, RoomError};

#[derive(Default)]
struct RecordingBroadcaster {
    sent: Mutex<Vec<(ConnectionId, ServerEvent)>>,
}

impl Broadcaster for RecordingBroadcaster {
    fn send(&self, conn: ConnectionId, event: ServerEvent) {
        self.sent.lock().unwrap().push((conn, event));
    }
}

impl RecordingBroadcaster {
    fn events_for(&self, conn: ConnectionId) -> Vec<ServerEvent> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == conn)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

fn content() -> Arc<InMemoryContentProvider> {
    let questions = QuestionPack {
        schema_version: 1,
        pack_id: "p".into(),
        title: "t".into(),
        locale: "en".into(),
        tags: vec![],
        questions: (0..12)
            .map(|i| Question {
                id: format!("q{i}"),
                text: "2+2?".into(),
                difficulty: 1,
                options: vec![
                    QuestionOption { key: "A".into(), text: "3".into() },
                    QuestionOption { key: "B".into(), text: "4".into() },
                    QuestionOption { key: "C".into(), text: "5".into() },
                    QuestionOption { key: "D".into(), text: "6".into() },
                ],
                correct_option_key: "B".into(),
                explanation: None,
                tags: vec![],
                category: "science".into(),
            })
            .collect(),
    };
    let dictionary = DictionaryPack {
        entries: (0..12)
            .map(|i| DictionaryEntry { word: format!("w{i}"), definition: format!("d{i}") })
            .collect(),
    };
    let ranking = RankingPack {
        prompts: (0..6).map(|i| RankingPrompt { id: format!("r{i}"), prompt: format!("p{i}") }).collect(),
    };
    Arc::new(InMemoryContentProvider::with_seed(questions, dictionary, ranking, 1))
}

fn fast_engine_config() -> EngineConfig {
    EngineConfig {
        category_selection: Duration::milliseconds(20),
        question_intro: Duration::milliseconds(20),
        answering: Duration::milliseconds(20),
        reveal: Duration::milliseconds(20),
        scoreboard: Duration::milliseconds(20),
        dictionary_word: Duration::milliseconds(20),
        dictionary_answering: Duration::milliseconds(20),
        dictionary_reveal: Duration::milliseconds(20),
        ranking_prompt: Duration::milliseconds(20),
        ranking_voting: Duration::milliseconds(20),
        ranking_reveal: Duration::milliseconds(20),
    }
}

fn spawn_test_room(broadcaster: Arc<RecordingBroadcaster>) -> quiz_room::RoomHandle {
    let code = RoomCode::normalize("TEST");
    let room = Room::new(code.clone(), 8, chrono::Utc::now());
    let sender = spawn_room(room, content(), fast_engine_config(), Arc::new(SystemClock), broadcaster);
    quiz_room::RoomHandle::new(code, sender)
}

#[tokio::test]
async fn test_register_host_then_join_broadcasts_lobby_to_both() {
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let handle = spawn_test_room(broadcaster.clone());
    let host_conn = ConnectionId(1);
    let player_conn = ConnectionId(2);

    handle.register_host(host_conn).await.unwrap();
    handle
        .join_room(player_conn, PlayerId::new(), "Alice".to_string())
        .await
        .unwrap();

    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.players.len(), 1);
    assert!(snapshot.has_host);
    assert!(!broadcaster.events_for(host_conn).is_empty());
    assert!(!broadcaster.events_for(player_conn).is_empty());
}

#[tokio::test]
async fn test_join_room_rejects_when_locked_for_a_new_player() {
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let handle = spawn_test_room(broadcaster);
    let host_conn = ConnectionId(1);
    handle.register_host(host_conn).await.unwrap();
    handle.set_room_locked(host_conn, true).await.unwrap();

    let err = handle
        .join_room(ConnectionId(2), PlayerId::new(), "Bob".to_string())
        .await
        .unwrap_err();
    assert_eq!(err, RoomError::Locked(RoomCode::normalize("TEST")));
}

#[tokio::test]
async fn test_locked_room_still_allows_existing_player_to_rejoin() {
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let handle = spawn_test_room(broadcaster);
    let host_conn = ConnectionId(1);
    let player_id = PlayerId::new();
    handle.register_host(host_conn).await.unwrap();
    handle.join_room(ConnectionId(2), player_id, "Alice".to_string()).await.unwrap();
    handle.set_room_locked(host_conn, true).await.unwrap();

    handle.join_room(ConnectionId(3), player_id, "Alice".to_string()).await.unwrap();
    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.players.len(), 1);
}

#[tokio::test]
async fn test_non_host_cannot_start_game() {
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let handle = spawn_test_room(broadcaster);
    handle.register_host(ConnectionId(1)).await.unwrap();
    let err = handle.start_game(ConnectionId(99), "party".to_string()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotHost);
}

#[tokio::test]
async fn test_start_game_with_two_players_moves_room_to_in_game() {
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let handle = spawn_test_room(broadcaster);
    let host_conn = ConnectionId(1);
    handle.register_host(host_conn).await.unwrap();
    handle.join_room(ConnectionId(2), PlayerId::new(), "Alice".to_string()).await.unwrap();
    handle.join_room(ConnectionId(3), PlayerId::new(), "Bob".to_string()).await.unwrap();

    handle.start_game(host_conn, "party".to_string()).await.unwrap();
    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.status, RoomStatus::InGame);
}

#[tokio::test]
async fn test_start_game_with_one_player_is_not_enough_players() {
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let handle = spawn_test_room(broadcaster);
    let host_conn = ConnectionId(1);
    handle.register_host(host_conn).await.unwrap();
    handle.join_room(ConnectionId(2), PlayerId::new(), "Alice".to_string()).await.unwrap();

    let err = handle.start_game(host_conn, "party".to_string()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotEnoughPlayers);
}

#[tokio::test]
async fn test_phase_timer_auto_advances_without_any_client_command() {
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let handle = spawn_test_room(broadcaster);
    let host_conn = ConnectionId(1);
    handle.register_host(host_conn).await.unwrap();
    handle.join_room(ConnectionId(2), PlayerId::new(), "Alice".to_string()).await.unwrap();
    handle.join_room(ConnectionId(3), PlayerId::new(), "Bob".to_string()).await.unwrap();
    handle.start_game(host_conn, "party".to_string()).await.unwrap();

    // category_selection (20ms) auto-picks, then question_intro (20ms) moves
    // to answering, with slack for scheduler jitter.
    tokio::time::sleep(StdDuration::from_millis(200)).await;

    let snapshot = handle.snapshot().await;
    assert_eq!(snapshot.status, RoomStatus::InGame);
}

#[tokio::test]
async fn test_disconnect_clears_host_connection_without_affecting_players() {
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let handle = spawn_test_room(broadcaster);
    let host_conn = ConnectionId(1);
    handle.register_host(host_conn).await.unwrap();
    handle.join_room(ConnectionId(2), PlayerId::new(), "Alice".to_string()).await.unwrap();

    handle.handle_disconnect(host_conn).await;
    let snapshot = handle.snapshot().await;
    assert!(!snapshot.has_host);
    assert_eq!(snapshot.players.len(), 1);
}

#[tokio::test]
async fn test_remove_disconnected_players_respects_grace_period() {
    let broadcaster = Arc::new(RecordingBroadcaster::default());
    let handle = spawn_test_room(broadcaster);
    handle.register_host(ConnectionId(1)).await.unwrap();
    handle.join_room(ConnectionId(2), PlayerId::new(), "Alice".to_string()).await.unwrap();
    handle.handle_disconnect(ConnectionId(2)).await;

    let removed = handle.remove_disconnected_players(StdDuration::from_secs(600)).await;
    assert_eq!(removed, 0);
    let removed = handle.remove_disconnected_players(StdDuration::from_millis(0)).await;
    assert_eq!(removed, 1);
}
