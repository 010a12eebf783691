//! The small REST surface: create a room, look up its lobby snapshot, and a
//! health check. The realtime game traffic runs over a separate WebSocket
//! listener (see [`crate::ws_handler`]), not through this router.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use quiz_protocol::{ErrorCode, ErrorDto, RoomCode};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

#[derive(Debug, Serialize)]
struct RoomCreated {
    #[serde(rename = "roomCode")]
    code: RoomCode,
    #[serde(rename = "joinUrl")]
    join_url: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{code}", get(get_room))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "ok"
}

async fn create_room(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let handle = state.registry.create();
    let code = handle.code().clone();
    let join_url = format!("ws://{}/?code={code}", state.ws_bind_addr);
    (StatusCode::CREATED, Json(RoomCreated { code, join_url }))
}

async fn get_room(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    let code = RoomCode::normalize(&code);
    match state.registry.get(&code) {
        Some(handle) => Json(handle.snapshot().await).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorDto {
                code: ErrorCode::RoomNotFound,
                message: format!("room {code} not found"),
            }),
        )
            .into_response(),
    }
}
