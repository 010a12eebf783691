//! Binary entry point: loads content packs, wires the room registry to a
//! WebSocket transport and an HTTP surface, and runs both until terminated.

mod config;
mod error;
mod http;
mod outbound;
mod ws_handler;

use std::sync::Arc;

use quiz_content::{ContentDir, ContentProvider, InMemoryContentProvider};
use quiz_engine::{EngineConfig, SystemClock};
use quiz_room::{ConnectionIndex, RoomRegistry};
use quiz_transport::{Transport, WebSocketTransport};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::outbound::OutboundRegistry;

/// Shared handles every connection task and every HTTP request needs.
pub struct AppState {
    pub registry: Arc<RoomRegistry>,
    pub outbound: Arc<OutboundRegistry>,
    pub connections: Arc<ConnectionIndex>,
    /// Address clients open the game WebSocket against, used to build the
    /// `joinUrl` returned from room creation.
    pub ws_bind_addr: String,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(config.log_filter.clone()))
        .init();

    let content_dir = ContentDir::new(config.content_dir.clone());
    let questions = content_dir.load_question_pack(&config.locale)?;
    let dictionary = content_dir.load_dictionary_pack(&config.locale)?;
    let ranking = content_dir.load_ranking_pack(&config.locale)?;
    let content: Arc<dyn ContentProvider> = Arc::new(InMemoryContentProvider::new(questions, dictionary, ranking));

    let outbound = Arc::new(OutboundRegistry::new());
    let registry = Arc::new(RoomRegistry::new(
        content,
        EngineConfig::default(),
        Arc::new(SystemClock),
        outbound.clone(),
        config.room.clone(),
    ));
    let connections = Arc::new(ConnectionIndex::new());

    let state = Arc::new(AppState {
        registry: registry.clone(),
        outbound,
        connections,
        ws_bind_addr: config.ws_bind_addr.clone(),
    });

    let janitor = tokio::spawn(quiz_room::run_janitor(registry, config.cleanup.clone()));

    let http_listener = tokio::net::TcpListener::bind(&config.http_bind_addr).await?;
    tracing::info!(addr = %config.http_bind_addr, "HTTP surface listening");
    let http_state = state.clone();
    let http_server = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, http::router(http_state)).await {
            tracing::error!(error = %e, "HTTP server exited");
        }
    });

    let mut transport = WebSocketTransport::bind(&config.ws_bind_addr).await?;
    tracing::info!(addr = %config.ws_bind_addr, "game server running");

    let accept_loop = async {
        loop {
            match transport.accept().await {
                Ok(conn) => {
                    let conn_state = state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = ws_handler::handle_connection(conn, conn_state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => tracing::error!(error = %e, "accept failed"),
            }
        }
    };

    tokio::select! {
        _ = accept_loop => {}
        res = http_server => {
            if let Err(e) = res {
                tracing::error!(error = %e, "HTTP server task panicked");
            }
        }
        res = janitor => {
            if let Err(e) = res {
                tracing::error!(error = %e, "janitor task panicked");
            }
        }
    }

    Ok(())
}
