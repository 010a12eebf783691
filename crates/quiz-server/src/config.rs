use std::time::Duration;

use quiz_room::{CleanupConfig, RoomConfig};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Everything read once at startup. Every knob has a default so the server
/// runs unconfigured in development; production deployments override via
/// environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub ws_bind_addr: String,
    pub http_bind_addr: String,
    pub content_dir: String,
    pub locale: String,
    pub log_filter: String,
    pub room: RoomConfig,
    pub cleanup: CleanupConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            ws_bind_addr: env_or("PARTYQUIZ_WS_BIND_ADDR", "0.0.0.0:7777"),
            http_bind_addr: env_or("PARTYQUIZ_HTTP_BIND_ADDR", "0.0.0.0:8080"),
            content_dir: env_or("PARTYQUIZ_CONTENT_DIR", "./content"),
            locale: env_or("PARTYQUIZ_LOCALE", "en"),
            log_filter: env_or("PARTYQUIZ_LOG_FILTER", "info,quiz_server=debug,quiz_room=debug"),
            room: RoomConfig {
                max_players: env_parsed("PARTYQUIZ_MAX_PLAYERS", 8),
            },
            cleanup: CleanupConfig {
                enabled: env_parsed("PARTYQUIZ_CLEANUP_ENABLED", true),
                cleanup_interval: Duration::from_secs(env_parsed("PARTYQUIZ_CLEANUP_INTERVAL_SECS", 30)),
                room_without_host_ttl: Duration::from_secs(env_parsed("PARTYQUIZ_ROOM_WITHOUT_HOST_TTL_SECS", 600)),
                disconnected_player_grace: Duration::from_secs(env_parsed("PARTYQUIZ_DISCONNECTED_PLAYER_GRACE_SECS", 120)),
            },
        }
    }
}
