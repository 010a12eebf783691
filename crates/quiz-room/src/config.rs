use std::time::Duration;

/// Knobs a room/lobby cares about, read once at startup with the defaults
/// stated for this system.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    pub max_players: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self { max_players: 8 }
    }
}

/// Janitor tunables.
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    pub enabled: bool,
    pub cleanup_interval: Duration,
    pub room_without_host_ttl: Duration,
    pub disconnected_player_grace: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cleanup_interval: Duration::from_secs(30),
            room_without_host_ttl: Duration::from_secs(10 * 60),
            disconnected_player_grace: Duration::from_secs(120),
        }
    }
}
