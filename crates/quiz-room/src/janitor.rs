use std::sync::Arc;

use tracing::info;

use crate::config::CleanupConfig;
use crate::registry::RoomRegistry;

/// Periodically sweeps every room for players who disconnected and never
/// came back, and rooms whose host has been gone past the configured TTL.
/// A hostless room is left in place (its players keep playing); only an
/// external removal from the registry actually tears it down, which this
/// loop does once the TTL has elapsed.
pub async fn run(registry: Arc<RoomRegistry>, cfg: CleanupConfig) {
    if !cfg.enabled {
        return;
    }
    let mut interval = tokio::time::interval(cfg.cleanup_interval);
    loop {
        interval.tick().await;

        for handle in registry.all() {
            if handle.is_hostless(cfg.room_without_host_ttl).await {
                info!(room = %handle.code(), "removing room with no host past the configured TTL");
                if let Some(stale) = registry.remove(handle.code()) {
                    stale.shutdown().await;
                }
            }
        }

        for handle in registry.all() {
            let removed = handle.remove_disconnected_players(cfg.disconnected_player_grace).await;
            if removed > 0 {
                info!(room = %handle.code(), removed, "removed disconnected players past their grace period");
            }
        }
    }
}
