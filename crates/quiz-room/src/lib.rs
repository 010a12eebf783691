//! Owns one actor per room: the lobby roster, the in-progress
//! [`quiz_engine::QuizGameState`] if any, and the timer that drives phase
//! transitions when no client command arrives first. Everything that can
//! mutate a room funnels through [`handle::RoomHandle`].

mod actor;
pub mod broadcast;
mod command;
mod config;
mod connections;
mod error;
mod handle;
mod janitor;
mod registry;
mod room_state;
mod views;

pub use actor::spawn_room;
pub use broadcast::Broadcaster;
pub use command::RoomCommand;
pub use config::{CleanupConfig, RoomConfig};
pub use connections::{ConnectionBinding, ConnectionIndex};
pub use error::RoomError;
pub use handle::RoomHandle;
pub use janitor::run as run_janitor;
pub use registry::RoomRegistry;
pub use room_state::{validate_display_name, Player, Room, MAX_DISPLAY_NAME_LEN};
