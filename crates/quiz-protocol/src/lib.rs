//! Wire types and codec shared between the quiz server and its clients.
//!
//! This crate has no knowledge of rooms, connections, or game rules beyond
//! the shapes that cross the network boundary; [`quiz-room`] and
//! [`quiz-engine`] own the authoritative state these types are views of.

mod codec;
mod error;
mod ids;
pub mod room_code;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use ids::{ConnectionId, PlayerId, RoomCode};
pub use types::{
    ClientCommand, ClientEnvelope, ErrorCode, ErrorDto, GameSessionInfo, PlayerSnapshot,
    QuestionView, QuizSnapshot, Role, RoomSnapshot, RoomStatus, ScoreboardEntryView, ServerEnvelope,
    ServerEvent,
};
