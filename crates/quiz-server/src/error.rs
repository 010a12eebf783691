//! Unified error type for the quiz server binary.

use quiz_content::ContentError;
use quiz_protocol::ProtocolError;
use quiz_room::RoomError;
use quiz_transport::TransportError;

/// Top-level error that wraps every sub-crate's error type. The `#[from]`
/// attribute on each variant auto-generates a `From` impl so `?` converts
/// sub-crate errors automatically at the boundary where they surface.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
