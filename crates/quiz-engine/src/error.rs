use quiz_protocol::ErrorCode;

/// Failures raised by the pure engine transition functions.
///
/// Every variant maps 1:1 onto a wire [`ErrorCode`] via [`EngineError::code`];
/// that mapping is the only place the internal enum and the wire taxonomy
/// are tied together.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("not in answering phase")]
    NotAnswering,
    #[error("player is not part of this game")]
    PlayerNotInGame,
    #[error("unknown option key")]
    UnknownOption,
    #[error("only the round leader may select a category")]
    NotRoundLeader,
    #[error("unknown category")]
    InvalidCategory,
    #[error("command is not valid in the current phase")]
    InvalidState,
    #[error("vote target must differ from the voter and be in the scoreboard")]
    InvalidVoteTarget,
    #[error("fewer than 2 players")]
    NotEnoughPlayers,
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::NotAnswering => ErrorCode::InvalidState,
            EngineError::PlayerNotInGame => ErrorCode::InvalidState,
            EngineError::UnknownOption => ErrorCode::InvalidState,
            EngineError::NotRoundLeader => ErrorCode::NotRoundLeader,
            EngineError::InvalidCategory => ErrorCode::InvalidCategory,
            EngineError::InvalidState => ErrorCode::InvalidState,
            EngineError::InvalidVoteTarget => ErrorCode::InvalidState,
            EngineError::NotEnoughPlayers => ErrorCode::NotEnoughPlayers,
        }
    }
}
