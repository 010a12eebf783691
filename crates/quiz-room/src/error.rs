use quiz_protocol::{ErrorCode, ErrorDto, RoomCode};

/// Failures raised by lobby and orchestrator operations. Maps 1:1 onto the
/// wire [`ErrorCode`] taxonomy via [`RoomError::code`] / [`RoomError::into_dto`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("room {0} not found")]
    NotFound(RoomCode),
    #[error("room {0} is locked")]
    Locked(RoomCode),
    #[error("room {0} is full")]
    Full(RoomCode),
    #[error("display name invalid: {0}")]
    NameInvalid(String),
    #[error("display name already taken")]
    NameTaken,
    #[error("connection already hosts a room")]
    AlreadyHost,
    #[error("caller is not the current host")]
    NotHost,
    #[error("caller is not the round leader")]
    NotRoundLeader,
    #[error("round already started")]
    RoundAlreadyStarted,
    #[error("unknown category")]
    InvalidCategory,
    #[error("command not valid in current state")]
    InvalidState,
    #[error("not enough players")]
    NotEnoughPlayers,
    #[error("player has been noped")]
    PlayerNoped,
    #[error("booster blocked by shield")]
    BoosterBlockedByShield,
}

impl RoomError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RoomError::NotFound(_) => ErrorCode::RoomNotFound,
            RoomError::Locked(_) => ErrorCode::RoomLocked,
            RoomError::Full(_) => ErrorCode::RoomFull,
            RoomError::NameInvalid(_) => ErrorCode::NameInvalid,
            RoomError::NameTaken => ErrorCode::NameTaken,
            RoomError::AlreadyHost => ErrorCode::AlreadyHost,
            RoomError::NotHost => ErrorCode::NotHost,
            RoomError::NotRoundLeader => ErrorCode::NotRoundLeader,
            RoomError::RoundAlreadyStarted => ErrorCode::RoundAlreadyStarted,
            RoomError::InvalidCategory => ErrorCode::InvalidCategory,
            RoomError::InvalidState => ErrorCode::InvalidState,
            RoomError::NotEnoughPlayers => ErrorCode::NotEnoughPlayers,
            RoomError::PlayerNoped => ErrorCode::PlayerNoped,
            RoomError::BoosterBlockedByShield => ErrorCode::BoosterBlockedByShield,
        }
    }

    pub fn into_dto(self) -> ErrorDto {
        ErrorDto {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

impl From<quiz_engine::EngineError> for RoomError {
    fn from(err: quiz_engine::EngineError) -> Self {
        match err {
            quiz_engine::EngineError::NotAnswering => RoomError::InvalidState,
            quiz_engine::EngineError::PlayerNotInGame => RoomError::InvalidState,
            quiz_engine::EngineError::UnknownOption => RoomError::InvalidState,
            quiz_engine::EngineError::NotRoundLeader => RoomError::NotRoundLeader,
            quiz_engine::EngineError::InvalidCategory => RoomError::InvalidCategory,
            quiz_engine::EngineError::InvalidState => RoomError::InvalidState,
            quiz_engine::EngineError::InvalidVoteTarget => RoomError::InvalidState,
            quiz_engine::EngineError::NotEnoughPlayers => RoomError::NotEnoughPlayers,
        }
    }
}
