/// Failures that occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[cfg(feature = "json")]
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[cfg(feature = "json")]
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_message_display() {
        let err = ProtocolError::InvalidMessage("missing field".into());
        assert_eq!(err.to_string(), "invalid message: missing field");
    }
}
