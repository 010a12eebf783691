use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A client-chosen stable identifier for one player within one room.
///
/// Opaque to the server beyond uniqueness; clients are expected to persist
/// it locally (e.g. in storage) so a rejoin after a dropped connection can
/// carry the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub uuid::Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 4-character room code drawn from the restricted alphabet (see
/// [`crate::room_code`]). Always stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalises `raw` to upper-case without validating the alphabet.
    ///
    /// Used at every inbound boundary (HTTP path segment, WS command) so
    /// lookups are case-insensitive per the lobby contract.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    /// Wraps an already-generated, already-valid code without re-normalising.
    pub fn from_generated(code: String) -> Self {
        debug_assert_eq!(code, code.to_ascii_uppercase());
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalises on the way in, so a room code arriving in any case over any
/// boundary (WS command payload, HTTP path segment) lands on the same key
/// the registry generated it under.
impl<'de> Deserialize<'de> for RoomCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(RoomCode::normalize(&raw))
    }
}

/// Identifies one accepted transport connection, independent of whatever
/// room or role it is currently bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_code_normalize_lowercases_input_uppercased() {
        assert_eq!(RoomCode::normalize("abcd").as_str(), "ABCD");
        assert_eq!(RoomCode::normalize("  AbCd  ").as_str(), "ABCD");
    }

    #[test]
    fn test_player_id_display_is_uuid_string() {
        let id = PlayerId::new();
        assert_eq!(id.to_string(), id.0.to_string());
    }

    #[test]
    fn test_connection_id_display_format() {
        assert_eq!(ConnectionId(7).to_string(), "conn-7");
    }
}
