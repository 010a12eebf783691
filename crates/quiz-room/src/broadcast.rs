use quiz_protocol::{ConnectionId, ServerEvent};

/// Delivers one event to one connection. Implemented by `quiz-server` on
/// top of the real transport; a room actor never talks to a socket
/// directly, so tests can substitute a channel-backed fake.
pub trait Broadcaster: Send + Sync {
    fn send(&self, conn: ConnectionId, event: ServerEvent);
}

#[cfg(test)]
pub mod test_support {
    use std::sync::Mutex;

    use super::*;

    /// Records every `(connection, event)` pair sent to it, for assertions.
    #[derive(Default)]
    pub struct RecordingBroadcaster {
        pub sent: Mutex<Vec<(ConnectionId, ServerEvent)>>,
    }

    impl Broadcaster for RecordingBroadcaster {
        fn send(&self, conn: ConnectionId, event: ServerEvent) {
            self.sent.lock().unwrap().push((conn, event));
        }
    }
}
