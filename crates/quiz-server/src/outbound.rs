use dashmap::DashMap;
use quiz_protocol::{ConnectionId, ServerEvent};
use quiz_room::Broadcaster;
use tokio::sync::mpsc;

const OUTBOUND_CAPACITY: usize = 64;

/// Routes a room actor's broadcasts to the outbound channel of whichever
/// connection owns that id. One instance is shared by every room; a room
/// only ever knows connection ids, never how they're wired to a socket.
#[derive(Default)]
pub struct OutboundRegistry {
    senders: DashMap<ConnectionId, mpsc::Sender<ServerEvent>>,
}

impl OutboundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection and returns the receiving
    /// end its writer task should drain.
    pub fn register(&self, conn: ConnectionId) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        self.senders.insert(conn, tx);
        rx
    }

    pub fn unregister(&self, conn: ConnectionId) {
        self.senders.remove(&conn);
    }
}

impl Broadcaster for OutboundRegistry {
    fn send(&self, conn: ConnectionId, event: ServerEvent) {
        if let Some(tx) = self.senders.get(&conn) {
            // A full or closed channel means the writer task is gone or
            // backed up; dropping the event here is preferable to blocking
            // the room actor on one slow connection.
            let _ = tx.try_send(event);
        }
    }
}
