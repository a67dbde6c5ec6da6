//! Per-document broadcast rooms for live highlight updates

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Messages a room buffers for a slow client before it starts skipping
pub const ROOM_CAPACITY: usize = 64;

/// One message on its way to the other clients of a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relay {
    /// Client that sent it; never echoed back to it
    pub origin: Uuid,
    pub payload: String,
}

/// Broadcast channels keyed by document id
#[derive(Default)]
pub struct RealtimeHub {
    rooms: Mutex<HashMap<String, broadcast::Sender<Relay>>>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a document's room, opening it on first use
    pub fn join(&self, pdf_id: &str) -> (broadcast::Sender<Relay>, broadcast::Receiver<Relay>) {
        let mut rooms = self.rooms.lock();
        let sender = rooms
            .entry(pdf_id.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .clone();
        let receiver = sender.subscribe();
        (sender, receiver)
    }

    /// Close rooms nobody listens to anymore. Call after dropping the receiver.
    pub fn leave(&self, pdf_id: &str) {
        let mut rooms = self.rooms.lock();
        rooms.retain(|id, sender| {
            let keep = sender.receiver_count() > 0;
            if !keep {
                tracing::debug!(pdf_id = %id, "closing realtime room");
            }
            keep
        });
        tracing::trace!(pdf_id, open = rooms.len(), "left realtime room");
    }

    /// Number of open rooms
    pub fn room_count(&self) -> usize {
        self.rooms.lock().len()
    }

    /// Clients currently listening on a document
    pub fn listeners(&self, pdf_id: &str) -> usize {
        self.rooms
            .lock()
            .get(pdf_id)
            .map_or(0, |sender| sender.receiver_count())
    }
}
