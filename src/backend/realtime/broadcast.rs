/**
 * Board Channels
 *
 * This module manages one `tokio::sync::broadcast` channel per board.
 * Every subscriber of a board receives a copy of each envelope published to
 * it, except envelopes it originated itself.
 *
 * # Lifecycle
 *
 * Channels are created on first subscription and swept by
 * `cleanup_inactive_channels` once their last subscriber is gone. Publishing
 * to a board nobody listens to is a no-op: events are not persisted.
 *
 * # Lagging
 *
 * A subscriber that falls more than the channel capacity behind skips the
 * missed events and continues from the oldest retained one.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast::{self, error::RecvError};

use crate::shared::event::{BoardEnvelope, BoardEvent};

type ChannelMap = HashMap<String, broadcast::Sender<BoardEnvelope>>;

/// Per-board broadcast channels
#[derive(Clone)]
pub struct BoardChannels {
    channels: Arc<Mutex<ChannelMap>>,
    capacity: usize,
}

impl BoardChannels {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChannelMap> {
        self.channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get or create the sender of a board
    pub fn sender(&self, board: &str) -> broadcast::Sender<BoardEnvelope> {
        self.lock()
            .entry(board.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Join a board as `client_id`
    pub fn subscribe(&self, board: &str, client_id: Option<String>) -> BoardSubscription {
        BoardSubscription {
            board: board.to_string(),
            client_id,
            receiver: self.sender(board).subscribe(),
        }
    }

    /// Broadcast an envelope to its board
    ///
    /// # Returns
    ///
    /// Number of live subscriptions the envelope reached, the sender's own
    /// included (0 if nobody is listening)
    pub fn publish(&self, envelope: BoardEnvelope) -> usize {
        let sender = self.lock().get(&envelope.board).cloned();
        let Some(sender) = sender else {
            tracing::debug!("[Board] No subscribers on {}, dropping {}", envelope.board, envelope.event.name());
            return 0;
        };

        let board = envelope.board.clone();
        let name = envelope.event.name();
        match sender.send(envelope) {
            Ok(count) => {
                tracing::debug!("[Board] {} broadcast to {} subscribers on {}", name, count, board);
                count
            }
            Err(_) => {
                tracing::debug!("[Board] No subscribers on {}, dropping {}", board, name);
                0
            }
        }
    }

    /// Wrap and broadcast an event
    pub fn publish_event(&self, board: &str, origin: Option<String>, event: BoardEvent) -> usize {
        self.publish(BoardEnvelope::new(board, origin, event))
    }

    /// Drop channels without subscribers, returning how many were removed
    pub fn cleanup_inactive_channels(&self) -> usize {
        let mut channels = self.lock();
        let before = channels.len();
        channels.retain(|_, sender| sender.receiver_count() > 0);
        before - channels.len()
    }

    /// Get subscriber count for a board
    pub fn subscriber_count(&self, board: &str) -> usize {
        self.lock()
            .get(board)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub fn board_count(&self) -> usize {
        self.lock().len()
    }
}

/// One client's view of a board channel
pub struct BoardSubscription {
    board: String,
    client_id: Option<String>,
    receiver: broadcast::Receiver<BoardEnvelope>,
}

impl BoardSubscription {
    pub fn board(&self) -> &str {
        &self.board
    }

    /// Wait for the next envelope meant for this client
    ///
    /// Skips the client's own envelopes and any lagged-over gap. Returns
    /// `None` once the channel is closed.
    pub async fn next(&mut self) -> Option<BoardEnvelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) if envelope.is_for(self.client_id.as_deref()) => return Some(envelope),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Board] Subscriber on {} lagged, skipped {} events", self.board, skipped);
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
