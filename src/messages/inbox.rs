//! # Bounded per-service inbox.
//!
//! Every registered service owns one [`Inbox`]: a bounded FIFO of
//! [`Envelope`]s backed by a bounded crossbeam channel. All operations are
//! non-blocking; [`Inbox::offer`] reports rejection instead of waiting and
//! [`Inbox::poll`] returns `None` instead of parking.
//!
//! Any number of producers may offer concurrently; by contract a single
//! consumer (the owning worker) polls. The capacity is fixed at
//! construction and a full inbox stays full until the consumer drains it;
//! draining one message frees exactly one slot.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use super::envelope::Envelope;

/// Capacity used when an inbox is requested with a zero capacity.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

/// Bounded FIFO of messages addressed to one service.
#[derive(Clone)]
pub struct Inbox {
    sender: Sender<Envelope>,
    receiver: Receiver<Envelope>,
    capacity: usize,
}

impl Inbox {
    /// Creates an inbox with the given capacity.
    ///
    /// A zero capacity is replaced by [`DEFAULT_INBOX_CAPACITY`].
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_INBOX_CAPACITY
        } else {
            capacity
        };
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Enqueues a message without blocking.
    ///
    /// Returns `false` when the inbox is full; the message is dropped and
    /// the caller decides what to do about it.
    pub fn offer(&self, envelope: Envelope) -> bool {
        match self.sender.try_send(envelope) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Dequeues the oldest message, or `None` when the inbox is empty.
    pub fn poll(&self) -> Option<Envelope> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of queued messages.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns true when no messages are queued.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Returns the fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_INBOX_CAPACITY)
    }
}
