//! Message model: envelopes and per-service inboxes.
//!
//! ## Contents
//! - [`Envelope`] immutable message wrapper (timestamp, sequence, type tag)
//! - [`Inbox`] bounded non-blocking FIFO owned by each service
//!
//! Delivery semantics: messages from one producer to one inbox arrive in
//! offer order; nothing is guaranteed across distinct producers or distinct
//! inboxes; a rejected offer means the message is gone (no retry, no
//! dead-letter queue).

mod envelope;
mod inbox;

pub use envelope::Envelope;
pub use inbox::{Inbox, DEFAULT_INBOX_CAPACITY};
