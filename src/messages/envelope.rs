//! # Message envelope routed between services.
//!
//! An [`Envelope`] wraps an arbitrary user payload with the metadata the
//! runtime guarantees on every message: a creation timestamp, a globally
//! unique sequence number, and a type tag derived from the payload's
//! concrete type. Envelopes are immutable once created; consuming the
//! payload consumes the envelope.
//!
//! ## Example
//! ```rust
//! use servitor::Envelope;
//!
//! struct Raw(String);
//!
//! let env = Envelope::new(Raw("x".into()));
//! assert!(env.is::<Raw>());
//! assert!(env.kind().ends_with("Raw"));
//!
//! let raw = env.downcast::<Raw>().ok().expect("payload type matches");
//! assert_eq!(raw.0, "x");
//! ```

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for per-sender ordering checks.
static ENVELOPE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Immutable message addressed to a service by logical name.
///
/// The payload is opaque to the runtime; receivers recover it with
/// [`Envelope::downcast`] or inspect it with [`Envelope::peek`].
pub struct Envelope {
    /// Globally unique, monotonically increasing sequence number.
    seq: u64,
    /// Wall-clock creation timestamp.
    at: SystemTime,
    /// Type tag of the payload's concrete type.
    kind: &'static str,
    /// The user payload.
    payload: Box<dyn Any + Send>,
}

impl Envelope {
    /// Wraps a payload, stamping the current time, the next sequence
    /// number, and the payload's type name.
    pub fn new<M: Any + Send>(payload: M) -> Self {
        Self {
            seq: ENVELOPE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind: std::any::type_name::<M>(),
            payload: Box::new(payload),
        }
    }

    /// Returns the envelope's sequence number.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Returns the creation timestamp.
    pub fn at(&self) -> SystemTime {
        self.at
    }

    /// Returns the type tag of the payload.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns true if the payload is of type `M`.
    pub fn is<M: Any>(&self) -> bool {
        self.payload.is::<M>()
    }

    /// Borrows the payload as `M`, if it is one.
    pub fn peek<M: Any>(&self) -> Option<&M> {
        self.payload.downcast_ref::<M>()
    }

    /// Consumes the envelope and returns the payload as `M`.
    ///
    /// On a type mismatch the intact envelope is handed back so the caller
    /// can try another type or drop it deliberately.
    pub fn downcast<M: Any>(self) -> Result<M, Envelope> {
        match self.payload.downcast::<M>() {
            Ok(payload) => Ok(*payload),
            Err(payload) => Err(Envelope {
                seq: self.seq,
                at: self.at,
                kind: self.kind,
                payload,
            }),
        }
    }
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("seq", &self.seq)
            .field("at", &self.at)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
