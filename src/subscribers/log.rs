//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [registered] service=parser worker=0
//! [step-failed] service=parser worker=0 streak=2 err="step failed: boom"
//! [quarantined] service=parser worker=0 streak=3
//! [message-dropped] target=logger reason=route_inbox_full
//! [worker-started] worker=1
//! [shutdown-requested]
//! [all-stopped-within-grace]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::subscriber::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::WorkerStarted => match &e.error {
                Some(err) => println!("[worker-start-skipped] worker={:?} reason={err}", e.worker),
                None => println!("[worker-started] worker={:?}", e.worker),
            },
            EventKind::WorkerStopped => {
                println!("[worker-stopped] worker={:?}", e.worker);
            }
            EventKind::ServiceRegistered => {
                println!("[registered] service={:?} worker={:?}", e.service, e.worker);
            }
            EventKind::ServiceSetupFailed => {
                println!(
                    "[setup-failed] service={:?} worker={:?} err={:?}",
                    e.service, e.worker, e.error
                );
            }
            EventKind::ServiceStepFailed => {
                println!(
                    "[step-failed] service={:?} worker={:?} streak={:?} err={:?}",
                    e.service, e.worker, e.streak, e.error
                );
            }
            EventKind::ServiceQuarantined => {
                println!(
                    "[quarantined] service={:?} worker={:?} streak={:?}",
                    e.service, e.worker, e.streak
                );
            }
            EventKind::ServiceCleanupFailed => {
                println!(
                    "[cleanup-failed] service={:?} worker={:?} err={:?}",
                    e.service, e.worker, e.error
                );
            }
            EventKind::ServiceRemoved => {
                println!("[removed] service={:?} worker={:?}", e.service, e.worker);
            }
            EventKind::ServiceNotFound => {
                println!("[not-found] service={:?} op={:?}", e.service, e.error);
            }
            EventKind::MessageDropped => {
                println!(
                    "[message-dropped] target={:?} reason={:?}",
                    e.service, e.error
                );
            }
            EventKind::ConfigAdjusted => {
                println!(
                    "[config-adjusted] service={:?} worker={:?} what={:?}",
                    e.service, e.worker, e.error
                );
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
            EventKind::AllStoppedWithin => {
                println!("[all-stopped-within-grace]");
            }
            EventKind::GraceExceeded => {
                println!("[grace-exceeded]");
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] {:?}", e.error);
            }
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panicked] subscriber={:?} {:?}", e.service, e.error);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
