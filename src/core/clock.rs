//! # Process-wide monotonic nanosecond clock.
//!
//! Due-checks and last-step bookkeeping use a single monotonic timeline,
//! anchored at the first read. The value 0 is reserved as the "never ran"
//! sentinel, which makes a freshly registered service due on its first
//! tick; readings are floored to 1 to keep the sentinel unambiguous.

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Nanoseconds elapsed since the clock was first read. Never 0.
pub(crate) fn monotonic_nanos() -> u64 {
    let epoch = *EPOCH.get_or_init(Instant::now);
    (epoch.elapsed().as_nanos() as u64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_are_monotonic_and_nonzero() {
        let a = monotonic_nanos();
        let b = monotonic_nanos();
        assert!(a >= 1);
        assert!(b >= a);
    }
}
