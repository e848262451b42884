//! # Placement policy for registered services.
//!
//! [`Placement`] determines which worker a service is assigned to.
//!
//! - [`Placement::Any`] the least-loaded worker, ties broken by lowest
//!   index (default).
//! - [`Placement::Pinned`] a specific worker by index; an out-of-range
//!   index falls back to least-loaded with a diagnostic.

/// Policy controlling which worker a service lands on at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Assign to the worker with the fewest services (default).
    Any,
    /// Pin to the worker at this index.
    Pinned(usize),
}

impl Default for Placement {
    /// Returns [`Placement::Any`].
    fn default() -> Self {
        Placement::Any
    }
}
