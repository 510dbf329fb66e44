//! Domain entities for the touch bridge.
//!
//! Everything here is pure: no I/O, no clocks, no async.  Callers pass the
//! current time and viewport size in, which keeps every rule testable with
//! plain values.

/// Synthetic click / pointer event descriptions.
pub mod event;

/// Sensor and viewport extents plus the coordinate mapper.
pub mod geometry;

/// Per-identity rate gate.
pub mod registry;

/// Touch points and frames.
pub mod touch;
