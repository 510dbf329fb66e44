//! Host document capabilities.
//!
//! The bridge does not own the document it drives.  Elements appear, move, and
//! disappear without notice, so the synthesizer resolves its target late (by
//! hit-testing at the moment a gesture starts) and only ever holds an opaque
//! [`ElementHandle`].
//!
//! Implementations live in the infrastructure layer.

use thiserror::Error;
use touch_core::{EventKind, Extent, ScreenPoint, SyntheticEvent};

/// Opaque reference to an element of the host document.
///
/// A handle may outlive its element.  Dispatching to such a stale handle is
/// allowed; what happens then is up to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u64);

/// Error type for host dispatch operations.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host refused to deliver the event.
    #[error("host rejected {kind} for element {target:?}: {reason}")]
    Rejected {
        target: ElementHandle,
        kind: EventKind,
        reason: String,
    },

    /// The host document is not available at all (e.g. torn down).
    #[error("host document unavailable: {0}")]
    Unavailable(String),
}

/// Capabilities the bridge needs from the hosting document.
pub trait HostDocument: Send + Sync {
    /// Current viewport size in pixels.
    fn viewport(&self) -> Extent;

    /// Returns the topmost element at `point`, or `None` if nothing is there.
    ///
    /// Debug overlay markers are never returned.
    fn hit_test(&self, point: ScreenPoint) -> Option<ElementHandle>;

    /// Delivers `event` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the host could not deliver the event.
    fn dispatch(&self, target: ElementHandle, event: &SyntheticEvent) -> Result<(), HostError>;
}
