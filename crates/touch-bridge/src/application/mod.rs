//! Application layer for touch-bridge.
//!
//! Knows *what* to do with a frame: draw it and turn touching points into
//! gestures.  *How* elements are found, events delivered, and markers drawn
//! is delegated to the host through narrow traits.
//!
//! - **`host`** – [`HostDocument`]: viewport size, hit-test, event dispatch.
//! - **`synthesizer`** – [`EventSynthesizer`]: rate-gated gesture synthesis.
//! - **`overlay`** – [`DebugOverlay`] and the [`OverlaySurface`] it draws on.

pub mod host;
pub mod overlay;
pub mod synthesizer;

pub use host::{ElementHandle, HostDocument, HostError};
pub use overlay::{DebugOverlay, OverlayMarker, OverlaySurface};
pub use synthesizer::EventSynthesizer;
