//! # touch-core
//!
//! Shared library for the touch bridge containing the touch-point frame model,
//! the JSON frame decoder, the sensor-to-viewport coordinate mapper, the
//! per-identity rate gate, and the synthetic pointer event value types.
//!
//! It has zero dependencies on sockets, async runtimes, or any host document.
//!
//! # Architecture overview
//!
//! A depth sensor service tracks body parts (hands, fingertips) in front of a
//! screen and streams their positions as JSON frames.  The bridge turns those
//! observations into pointer input for whatever surface is displayed:
//!
//! - **`protocol`** – How a frame travels on the wire.  Each WebSocket message
//!   is one JSON array of touch-point records; [`decode_frame`] turns it into a
//!   typed [`Frame`] or a [`FrameError`].
//!
//! - **`domain`** – Pure logic.  [`map_to_viewport`] converts sensor pixels to
//!   viewport pixels (mirroring the horizontal axis because the sensor faces
//!   the user), [`TouchRegistry`] decides whether an identity may trigger a
//!   gesture yet, and [`SyntheticEvent`] describes the click/pointer events
//!   the bridge produces.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `touch_core::TouchPoint` instead of `touch_core::domain::touch::TouchPoint`.
pub use domain::event::{EventKind, PointerType, SyntheticEvent, PRIMARY_BUTTON, TOUCH_POINTER_ID};
pub use domain::geometry::{map_to_viewport, Extent, ScreenPoint};
pub use domain::registry::{TouchRegistry, DEFAULT_DEBOUNCE_INTERVAL};
pub use domain::touch::{Frame, TouchPoint};
pub use protocol::frame_codec::{decode_frame, FrameError};
