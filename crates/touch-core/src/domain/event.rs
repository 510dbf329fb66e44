//! Synthetic pointer events.
//!
//! A touch gesture is delivered to the host as three events that mimic what a
//! browser produces for a real tap: `click`, `pointerdown`, and, a moment
//! later, `pointerup`.  [`SyntheticEvent`] is the host-independent description
//! of one of those events; host adapters translate it into whatever their
//! document model dispatches.

use serde::{Deserialize, Serialize};

use crate::domain::geometry::ScreenPoint;

/// Pointer id carried by every synthesized event.
pub const TOUCH_POINTER_ID: i32 = 1;

/// Button index of the primary (left / touch contact) button.
pub const PRIMARY_BUTTON: i16 = 0;

/// The kind of synthetic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Click,
    PointerDown,
    PointerUp,
}

impl EventKind {
    /// DOM event type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Click => "click",
            EventKind::PointerDown => "pointerdown",
            EventKind::PointerUp => "pointerup",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input device type reported on pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerType {
    Mouse,
    Pen,
    Touch,
}

/// One synthetic event, fully described.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticEvent {
    pub kind: EventKind,
    /// Viewport coordinates (`clientX` / `clientY`).
    pub position: ScreenPoint,
    pub bubbles: bool,
    pub cancelable: bool,
    pub pointer_id: i32,
    pub pointer_type: PointerType,
    pub is_primary: bool,
    pub button: i16,
}

impl SyntheticEvent {
    /// Builds a bubbling, cancelable, primary touch event at `position`.
    pub fn touch(kind: EventKind, position: ScreenPoint) -> Self {
        Self {
            kind,
            position,
            bubbles: true,
            cancelable: true,
            pointer_id: TOUCH_POINTER_ID,
            pointer_type: PointerType::Touch,
            is_primary: true,
            button: PRIMARY_BUTTON,
        }
    }

    /// The `click` + `pointerdown` pair dispatched when a gesture starts.
    pub fn press_sequence(position: ScreenPoint) -> [SyntheticEvent; 2] {
        [
            Self::touch(EventKind::Click, position),
            Self::touch(EventKind::PointerDown, position),
        ]
    }

    /// The deferred `pointerup` that completes a gesture.
    pub fn release(position: ScreenPoint) -> Self {
        Self::touch(EventKind::PointerUp, position)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
