//! Debug overlay: one marker per touch point, redrawn every frame.
//!
//! The overlay is purely visual.  Surfaces draw on their own layer, separate
//! from the host document, so host hit-tests never land on a marker.

use std::sync::Arc;

use touch_core::{Extent, Frame, ScreenPoint, TouchPoint};

use crate::application::host::HostDocument;

/// One marker as it should appear on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayMarker {
    pub id: String,
    /// Mapped viewport position (not rounded).
    pub position: ScreenPoint,
    /// `"{name}\n({x}, {y})"` with the position rounded to whole pixels.
    pub label: String,
    /// Drawn highlighted when `true`.
    pub touching: bool,
}

impl OverlayMarker {
    fn for_point(point: &TouchPoint, position: ScreenPoint) -> Self {
        let (x, y) = position.rounded();
        Self {
            id: point.id.clone(),
            position,
            label: format!("{}\n({x}, {y})", point.name),
            touching: point.is_touching,
        }
    }
}

/// A drawing layer for overlay markers.
pub trait OverlaySurface: Send + Sync {
    /// Replaces everything currently drawn with `markers`.
    fn redraw(&self, markers: &[OverlayMarker]);
}

/// Renders frames onto an [`OverlaySurface`].
///
/// Holds no per-frame state: every call to [`DebugOverlay::render`] produces
/// the complete marker set for that frame.
pub struct DebugOverlay {
    sensor: Extent,
    host: Arc<dyn HostDocument>,
    surface: Arc<dyn OverlaySurface>,
}

impl DebugOverlay {
    /// `host` is only asked for its viewport size.
    pub fn new(sensor: Extent, host: Arc<dyn HostDocument>, surface: Arc<dyn OverlaySurface>) -> Self {
        Self {
            sensor,
            host,
            surface,
        }
    }

    /// Builds the markers for `frame` without drawing them.
    pub fn markers(&self, frame: &Frame) -> Vec<OverlayMarker> {
        let viewport = self.host.viewport();
        frame
            .iter()
            .map(|p| OverlayMarker::for_point(p, p.screen_position(self.sensor, viewport)))
            .collect()
    }

    /// Clears the surface and draws one marker per point.  Returns the number
    /// of markers drawn.
    pub fn render(&self, frame: &Frame) -> usize {
        let markers = self.markers(frame);
        self.surface.redraw(&markers);
        markers.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
