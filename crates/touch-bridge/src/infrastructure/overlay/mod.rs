//! [`OverlaySurface`] implementations.
//!
//! [`TracingOverlay`] stands in for a drawing layer: each redraw is written to
//! the log at `debug` level, one line per marker.  A marker that is touching is
//! flagged with `*`.

pub mod mock;

pub use mock::RecordingOverlay;

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::application::overlay::{OverlayMarker, OverlaySurface};

/// Logs every marker set it is asked to draw.
#[derive(Debug, Default)]
pub struct TracingOverlay {
    visible: AtomicUsize,
}

impl TracingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of markers currently drawn.
    pub fn visible(&self) -> usize {
        self.visible.load(Ordering::Relaxed)
    }
}

impl OverlaySurface for TracingOverlay {
    fn redraw(&self, markers: &[OverlayMarker]) {
        let previous = self.visible.swap(markers.len(), Ordering::Relaxed);
        if previous == 0 && markers.is_empty() {
            return;
        }
        for marker in markers {
            debug!(
                "overlay {}{} {}",
                if marker.touching { "*" } else { " " },
                marker.id,
                marker.label.replace('\n', " ")
            );
        }
    }
}
