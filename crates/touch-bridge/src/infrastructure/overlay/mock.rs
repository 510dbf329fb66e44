//! Recording overlay surface for tests.

use std::sync::Mutex;

use crate::application::overlay::{OverlayMarker, OverlaySurface};

/// Keeps every marker set passed to `redraw`, oldest first.
#[derive(Debug, Default)]
pub struct RecordingOverlay {
    pub draws: Mutex<Vec<Vec<OverlayMarker>>>,
}

impl RecordingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The markers from the most recent redraw, if any.
    pub fn last(&self) -> Option<Vec<OverlayMarker>> {
        self.draws
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    /// Number of redraws so far.
    pub fn redraws(&self) -> usize {
        self.draws.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl OverlaySurface for RecordingOverlay {
    fn redraw(&self, markers: &[OverlayMarker]) {
        self.draws
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(markers.to_vec());
    }
}
