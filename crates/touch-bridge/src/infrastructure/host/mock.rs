//! Recording host document for tests.
//!
//! Every hit-test resolves to one configurable element (or to nothing), and
//! every dispatch is pushed into a `Mutex<Vec<...>>` together with the Tokio
//! clock reading at the time, so tests can check order, target, and timing.

use std::sync::Mutex;

use tokio::time::Instant;
use touch_core::{Extent, ScreenPoint, SyntheticEvent};

use crate::application::host::{ElementHandle, HostDocument, HostError};

/// One recorded dispatch.
#[derive(Debug, Clone, Copy)]
pub struct Dispatched {
    pub target: ElementHandle,
    pub event: SyntheticEvent,
    pub at: Instant,
}

/// A host document that records calls without any UI.
pub struct RecordingDocument {
    pub viewport: Extent,
    /// Returned by every hit-test.
    pub target: Mutex<Option<ElementHandle>>,
    /// Points passed to `hit_test`, in call order.
    pub hit_tests: Mutex<Vec<ScreenPoint>>,
    /// Events passed to `dispatch`, in call order.
    pub dispatched: Mutex<Vec<Dispatched>>,
}

impl RecordingDocument {
    /// A document whose hit-tests all land on `target`.
    pub fn new(viewport: Extent, target: Option<ElementHandle>) -> Self {
        Self {
            viewport,
            target: Mutex::new(target),
            hit_tests: Mutex::new(Vec::new()),
            dispatched: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything dispatched so far.
    pub fn events(&self) -> Vec<Dispatched> {
        self.dispatched.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl HostDocument for RecordingDocument {
    fn viewport(&self) -> Extent {
        self.viewport
    }

    fn hit_test(&self, point: ScreenPoint) -> Option<ElementHandle> {
        self.hit_tests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(point);
        *self.target.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn dispatch(&self, target: ElementHandle, event: &SyntheticEvent) -> Result<(), HostError> {
        self.dispatched
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Dispatched {
                target,
                event: *event,
                at: Instant::now(),
            });
        Ok(())
    }
}
