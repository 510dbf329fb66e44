//! Headless host document.
//!
//! [`SceneDocument`] models the page the bridge would normally drive: a fixed
//! viewport and a set of named rectangles stacked by z-order.  Dispatched
//! events are logged and counted per element, which is enough to watch the
//! bridge work end to end without a browser.
//!
//! Elements can be removed while gestures are in flight.  A handle to a removed
//! element stays valid for dispatch; the event is logged with a warning and
//! otherwise ignored.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::Deserialize;
use tracing::{info, warn};
use touch_core::{Extent, ScreenPoint, SyntheticEvent};

use crate::application::host::{ElementHandle, HostDocument, HostError};

/// A rectangle as described in the configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElementSpec {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Higher values are on top.  Ties go to the element added last.
    #[serde(default)]
    pub z: i32,
}

impl ElementSpec {
    fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

struct Element {
    spec: ElementSpec,
    dispatched: u64,
}

#[derive(Default)]
struct Scene {
    next_handle: u64,
    // Keyed by handle, so iteration order is insertion order.
    elements: BTreeMap<ElementHandle, Element>,
}

/// In-memory host document.
pub struct SceneDocument {
    viewport: Extent,
    scene: Mutex<Scene>,
}

impl SceneDocument {
    /// Creates an empty document with the given viewport size.
    pub fn new(viewport: Extent) -> Self {
        Self {
            viewport,
            scene: Mutex::new(Scene::default()),
        }
    }

    /// Creates a document and adds `elements` in order.
    pub fn with_elements(viewport: Extent, elements: impl IntoIterator<Item = ElementSpec>) -> Self {
        let doc = Self::new(viewport);
        for spec in elements {
            doc.add_element(spec);
        }
        doc
    }

    /// Adds an element and returns its handle.
    pub fn add_element(&self, spec: ElementSpec) -> ElementHandle {
        let mut scene = self.lock();
        scene.next_handle += 1;
        let handle = ElementHandle(scene.next_handle);
        scene.elements.insert(
            handle,
            Element {
                spec,
                dispatched: 0,
            },
        );
        handle
    }

    /// Removes an element.  Returns `false` if it was already gone.
    pub fn remove_element(&self, handle: ElementHandle) -> bool {
        self.lock().elements.remove(&handle).is_some()
    }

    /// Looks up an element handle by name (first match in insertion order).
    pub fn find(&self, name: &str) -> Option<ElementHandle> {
        self.lock()
            .elements
            .iter()
            .find(|(_, e)| e.spec.name == name)
            .map(|(handle, _)| *handle)
    }

    /// Number of events delivered to a live element.
    pub fn dispatch_count(&self, handle: ElementHandle) -> Option<u64> {
        self.lock().elements.get(&handle).map(|e| e.dispatched)
    }

    pub fn len(&self) -> usize {
        self.lock().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Scene> {
        self.scene.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HostDocument for SceneDocument {
    fn viewport(&self) -> Extent {
        self.viewport
    }

    fn hit_test(&self, point: ScreenPoint) -> Option<ElementHandle> {
        self.lock()
            .elements
            .iter()
            .filter(|(_, e)| e.spec.contains(point))
            // max_by_key keeps the last maximum, i.e. the latest-added element.
            .max_by_key(|(_, e)| e.spec.z)
            .map(|(handle, _)| *handle)
    }

    fn dispatch(&self, target: ElementHandle, event: &SyntheticEvent) -> Result<(), HostError> {
        let mut scene = self.lock();
        match scene.elements.get_mut(&target) {
            Some(element) => {
                element.dispatched += 1;
                info!(
                    "{} on {:?} at ({:.0}, {:.0})",
                    event.kind, element.spec.name, event.position.x, event.position.y
                );
            }
            None => warn!(
                "{} on removed element {target:?} at ({:.0}, {:.0})",
                event.kind, event.position.x, event.position.y
            ),
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
