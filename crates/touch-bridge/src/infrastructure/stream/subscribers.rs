//! Frame subscriber registry with snapshot fan-out.
//!
//! Callbacks run synchronously, in subscription order, on the task that
//! decoded the frame.  The list is snapshotted before any callback runs, so a
//! callback may subscribe or unsubscribe (itself or others) without
//! deadlocking; such changes apply from the next frame on.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use touch_core::Frame;

/// A frame callback as stored by the registry.
pub type FrameCallback = Arc<dyn Fn(&Frame) + Send + Sync>;

#[derive(Default)]
struct Entries {
    next_id: u64,
    callbacks: Vec<(u64, FrameCallback)>,
}

/// Ordered set of frame callbacks.
#[derive(Clone, Default)]
pub struct FrameSubscribers {
    inner: Arc<Mutex<Entries>>,
}

impl FrameSubscribers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `callback`; it runs after every callback registered before it.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Frame) + Send + Sync + 'static,
    {
        let mut entries = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = entries.next_id;
        entries.next_id += 1;
        entries.callbacks.push((id, Arc::new(callback)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Invokes every current callback with `frame`.
    pub fn publish(&self, frame: &Frame) {
        let snapshot: Vec<FrameCallback> = {
            let entries = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            entries.callbacks.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for callback in snapshot {
            callback(frame);
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .callbacks
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping the handle leaves the callback registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Entries>>,
}

impl Subscription {
    /// Removes exactly the callback this handle was returned for.
    ///
    /// Returns `false` if the owning client no longer exists.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut entries = registry.lock().unwrap_or_else(PoisonError::into_inner);
        let before = entries.callbacks.len();
        entries.callbacks.retain(|(id, _)| *id != self.id);
        entries.callbacks.len() != before
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
