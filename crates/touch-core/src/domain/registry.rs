//! Per-identity rate gate for synthesized gestures.
//!
//! The sensor stream arrives at tens of frames per second.  A contact that
//! stays touching would otherwise produce a click on every frame.
//! [`TouchRegistry`] remembers, per touch identity, when the last gesture was
//! allowed and refuses new ones until the debounce interval has elapsed.
//!
//! Time is passed in by the caller as a [`Duration`] on any monotonic clock
//! (typically "elapsed since the bridge started").  The registry never reads a
//! clock itself, so tests drive it with plain numbers.

use std::collections::HashMap;
use std::time::Duration;

/// Minimum time between two gestures for the same identity.
pub const DEFAULT_DEBOUNCE_INTERVAL: Duration = Duration::from_millis(1000);

/// Tracks the last dispatch time of every touch identity seen on the current
/// connection.
///
/// Entries are created on the first permitted dispatch for an id and are kept
/// when the id disappears from a frame, so a contact that is lost and found
/// again resumes its window.  [`TouchRegistry::reset`] forgets everything; the
/// synthesizer calls it when the stream connection is replaced.
#[derive(Debug, Clone)]
pub struct TouchRegistry {
    interval: Duration,
    last_dispatch: HashMap<String, Duration>,
}

impl Default for TouchRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_INTERVAL)
    }
}

impl TouchRegistry {
    /// Creates an empty registry with the given debounce interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_dispatch: HashMap::new(),
        }
    }

    /// Returns the configured debounce interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Decides whether a gesture for `id` may be synthesized at `now`.
    ///
    /// Returns `true` if `id` has never been dispatched, or if at least the
    /// debounce interval has passed since its last dispatch.  On `true` the
    /// last dispatch time is updated to `now`; on `false` nothing changes.
    ///
    /// A `now` earlier than the recorded time (a clock that went backwards)
    /// counts as zero elapsed time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use touch_core::TouchRegistry;
    ///
    /// let mut gate = TouchRegistry::new(Duration::from_millis(1000));
    /// assert!(gate.should_dispatch("p1", Duration::from_millis(0)));
    /// assert!(!gate.should_dispatch("p1", Duration::from_millis(500)));
    /// assert!(gate.should_dispatch("p1", Duration::from_millis(1000)));
    /// ```
    pub fn should_dispatch(&mut self, id: &str, now: Duration) -> bool {
        if let Some(last) = self.last_dispatch.get_mut(id) {
            if now.saturating_sub(*last) < self.interval {
                return false;
            }
            *last = now;
            return true;
        }
        self.last_dispatch.insert(id.to_string(), now);
        true
    }

    /// Returns the last permitted dispatch time for `id`, if any.
    pub fn last_dispatch(&self, id: &str) -> Option<Duration> {
        self.last_dispatch.get(id).copied()
    }

    /// Forgets every identity.
    pub fn reset(&mut self) {
        self.last_dispatch.clear();
    }

    pub fn len(&self) -> usize {
        self.last_dispatch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_dispatch.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
