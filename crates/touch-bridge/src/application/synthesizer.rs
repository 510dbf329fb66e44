//! EventSynthesizer: turns touching points into synthetic tap gestures.
//!
//! For every point in a frame that is touching and passes the rate gate:
//!
//! 1. map its sensor position into the viewport,
//! 2. hit-test the host at that position (skip the point on a miss),
//! 3. dispatch `click` then `pointerdown` to the element found,
//! 4. schedule `pointerup` to the same element and position after the
//!    configured release delay.
//!
//! Each identity has at most one pending `pointerup`.  When a new gesture
//! starts for an identity whose release has not fired yet, the timer is
//! cancelled and the release is delivered immediately, before the new
//! `click`, so downs and ups always pair up per identity.
//!
//! The gate is cleared whenever frames start arriving on a new connection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};
use touch_core::{Extent, Frame, ScreenPoint, SyntheticEvent, TouchRegistry};

use crate::application::host::{ElementHandle, HostDocument};
use crate::domain::BridgeConfig;

/// A scheduled `pointerup` that may not have fired yet.
struct PendingRelease {
    target: ElementHandle,
    event: SyntheticEvent,
    /// Set by whichever path delivers the release first.  Held for the whole
    /// delivery, so a flush cannot return while the timer is mid-dispatch.
    fired: Arc<Mutex<bool>>,
    timer: JoinHandle<()>,
}

impl PendingRelease {
    fn is_fired(&self) -> bool {
        *self.fired.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs `deliver` unless the release already went out.
fn release_once(fired: &Mutex<bool>, deliver: impl FnOnce()) {
    let mut fired = fired.lock().unwrap_or_else(PoisonError::into_inner);
    if !*fired {
        deliver();
        *fired = true;
    }
}

#[derive(Default)]
struct SynthesizerState {
    registry: TouchRegistry,
    connection_id: Option<u64>,
    pending: HashMap<String, PendingRelease>,
}

/// The gesture synthesis use case.
///
/// Frames are fed in through [`EventSynthesizer::handle_frame`], normally
/// from a stream client subscription.  Must be used from within a Tokio
/// runtime because releases are scheduled as Tokio tasks.
pub struct EventSynthesizer {
    host: Arc<dyn HostDocument>,
    sensor: Extent,
    release_delay: Duration,
    clock_origin: Instant,
    state: Mutex<SynthesizerState>,
}

impl EventSynthesizer {
    /// Creates a synthesizer that dispatches to `host`.
    pub fn new(host: Arc<dyn HostDocument>, config: &BridgeConfig) -> Self {
        Self {
            host,
            sensor: config.sensor_extent,
            release_delay: config.pointer_release_delay,
            clock_origin: Instant::now(),
            state: Mutex::new(SynthesizerState {
                registry: TouchRegistry::new(config.debounce_interval),
                ..Default::default()
            }),
        }
    }

    /// Processes one frame.  Returns the number of gestures started.
    ///
    /// Never awaits: the press events are dispatched before this returns and
    /// only the releases are deferred.
    pub fn handle_frame(&self, frame: &Frame) -> usize {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if state.connection_id != Some(frame.connection_id) {
            if let Some(previous) = state.connection_id {
                debug!(
                    "frames now arrive on connection {} (was {previous}); clearing rate gate",
                    frame.connection_id
                );
            }
            state.registry.reset();
            state.connection_id = Some(frame.connection_id);
        }
        state.pending.retain(|_, release| !release.is_fired());

        let viewport = self.host.viewport();
        let now = self.clock_origin.elapsed();
        let mut started = 0;

        for point in frame.iter().filter(|p| p.is_touching) {
            if !state.registry.should_dispatch(&point.id, now) {
                trace!("touch {} is inside its debounce window", point.id);
                continue;
            }

            let position = point.screen_position(self.sensor, viewport);
            let Some(target) = self.host.hit_test(position) else {
                debug!(
                    "touch {} at ({:.1}, {:.1}) hit no element",
                    point.id, position.x, position.y
                );
                continue;
            };

            if let Some(previous) = state.pending.remove(&point.id) {
                self.flush_release(&point.id, previous);
            }

            for event in SyntheticEvent::press_sequence(position) {
                deliver(self.host.as_ref(), target, &event, &point.id);
            }

            let release = self.schedule_release(point.id.clone(), target, position);
            state.pending.insert(point.id.clone(), release);
            started += 1;
        }

        started
    }

    /// Number of releases scheduled but not delivered yet.
    pub fn pending_releases(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.pending.values().filter(|r| !r.is_fired()).count()
    }

    /// Number of identities currently tracked by the rate gate.
    pub fn tracked_identities(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.registry.len()
    }

    fn schedule_release(&self, id: String, target: ElementHandle, position: ScreenPoint) -> PendingRelease {
        let event = SyntheticEvent::release(position);
        let fired = Arc::new(Mutex::new(false));

        let host = Arc::clone(&self.host);
        let fired_by_timer = Arc::clone(&fired);
        let delay = self.release_delay;
        let timer = tokio::spawn(async move {
            time::sleep(delay).await;
            release_once(&fired_by_timer, || deliver(host.as_ref(), target, &event, &id));
        });

        PendingRelease {
            target,
            event,
            fired,
            timer,
        }
    }

    /// Cancels a pending release timer and delivers the release now.
    fn flush_release(&self, id: &str, release: PendingRelease) {
        release.timer.abort();
        release_once(&release.fired, || {
            debug!("touch {id} pressed again before its release fired; releasing now");
            deliver(self.host.as_ref(), release.target, &release.event, id);
        });
    }
}

/// Dispatches one event, logging failures instead of propagating them.
fn deliver(host: &dyn HostDocument, target: ElementHandle, event: &SyntheticEvent, id: &str) {
    match host.dispatch(target, event) {
        Ok(()) => trace!(
            "touch {id}: {} -> {target:?} at ({:.1}, {:.1})",
            event.kind,
            event.position.x,
            event.position.y
        ),
        Err(e) => warn!("touch {id}: failed to dispatch {}: {e}", event.kind),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::host::HostError;
    use mockall::{mock, predicate::*, Sequence};
    use touch_core::{EventKind, PointerType, TouchPoint};

    mock! {
        Host {}
        impl HostDocument for Host {
            fn viewport(&self) -> Extent;
            fn hit_test(&self, point: ScreenPoint) -> Option<ElementHandle>;
            fn dispatch(&self, target: ElementHandle, event: &SyntheticEvent) -> Result<(), HostError>;
        }
    }

    /// Records dispatched events in order; hit-tests resolve to a fixed element.
    #[derive(Default)]
    struct RecordingHost {
        target: Option<ElementHandle>,
        events: Mutex<Vec<(ElementHandle, SyntheticEvent, Instant)>>,
        fail_kind: Option<EventKind>,
    }

    impl RecordingHost {
        fn with_target(id: u64) -> Self {
            Self {
                target: Some(ElementHandle(id)),
                ..Default::default()
            }
        }

        fn kinds(&self) -> Vec<EventKind> {
            self.events.lock().unwrap().iter().map(|(_, e, _)| e.kind).collect()
        }
    }

    impl HostDocument for RecordingHost {
        fn viewport(&self) -> Extent {
            Extent::new(640.0, 480.0)
        }

        fn hit_test(&self, _point: ScreenPoint) -> Option<ElementHandle> {
            self.target
        }

        fn dispatch(&self, target: ElementHandle, event: &SyntheticEvent) -> Result<(), HostError> {
            if self.fail_kind == Some(event.kind) {
                return Err(HostError::Unavailable("injected failure".to_string()));
            }
            self.events.lock().unwrap().push((target, *event, Instant::now()));
            Ok(())
        }
    }

    fn touch(id: &str, sx: f64, sy: f64, touching: bool) -> TouchPoint {
        TouchPoint {
            id: id.to_string(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
            is_touching: touching,
            name: "hand".to_string(),
            bodypart: "hand".to_string(),
            sensor_x_px: sx,
            sensor_y_px: sy,
            sensor_depth: 0.0,
        }
    }

    fn frame(points: Vec<TouchPoint>) -> Frame {
        Frame::new(1, points)
    }

    fn make(host: Arc<RecordingHost>) -> EventSynthesizer {
        EventSynthesizer::new(host as Arc<dyn HostDocument>, &BridgeConfig::default())
    }

    // ── Gesture sequence ──────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_touching_point_produces_click_down_then_delayed_up() {
        // Arrange
        let host = Arc::new(RecordingHost::with_target(7));
        let synth = make(Arc::clone(&host));
        let start = Instant::now();

        // Act
        let started = synth.handle_frame(&frame(vec![touch("p1", 320.0, 240.0, true)]));

        // Assert: press events are synchronous
        assert_eq!(started, 1);
        assert_eq!(host.kinds(), vec![EventKind::Click, EventKind::PointerDown]);
        assert_eq!(synth.pending_releases(), 1);

        // Act: let the release timer fire
        time::sleep(Duration::from_millis(60)).await;

        // Assert
        let events = host.events.lock().unwrap();
        assert_eq!(events.len(), 3);
        let (target, up, at) = events[2];
        assert_eq!(target, ElementHandle(7));
        assert_eq!(up.kind, EventKind::PointerUp);
        assert_eq!(up.position, ScreenPoint::new(320.0, 240.0));
        let waited = at.duration_since(start);
        assert!(waited >= Duration::from_millis(50) && waited < Duration::from_millis(60));
        drop(events);
        assert_eq!(synth.pending_releases(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_events_carry_mapped_coordinates_and_touch_fields() {
        let host = Arc::new(RecordingHost::with_target(1));
        let synth = make(Arc::clone(&host));

        // Sensor (160, 120) mirrors to viewport (480, 120) at 640×480.
        synth.handle_frame(&frame(vec![touch("p1", 160.0, 120.0, true)]));
        time::sleep(Duration::from_millis(60)).await;

        for (target, ev, _) in host.events.lock().unwrap().iter() {
            assert_eq!(*target, ElementHandle(1));
            assert_eq!(ev.position, ScreenPoint::new(480.0, 120.0));
            assert!(ev.bubbles && ev.cancelable && ev.is_primary);
            assert_eq!(ev.pointer_type, PointerType::Touch);
            assert_eq!(ev.pointer_id, 1);
            assert_eq!(ev.button, 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_touching_points_are_ignored() {
        let host = Arc::new(RecordingHost::with_target(1));
        let synth = make(Arc::clone(&host));

        let started = synth.handle_frame(&frame(vec![touch("p1", 10.0, 10.0, false)]));

        assert_eq!(started, 0);
        assert!(host.kinds().is_empty());
        assert_eq!(synth.tracked_identities(), 0);
    }

    // ── Rate gate ─────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_continuous_touch_is_gated_to_one_gesture_per_interval() {
        // Arrange
        let host = Arc::new(RecordingHost::with_target(1));
        let synth = make(Arc::clone(&host));
        let f = frame(vec![touch("p1", 320.0, 240.0, true)]);

        // Act: 30 fps for just over one second
        let mut started = 0;
        for _ in 0..32 {
            started += synth.handle_frame(&f);
            time::sleep(Duration::from_millis(33)).await;
        }

        // Assert: t=0 and t=1023 ms
        assert_eq!(started, 2);
        let clicks = host.kinds().iter().filter(|k| **k == EventKind::Click).count();
        assert_eq!(clicks, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_connection_clears_rate_gate() {
        let host = Arc::new(RecordingHost::with_target(1));
        let synth = make(Arc::clone(&host));
        let p = touch("p1", 320.0, 240.0, true);

        assert_eq!(synth.handle_frame(&Frame::new(1, vec![p.clone()])), 1);
        assert_eq!(synth.handle_frame(&Frame::new(1, vec![p.clone()])), 0);
        assert_eq!(synth.handle_frame(&Frame::new(2, vec![p])), 1);
        assert_eq!(synth.tracked_identities(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_is_consulted_before_hit_test() {
        // Arrange: the host is only ever asked once, although two frames arrive.
        let mut host = MockHost::new();
        host.expect_viewport().returning(|| Extent::new(640.0, 480.0));
        host.expect_hit_test().times(1).returning(|_| None);
        host.expect_dispatch().never();
        let synth = EventSynthesizer::new(Arc::new(host), &BridgeConfig::default());
        let f = frame(vec![touch("p1", 320.0, 240.0, true)]);

        // Act
        synth.handle_frame(&f);
        synth.handle_frame(&f);

        // Assert: a miss still consumes the interval
        assert_eq!(synth.tracked_identities(), 1);
    }

    // ── Hit-test ──────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_hit_test_receives_mapped_point_and_miss_skips_only_that_point() {
        // Arrange
        let mut host = MockHost::new();
        let mut seq = Sequence::new();
        host.expect_viewport().returning(|| Extent::new(1280.0, 960.0));
        host.expect_hit_test()
            .with(eq(ScreenPoint::new(1280.0, 0.0)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| None);
        host.expect_hit_test()
            .with(eq(ScreenPoint::new(640.0, 480.0)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Some(ElementHandle(9)));
        host.expect_dispatch()
            .withf(|target, ev| *target == ElementHandle(9) && ev.kind == EventKind::Click)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        host.expect_dispatch()
            .withf(|target, ev| *target == ElementHandle(9) && ev.kind == EventKind::PointerDown)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        let synth = EventSynthesizer::new(Arc::new(host), &BridgeConfig::default());

        // Act
        let started = synth.handle_frame(&frame(vec![
            touch("miss", 0.0, 0.0, true),
            touch("hit", 320.0, 240.0, true),
        ]));

        // Assert
        assert_eq!(started, 1);
        assert_eq!(synth.pending_releases(), 1);
    }

    // ── Release pairing ───────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_pending_release_is_flushed_before_next_press_for_same_id() {
        // Arrange: gate shorter than the release delay so presses can overlap
        let host = Arc::new(RecordingHost::with_target(3));
        let config = BridgeConfig {
            debounce_interval: Duration::from_millis(10),
            pointer_release_delay: Duration::from_millis(50),
            ..Default::default()
        };
        let synth = EventSynthesizer::new(Arc::clone(&host) as Arc<dyn HostDocument>, &config);
        let f = frame(vec![touch("p1", 320.0, 240.0, true)]);

        // Act
        synth.handle_frame(&f);
        time::sleep(Duration::from_millis(20)).await;
        synth.handle_frame(&f);
        time::sleep(Duration::from_millis(200)).await;

        // Assert: strictly alternating, no release fired twice
        assert_eq!(
            host.kinds(),
            vec![
                EventKind::Click,
                EventKind::PointerDown,
                EventKind::PointerUp,
                EventKind::Click,
                EventKind::PointerDown,
                EventKind::PointerUp,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_releases_for_different_ids_are_independent() {
        let host = Arc::new(RecordingHost::with_target(3));
        let synth = make(Arc::clone(&host));

        synth.handle_frame(&frame(vec![
            touch("a", 100.0, 100.0, true),
            touch("b", 200.0, 200.0, true),
        ]));
        assert_eq!(synth.pending_releases(), 2);

        time::sleep(Duration::from_millis(60)).await;

        let ups = host.kinds().iter().filter(|k| **k == EventKind::PointerUp).count();
        assert_eq!(ups, 2);
        assert_eq!(synth.pending_releases(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_failure_does_not_abort_gesture() {
        // Arrange: clicks fail, pointer events succeed
        let host = Arc::new(RecordingHost {
            target: Some(ElementHandle(1)),
            fail_kind: Some(EventKind::Click),
            ..Default::default()
        });
        let synth = make(Arc::clone(&host));

        // Act
        synth.handle_frame(&frame(vec![touch("p1", 320.0, 240.0, true)]));
        time::sleep(Duration::from_millis(60)).await;

        // Assert
        assert_eq!(host.kinds(), vec![EventKind::PointerDown, EventKind::PointerUp]);
    }

    /// Slow to deliver `pointerup`; records each event once dispatch returns.
    #[derive(Default)]
    struct SlowReleaseHost {
        kinds: Mutex<Vec<EventKind>>,
    }

    impl HostDocument for SlowReleaseHost {
        fn viewport(&self) -> Extent {
            Extent::new(640.0, 480.0)
        }

        fn hit_test(&self, _point: ScreenPoint) -> Option<ElementHandle> {
            Some(ElementHandle(1))
        }

        fn dispatch(&self, _target: ElementHandle, event: &SyntheticEvent) -> Result<(), HostError> {
            if event.kind == EventKind::PointerUp {
                std::thread::sleep(Duration::from_millis(100));
            }
            self.kinds.lock().unwrap().push(event.kind);
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_press_waits_for_release_already_being_delivered_on_another_thread() {
        // Arrange: the timer fires at 10 ms and spends 100 ms inside dispatch
        let host = Arc::new(SlowReleaseHost::default());
        let config = BridgeConfig {
            debounce_interval: Duration::from_millis(1),
            pointer_release_delay: Duration::from_millis(10),
            ..Default::default()
        };
        let synth = EventSynthesizer::new(Arc::clone(&host) as Arc<dyn HostDocument>, &config);
        let f = frame(vec![touch("p1", 320.0, 240.0, true)]);

        // Act: press again while the first release is mid-dispatch
        synth.handle_frame(&f);
        time::sleep(Duration::from_millis(40)).await;
        synth.handle_frame(&f);

        // Assert: the first release landed before the second press
        let kinds = host.kinds.lock().unwrap().clone();
        assert_eq!(
            kinds,
            vec![
                EventKind::Click,
                EventKind::PointerDown,
                EventKind::PointerUp,
                EventKind::Click,
                EventKind::PointerDown,
            ]
        );
    }
}
