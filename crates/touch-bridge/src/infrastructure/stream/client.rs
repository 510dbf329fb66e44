//! WebSocket client for the sensor's touch stream.
//!
//! [`TouchStreamClient`] is one long-lived object.  Calling
//! [`TouchStreamClient::connect`] spawns a single connection task that:
//!
//! 1. opens a WebSocket to the configured endpoint,
//! 2. decodes every text (or UTF-8 binary) message as a [`Frame`] and hands
//!    it to every subscriber, in order, before reading the next message,
//! 3. logs and drops payloads that are not frames without closing anything,
//! 4. on close, error, or failed connect, waits the fixed reconnect delay and
//!    goes back to step 1, forever, until [`TouchStreamClient::disconnect`].
//!
//! Only the socket is replaced on reconnect.  Subscribers stay registered and
//! keep receiving frames from the new connection; each frame carries the
//! connection counter so consumers can tell connections apart.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::StreamExt;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};
use touch_core::{decode_frame, Frame};

use crate::domain::BridgeConfig;
use crate::infrastructure::stream::subscribers::{FrameSubscribers, Subscription};

type SensorSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a connection attempt or session ended.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The TCP connect or WebSocket handshake failed.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: WsError,
    },

    /// The established connection failed.
    #[error("connection error: {0}")]
    Transport(#[from] WsError),

    /// The service sent a close frame.
    #[error("connection closed by sensor service{}", close_suffix(.reason))]
    Closed { reason: Option<String> },

    /// The stream ended without a close frame.
    #[error("connection ended unexpectedly")]
    Ended,
}

fn close_suffix(reason: &Option<String>) -> String {
    reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default()
}

/// Lifecycle of the connection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// `connect` has not been called yet.
    Idle,
    /// A connection attempt is in progress.
    Connecting,
    /// Frames are being read from connection number `connection_id`.
    Connected { connection_id: u64 },
    /// Waiting out the reconnect delay.
    Reconnecting,
    /// `disconnect` was called; the task has finished.
    Stopped,
}

/// The sensor stream client.
pub struct TouchStreamClient {
    endpoint: String,
    reconnect_delay: Duration,
    subscribers: FrameSubscribers,
    connections: AtomicU64,
    started: AtomicBool,
    state: watch::Sender<ConnectionState>,
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TouchStreamClient {
    /// Creates an idle client.  Nothing happens on the network until
    /// [`TouchStreamClient::connect`] is called.
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            reconnect_delay: config.reconnect_delay,
            subscribers: FrameSubscribers::new(),
            connections: AtomicU64::new(0),
            started: AtomicBool::new(false),
            state: watch::Sender::new(ConnectionState::Idle),
            shutdown: watch::Sender::new(false),
            task: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Registers `callback` to receive every decoded frame.
    ///
    /// Callbacks run synchronously on the connection task, in the order they
    /// were registered, and must not block.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Frame) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Starts the connection task.
    ///
    /// Returns `false` (and does nothing) if the client was already started;
    /// one client owns at most one connection task for its whole life.
    /// Must be called from within a Tokio runtime.
    pub fn connect(self: &Arc<Self>) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("connect called again for {}; ignoring", self.endpoint);
            return false;
        }

        let this = Arc::clone(self);
        let shutdown = self.shutdown.subscribe();
        let handle = tokio::spawn(async move { this.run(shutdown).await });
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        true
    }

    /// Stops the connection task and waits for it to finish.
    ///
    /// The open socket (if any) is closed and a pending reconnect wait is
    /// abandoned.  Subscribers remain registered.  Calling this on a client
    /// that was never started is a no-op.
    pub async fn disconnect(&self) {
        self.shutdown.send_replace(true);
        let handle = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("stream task for {} ended abnormally: {e}", self.endpoint);
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// A receiver that observes every state change.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Number of connections opened so far; also the id of the latest one.
    pub fn connection_id(&self) -> u64 {
        self.connections.load(Ordering::Acquire)
    }

    // ── Connection task ───────────────────────────────────────────────────────

    async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!("touch stream starting for {}", self.endpoint);

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.state.send_replace(ConnectionState::Connecting);
            let attempt = tokio::select! {
                result = connect_async(self.endpoint.as_str()) => result,
                _ = shutdown.changed() => break,
            };

            match attempt {
                Ok((socket, _response)) => {
                    let connection_id = self.connections.fetch_add(1, Ordering::AcqRel) + 1;
                    info!("connected to {} (connection {connection_id})", self.endpoint);
                    self.state
                        .send_replace(ConnectionState::Connected { connection_id });

                    match self.read_frames(socket, connection_id, &mut shutdown).await {
                        Ok(()) => break,
                        Err(e) => warn!(
                            "{e}; reconnecting to {} in {:?}",
                            self.endpoint, self.reconnect_delay
                        ),
                    }
                }
                Err(source) => {
                    let e = StreamError::Connect {
                        endpoint: self.endpoint.clone(),
                        source,
                    };
                    warn!("{e}; retrying in {:?}", self.reconnect_delay);
                }
            }

            self.state.send_replace(ConnectionState::Reconnecting);
            tokio::select! {
                _ = time::sleep(self.reconnect_delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        self.state.send_replace(ConnectionState::Stopped);
        info!("touch stream for {} stopped", self.endpoint);
    }

    /// Reads messages until the connection ends (`Err`) or shutdown is
    /// requested (`Ok`).
    async fn read_frames(
        &self,
        mut socket: SensorSocket,
        connection_id: u64,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), StreamError> {
        loop {
            let next = tokio::select! {
                msg = socket.next() => msg,
                _ = shutdown.changed() => {
                    if let Err(e) = socket.close(None).await {
                        debug!("close handshake with {} failed: {e}", self.endpoint);
                    }
                    return Ok(());
                }
            };

            match next {
                Some(Ok(WsMessage::Text(text))) => self.handle_payload(text.as_bytes(), connection_id),
                Some(Ok(WsMessage::Binary(bytes))) => self.handle_payload(&bytes, connection_id),
                Some(Ok(WsMessage::Close(frame))) => {
                    return Err(StreamError::Closed {
                        reason: frame
                            .map(|f| f.reason.to_string())
                            .filter(|r| !r.is_empty()),
                    });
                }
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                    return Err(StreamError::Ended);
                }
                Some(Err(e)) => return Err(StreamError::Transport(e)),
                None => return Err(StreamError::Ended),
            }
        }
    }

    /// Decodes one payload and fans it out; bad payloads are logged and dropped.
    fn handle_payload(&self, payload: &[u8], connection_id: u64) {
        match decode_frame(payload, connection_id) {
            Ok(frame) => {
                debug!(
                    "connection {connection_id}: frame with {} point(s)",
                    frame.len()
                );
                self.subscribers.publish(&frame);
            }
            Err(e) => warn!("connection {connection_id}: dropping invalid frame: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TouchStreamClient {
        TouchStreamClient::new(&BridgeConfig::default())
    }

    #[test]
    fn test_new_client_is_idle_with_no_connections() {
        let c = client();
        assert_eq!(c.state(), ConnectionState::Idle);
        assert_eq!(c.connection_id(), 0);
        assert_eq!(c.endpoint(), "ws://localhost:8000/ws/touches");
    }

    #[test]
    fn test_valid_payload_is_published_with_connection_id() {
        // Arrange
        let c = client();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);
        c.subscribe(move |f: &Frame| seen_cb.lock().unwrap().push((f.connection_id, f.len())));

        // Act
        c.handle_payload(br#"[{"id":"p1","is_touching":true,"2d_x_px":1,"2d_y_px":2}]"#, 4);

        // Assert
        assert_eq!(*seen.lock().unwrap(), vec![(4, 1)]);
    }

    #[test]
    fn test_invalid_payloads_are_dropped_silently_for_subscribers() {
        let c = client();
        let calls = Arc::new(AtomicU64::new(0));
        let calls_cb = Arc::clone(&calls);
        c.subscribe(move |_| {
            calls_cb.fetch_add(1, Ordering::Relaxed);
        });

        c.handle_payload(br#""hello""#, 1);
        c.handle_payload(b"{not json", 1);
        c.handle_payload(br#"{"id":"p1"}"#, 1);

        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_empty_array_is_a_valid_frame() {
        let c = client();
        let calls = Arc::new(AtomicU64::new(0));
        let calls_cb = Arc::clone(&calls);
        c.subscribe(move |_| {
            calls_cb.fetch_add(1, Ordering::Relaxed);
        });

        c.handle_payload(b"[]", 1);

        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_repeated_id_frame_still_reaches_overlay_with_every_marker() {
        // Arrange
        use crate::application::{DebugOverlay, HostDocument, OverlaySurface};
        use crate::infrastructure::host::RecordingDocument;
        use crate::infrastructure::overlay::RecordingOverlay;
        use touch_core::Extent;

        let c = client();
        let host = Arc::new(RecordingDocument::new(Extent::new(640.0, 480.0), None));
        let surface = Arc::new(RecordingOverlay::new());
        let overlay = DebugOverlay::new(
            Extent::new(640.0, 480.0),
            host as Arc<dyn HostDocument>,
            Arc::clone(&surface) as Arc<dyn OverlaySurface>,
        );
        c.subscribe(move |f: &Frame| {
            overlay.render(f);
        });

        // Act
        c.handle_payload(
            br#"[{"id":"a","is_touching":true,"2d_x_px":1,"2d_y_px":1},
                 {"id":"a","is_touching":false,"2d_x_px":5,"2d_y_px":5}]"#,
            1,
        );

        // Assert
        assert_eq!(surface.redraws(), 1);
        assert_eq!(surface.last().unwrap().len(), 2);
    }

    #[test]
    fn test_closed_error_message_includes_reason() {
        let e = StreamError::Closed {
            reason: Some("server restart".to_string()),
        };
        assert_eq!(e.to_string(), "connection closed by sensor service (server restart)");
        let e = StreamError::Closed { reason: None };
        assert_eq!(e.to_string(), "connection closed by sensor service");
    }

    #[tokio::test]
    async fn test_disconnect_before_connect_is_noop() {
        let c = client();
        c.disconnect().await;
        assert_eq!(c.state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_connect_is_idempotent() {
        // Arrange: nothing listens on port 1; the task just keeps retrying
        let c = Arc::new(TouchStreamClient::new(&BridgeConfig {
            endpoint: "ws://127.0.0.1:1/ws/touches".to_string(),
            reconnect_delay: Duration::from_secs(60),
            ..Default::default()
        }));

        // Act
        let first = c.connect();
        let second = c.connect();
        c.disconnect().await;

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(c.state(), ConnectionState::Stopped);
        assert_eq!(c.connection_id(), 0);
    }
}
