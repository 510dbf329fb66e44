//! touch-bridge library crate.
//!
//! Connects to a depth-sensor service that streams touch points over a
//! WebSocket, draws a debug marker for every point, and turns points that are
//! touching into synthetic `click` / `pointerdown` / `pointerup` gestures on
//! whatever element of the host document lies under them.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Sensor service (JSON frames over WebSocket)
//!         ↓
//! [touch-bridge]
//!   ├── domain/           BridgeConfig and its validation
//!   ├── application/      EventSynthesizer, DebugOverlay, host capability traits
//!   └── infrastructure/
//!         ├── stream/       TouchStreamClient: connection, reconnect, fan-out
//!         ├── host/         SceneDocument (headless host) + recording mock
//!         ├── overlay       TracingOverlay + recording mock
//!         └── config_file   TOML configuration file
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `touch-core`; it reaches the host
//!   only through the [`application::HostDocument`] and
//!   [`application::OverlaySurface`] traits.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tokio-tungstenite`.

/// Domain layer: configuration types (no I/O).
pub mod domain;

/// Application layer: gesture synthesis and overlay rendering.
pub mod application;

/// Infrastructure layer: WebSocket client, host adapters, config file.
pub mod infrastructure;
