//! Bridge configuration types.
//!
//! [`BridgeConfig`] is the single source of truth for all runtime settings.
//! It is built once at startup (defaults, then the optional TOML file, then CLI
//! flags) and handed by reference to every component that needs it.

use std::time::Duration;

use thiserror::Error;
use touch_core::{Extent, DEFAULT_DEBOUNCE_INTERVAL};

/// Sensor service endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/ws/touches";

/// Native resolution of the sensor's 2D frame.
pub const DEFAULT_SENSOR_EXTENT: Extent = Extent::new(640.0, 480.0);

/// Errors found while validating a [`BridgeConfig`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The endpoint is not a `ws://` or `wss://` URL.
    #[error("sensor endpoint must start with ws:// or wss://, got {0:?}")]
    UnsupportedEndpoint(String),

    /// A width or height is zero, negative, or not finite.
    #[error("{which} extent must be positive and finite, got {width}x{height}")]
    UnusableExtent {
        which: &'static str,
        width: f64,
        height: f64,
    },
}

/// All runtime configuration for the bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// WebSocket URL of the sensor service.
    pub endpoint: String,

    /// Fixed wait between a lost connection and the next attempt.  There is
    /// no retry limit and the wait never grows.
    pub reconnect_delay: Duration,

    /// Minimum time between two gestures for the same touch identity.
    pub debounce_interval: Duration,

    /// Delay between `pointerdown` and the matching `pointerup`.
    pub pointer_release_delay: Duration,

    /// Pixel size of the sensor's native frame.
    pub sensor_extent: Extent,
}

impl Default for BridgeConfig {
    /// | Field                 | Default                           |
    /// |-----------------------|-----------------------------------|
    /// | endpoint              | `ws://localhost:8000/ws/touches`  |
    /// | reconnect_delay       | 1 second                          |
    /// | debounce_interval     | 1 second                          |
    /// | pointer_release_delay | 50 ms                             |
    /// | sensor_extent         | 640×480                           |
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reconnect_delay: Duration::from_millis(1000),
            debounce_interval: DEFAULT_DEBOUNCE_INTERVAL,
            pointer_release_delay: Duration::from_millis(50),
            sensor_extent: DEFAULT_SENSOR_EXTENT,
        }
    }
}

impl BridgeConfig {
    /// Checks the settings that would otherwise fail later at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a non-WebSocket endpoint or an unusable
    /// sensor extent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            return Err(ConfigError::UnsupportedEndpoint(self.endpoint.clone()));
        }
        validate_extent("sensor", self.sensor_extent)
    }
}

/// Rejects extents the coordinate mapper cannot divide by or scale to.
///
/// # Errors
///
/// Returns [`ConfigError::UnusableExtent`] naming `which`.
pub fn validate_extent(which: &'static str, extent: Extent) -> Result<(), ConfigError> {
    if extent.is_usable() {
        Ok(())
    } else {
        Err(ConfigError::UnusableExtent {
            which,
            width: extent.width,
            height: extent.height,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
