//! Optional TOML configuration file.
//!
//! Every key is optional; anything missing keeps its built-in default.
//!
//! ```toml
//! [sensor]
//! endpoint = "ws://localhost:8000/ws/touches"
//! reconnect_ms = 1000
//! debounce_ms = 1000
//! release_ms = 50
//! width = 640
//! height = 480
//!
//! [scene]
//! viewport_width = 1280
//! viewport_height = 960
//!
//! [[scene.elements]]
//! name = "start-button"
//! x = 560
//! y = 400
//! width = 160
//! height = 160
//! z = 1
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use touch_core::Extent;

use crate::domain::BridgeConfig;
use crate::infrastructure::host::ElementSpec;

/// Viewport used by the headless scene when none is configured.
pub const DEFAULT_VIEWPORT: Extent = Extent::new(1280.0, 960.0);

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level file layout.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub sensor: SensorSection,
    #[serde(default)]
    pub scene: SceneSection,
}

/// Connection and gesture timing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorSection {
    pub endpoint: Option<String>,
    pub reconnect_ms: Option<u64>,
    pub debounce_ms: Option<u64>,
    pub release_ms: Option<u64>,
    /// Native frame width of the sensor in pixels.
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// The headless host document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneSection {
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

fn default_viewport_width() -> f64 {
    DEFAULT_VIEWPORT.width
}
fn default_viewport_height() -> f64 {
    DEFAULT_VIEWPORT.height
}

impl Default for SceneSection {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            elements: Vec::new(),
        }
    }
}

impl SceneSection {
    pub fn viewport(&self) -> Extent {
        Extent::new(self.viewport_width, self.viewport_height)
    }
}

impl ConfigFile {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Io`] if the file cannot be read and
    /// [`ConfigFileError::Parse`] if it is not valid for this layout.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Parse`] on malformed TOML or unknown keys.
    pub fn parse(text: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(text)?)
    }

    /// Overlays the `[sensor]` values that are present onto `config`.
    pub fn apply_to(&self, config: &mut BridgeConfig) {
        let s = &self.sensor;
        if let Some(endpoint) = &s.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(ms) = s.reconnect_ms {
            config.reconnect_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = s.debounce_ms {
            config.debounce_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = s.release_ms {
            config.pointer_release_delay = Duration::from_millis(ms);
        }
        if let Some(width) = s.width {
            config.sensor_extent.width = width;
        }
        if let Some(height) = s.height {
            config.sensor_extent.height = height;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
