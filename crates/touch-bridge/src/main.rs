//! touch-bridge: drives a headless host document from a depth-sensor touch
//! stream.
//!
//! # Usage
//!
//! ```text
//! touch-bridge [OPTIONS]
//!
//! Options:
//!   --config <PATH>            TOML configuration file
//!   --endpoint <URL>           Sensor service WebSocket URL
//!   --reconnect-ms <MS>        Wait between connection attempts
//!   --debounce-ms <MS>         Minimum time between gestures per touch id
//!   --release-ms <MS>          Delay between pointerdown and pointerup
//!   --viewport-width <PX>      Width of the headless scene
//!   --viewport-height <PX>     Height of the headless scene
//! ```
//!
//! Precedence, lowest first: built-in defaults, the config file, environment
//! variables, command-line flags.
//!
//! | Variable              | Flag               |
//! |-----------------------|--------------------|
//! | `TOUCH_CONFIG`        | `--config`         |
//! | `TOUCH_ENDPOINT`      | `--endpoint`       |
//! | `TOUCH_RECONNECT_MS`  | `--reconnect-ms`   |
//! | `TOUCH_DEBOUNCE_MS`   | `--debounce-ms`    |
//! | `TOUCH_RELEASE_MS`    | `--release-ms`     |
//!
//! Log verbosity comes from `RUST_LOG` (default `info`).  Use
//! `RUST_LOG=touch_bridge=debug` to see overlay markers and every frame.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use touch_bridge::application::{DebugOverlay, EventSynthesizer, HostDocument, OverlaySurface};
use touch_bridge::domain::{config::validate_extent, BridgeConfig};
use touch_bridge::infrastructure::config_file::{ConfigFile, SceneSection};
use touch_bridge::infrastructure::host::SceneDocument;
use touch_bridge::infrastructure::overlay::TracingOverlay;
use touch_bridge::infrastructure::stream::TouchStreamClient;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Sensor touch-stream bridge.
///
/// Connects to the sensor service, logs a debug overlay for every frame, and
/// taps the scene element under every touching point.
#[derive(Debug, Parser)]
#[command(
    name = "touch-bridge",
    about = "Turns depth-sensor touch points into synthetic pointer gestures",
    version
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "TOUCH_CONFIG")]
    config: Option<PathBuf>,

    /// WebSocket URL of the sensor service.
    #[arg(long, env = "TOUCH_ENDPOINT")]
    endpoint: Option<String>,

    /// Milliseconds to wait before reconnecting after the stream drops.
    #[arg(long, env = "TOUCH_RECONNECT_MS")]
    reconnect_ms: Option<u64>,

    /// Minimum milliseconds between two gestures for the same touch id.
    #[arg(long, env = "TOUCH_DEBOUNCE_MS")]
    debounce_ms: Option<u64>,

    /// Milliseconds between pointerdown and pointerup.
    #[arg(long, env = "TOUCH_RELEASE_MS")]
    release_ms: Option<u64>,

    /// Width of the headless scene viewport in pixels.
    #[arg(long)]
    viewport_width: Option<f64>,

    /// Height of the headless scene viewport in pixels.
    #[arg(long)]
    viewport_height: Option<f64>,
}

impl Cli {
    /// Merges defaults, the config file (if any), and the flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if the
    /// merged settings fail validation.
    fn into_settings(self) -> anyhow::Result<(BridgeConfig, SceneSection)> {
        let file = match &self.config {
            Some(path) => ConfigFile::load(path)
                .with_context(|| format!("loading config file {}", path.display()))?,
            None => ConfigFile::default(),
        };

        let mut config = BridgeConfig::default();
        file.apply_to(&mut config);
        let mut scene = file.scene;

        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(ms) = self.reconnect_ms {
            config.reconnect_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.debounce_ms {
            config.debounce_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.release_ms {
            config.pointer_release_delay = Duration::from_millis(ms);
        }
        if let Some(width) = self.viewport_width {
            scene.viewport_width = width;
        }
        if let Some(height) = self.viewport_height {
            scene.viewport_height = height;
        }

        config.validate().context("invalid configuration")?;
        validate_extent("viewport", scene.viewport()).context("invalid scene")?;
        Ok((config, scene))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Frames are handled on a single thread, one at a time, in arrival order.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let (config, scene) = Cli::parse().into_settings()?;

    let viewport = scene.viewport();
    let host = Arc::new(SceneDocument::with_elements(viewport, scene.elements));
    info!(
        "touch bridge starting: sensor {}, scene {}x{} with {} element(s)",
        config.endpoint,
        viewport.width,
        viewport.height,
        host.len()
    );

    let host: Arc<dyn HostDocument> = host;
    let surface: Arc<dyn OverlaySurface> = Arc::new(TracingOverlay::new());
    let overlay = DebugOverlay::new(config.sensor_extent, Arc::clone(&host), surface);
    let synthesizer = EventSynthesizer::new(host, &config);

    let client = Arc::new(TouchStreamClient::new(&config));
    client.subscribe(move |frame| {
        overlay.render(frame);
    });
    client.subscribe(move |frame| {
        synthesizer.handle_frame(frame);
    });
    client.connect();

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("received Ctrl+C, shutting down");

    client.disconnect().await;
    info!("touch bridge stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
