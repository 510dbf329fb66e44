//! Infrastructure layer for touch-bridge.
//!
//! - **`stream`** – WebSocket client for the sensor service.
//! - **`host`** – host document implementations (headless scene, recorder).
//! - **`overlay`** – overlay surfaces (log output, recorder).
//! - **`config_file`** – optional TOML configuration.

pub mod config_file;
pub mod host;
pub mod overlay;
pub mod stream;
