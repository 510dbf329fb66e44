//! Domain layer for touch-bridge.
//!
//! Holds the runtime configuration.  Nothing here reads files, environment
//! variables, or sockets; the infrastructure layer and `main.rs` populate
//! [`BridgeConfig`] from those sources.

pub mod config;

pub use config::{BridgeConfig, ConfigError};
