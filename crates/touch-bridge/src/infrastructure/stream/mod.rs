//! Sensor stream transport: the WebSocket client and its subscriber fan-out.

pub mod client;
pub mod subscribers;

pub use client::{ConnectionState, StreamError, TouchStreamClient};
pub use subscribers::{FrameCallback, FrameSubscribers, Subscription};
