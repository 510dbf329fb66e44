//! Touch points and frames.
//!
//! A [`TouchPoint`] is one tracked physical contact (a hand, a fingertip) as
//! reported by the sensor service for a single frame.  A [`Frame`] is the
//! ordered batch of points delivered in one message.
//!
//! # Wire field names
//!
//! The sensor service names its pixel-space fields `2d_x_px`, `2d_y_px` and
//! `2d_depth`.  Those names are not valid Rust identifiers, so the struct uses
//! descriptive names and serde renames them.  The descriptive names
//! (`sensor_x_px`, `sensor_y_px`, `sensor_depth`) are also accepted on input.
//! When a record carries both spellings of a field, the wire name wins and the
//! descriptive one is ignored.

use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::domain::geometry::{map_to_viewport, Extent, ScreenPoint};

/// One tracked physical contact, valid for the lifetime of a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireTouchPoint")]
pub struct TouchPoint {
    /// Identity of the contact.  Unique within a frame and stable across
    /// frames for as long as the sensor keeps tracking the same contact.
    pub id: String,

    /// Sensor-space 3D position.  Passed through untouched.
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,

    /// Whether the contact currently counts as touching the surface.
    pub is_touching: bool,

    /// Display label, e.g. `"right index"`.
    #[serde(default)]
    pub name: String,

    /// Body part label, e.g. `"hand"`.
    #[serde(default)]
    pub bodypart: String,

    /// Horizontal pixel position in the sensor's native frame.
    #[serde(rename = "2d_x_px")]
    pub sensor_x_px: f64,

    /// Vertical pixel position in the sensor's native frame.
    #[serde(rename = "2d_y_px")]
    pub sensor_y_px: f64,

    /// Depth reading at the sensor pixel.
    #[serde(rename = "2d_depth")]
    pub sensor_depth: f64,
}

/// Input form of [`TouchPoint`] that sees both spellings of the pixel fields.
#[derive(Deserialize)]
struct WireTouchPoint {
    id: String,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    z: f64,
    is_touching: bool,
    #[serde(default)]
    name: String,
    #[serde(default)]
    bodypart: String,
    #[serde(rename = "2d_x_px")]
    wire_x_px: Option<f64>,
    #[serde(rename = "2d_y_px")]
    wire_y_px: Option<f64>,
    #[serde(rename = "2d_depth")]
    wire_depth: Option<f64>,
    sensor_x_px: Option<f64>,
    sensor_y_px: Option<f64>,
    sensor_depth: Option<f64>,
}

impl TryFrom<WireTouchPoint> for TouchPoint {
    type Error = String;

    fn try_from(wire: WireTouchPoint) -> Result<Self, Self::Error> {
        let sensor_x_px = wire
            .wire_x_px
            .or(wire.sensor_x_px)
            .ok_or_else(|| "missing field `2d_x_px`".to_string())?;
        let sensor_y_px = wire
            .wire_y_px
            .or(wire.sensor_y_px)
            .ok_or_else(|| "missing field `2d_y_px`".to_string())?;
        Ok(Self {
            id: wire.id,
            x: wire.x,
            y: wire.y,
            z: wire.z,
            is_touching: wire.is_touching,
            name: wire.name,
            bodypart: wire.bodypart,
            sensor_x_px,
            sensor_y_px,
            sensor_depth: wire.wire_depth.or(wire.sensor_depth).unwrap_or_default(),
        })
    }
}

impl TouchPoint {
    /// Maps this point's sensor pixel position into viewport space.
    pub fn screen_position(&self, sensor: Extent, viewport: Extent) -> ScreenPoint {
        map_to_viewport(self.sensor_x_px, self.sensor_y_px, sensor, viewport)
    }
}

/// One decoded batch of touch points plus the connection it arrived on.
///
/// `connection_id` increases every time the stream client opens a new
/// connection.  Consumers that keep per-identity state compare it with the
/// last value they saw to detect that the stream has been replaced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub connection_id: u64,
    pub points: Vec<TouchPoint>,
}

impl Frame {
    pub fn new(connection_id: u64, points: Vec<TouchPoint>) -> Self {
        Self {
            connection_id,
            points,
        }
    }
}

impl Deref for Frame {
    type Target = [TouchPoint];

    fn deref(&self) -> &[TouchPoint] {
        &self.points
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
