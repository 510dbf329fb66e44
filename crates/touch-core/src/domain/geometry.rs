//! Sensor and viewport geometry.
//!
//! The sensor reports pixel positions in its own native frame (nominally
//! 640×480).  The viewport is whatever surface the bridge drives.  Because the
//! sensor faces the user, left and right are swapped: a hand on the user's
//! right appears on the sensor image's left.  [`map_to_viewport`] undoes that.

use serde::{Deserialize, Serialize};

/// Width and height of a pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns `true` if both dimensions are finite and strictly positive.
    ///
    /// The mapper divides by the sensor extent, so configuration code rejects
    /// any extent for which this is `false`.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A position in viewport pixel space.  Not rounded.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Position rounded to whole pixels, for display labels.
    pub fn rounded(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

/// Maps a sensor pixel position into viewport space.
///
/// ```text
/// screen_x = viewport.width - (sensor_x / sensor.width) * viewport.width
/// screen_y = (sensor_y / sensor.height) * viewport.height
/// ```
///
/// Pure and exact: identical inputs always give identical outputs, and no
/// rounding is applied.
///
/// # Examples
///
/// ```rust
/// use touch_core::{map_to_viewport, Extent, ScreenPoint};
///
/// let sensor = Extent::new(640.0, 480.0);
/// let viewport = Extent::new(1280.0, 480.0);
/// assert_eq!(map_to_viewport(0.0, 0.0, sensor, viewport), ScreenPoint::new(1280.0, 0.0));
/// assert_eq!(map_to_viewport(640.0, 0.0, sensor, viewport), ScreenPoint::new(0.0, 0.0));
/// ```
pub fn map_to_viewport(sensor_x: f64, sensor_y: f64, sensor: Extent, viewport: Extent) -> ScreenPoint {
    ScreenPoint {
        x: viewport.width - (sensor_x / sensor.width) * viewport.width,
        y: (sensor_y / sensor.height) * viewport.height,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
