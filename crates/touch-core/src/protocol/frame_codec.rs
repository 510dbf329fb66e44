//! JSON decoder for sensor frames.
//!
//! Wire format: one WebSocket message carries exactly one JSON value whose top
//! level is an array.  Each element is a touch-point record:
//!
//! ```text
//! [
//!   {"id":"p1","x":0.1,"y":0.2,"z":0.9,"is_touching":true,
//!    "name":"index","bodypart":"hand",
//!    "2d_x_px":320,"2d_y_px":240,"2d_depth":812.0},
//!   ...
//! ]
//! ```
//!
//! Anything else (a bare string, an object, invalid JSON, an element that is
//! not a touch point) is a [`FrameError`].  Frame errors are always
//! recoverable: the caller drops the frame and carries on.
//!
//! Ids are expected to be unique within a frame, but a frame that repeats one
//! is still delivered in full; the repeat is only logged.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::domain::touch::{Frame, TouchPoint};

/// Errors that can occur while decoding a frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The payload is not syntactically valid JSON.
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The payload is valid JSON but its top level is not an array.
    #[error("expected a JSON array of touch points, got {0}")]
    NotAnArray(&'static str),

    /// An element of the array is not a valid touch-point record.
    #[error("touch point #{index} is malformed: {source}")]
    InvalidPoint {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Decodes one frame from a raw message payload.
///
/// `connection_id` is stamped onto the returned [`Frame`] unchanged.
///
/// # Errors
///
/// Returns [`FrameError`] if the payload is not a JSON array of touch points.
///
/// # Examples
///
/// ```rust
/// use touch_core::decode_frame;
///
/// let frame = decode_frame(br#"[{"id":"p1","is_touching":true,"2d_x_px":1,"2d_y_px":2}]"#, 7).unwrap();
/// assert_eq!(frame.len(), 1);
/// assert_eq!(frame.connection_id, 7);
///
/// assert!(decode_frame(br#""hello""#, 7).is_err());
/// ```
pub fn decode_frame(payload: &[u8], connection_id: u64) -> Result<Frame, FrameError> {
    let value: serde_json::Value = serde_json::from_slice(payload).map_err(FrameError::InvalidJson)?;

    let elements = match value {
        serde_json::Value::Array(elements) => elements,
        other => return Err(FrameError::NotAnArray(json_type_name(&other))),
    };

    let mut seen = HashSet::with_capacity(elements.len());
    let mut points = Vec::with_capacity(elements.len());

    for (index, element) in elements.into_iter().enumerate() {
        let point = TouchPoint::deserialize(element)
            .map_err(|source| FrameError::InvalidPoint { index, source })?;
        if !seen.insert(point.id.clone()) {
            warn!("touch point id {:?} repeats within one frame", point.id);
        }
        points.push(point);
    }

    Ok(Frame::new(connection_id, points))
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
