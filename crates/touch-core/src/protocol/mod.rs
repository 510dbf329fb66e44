//! Protocol module containing the JSON frame decoder.

pub mod frame_codec;

pub use frame_codec::{decode_frame, FrameError};
