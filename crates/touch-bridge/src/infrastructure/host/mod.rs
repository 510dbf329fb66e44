//! [`HostDocument`](crate::application::HostDocument) implementations.
//!
//! - **`scene`** – [`SceneDocument`]: an in-memory document of rectangles,
//!   used by the binary when no real UI is attached.
//! - **`mock`** – [`RecordingDocument`]: records every dispatch for tests.

pub mod mock;
pub mod scene;

pub use mock::{Dispatched, RecordingDocument};
pub use scene::{ElementSpec, SceneDocument};
