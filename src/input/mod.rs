//! Input handling: pointer event types and the per-viewport processor
//! that converts them into camera and selection commands.

/// Platform-agnostic input events.
pub mod event;
/// Converts raw events into viewport commands.
pub mod processor;

pub use event::{InputEvent, MouseButton};
pub use processor::{CameraCommand, ViewportCommand, ViewportInput};
