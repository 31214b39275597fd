/// Platform-agnostic pointer events for one viewport.
///
/// These are fed into a [`ViewportInput`](super::ViewportInput), which
/// turns them into [`ViewportCommand`](super::ViewportCommand) values.
///
/// # Example
///
/// ```
/// use scatterview::input::{InputEvent, ViewportInput};
///
/// let mut input = ViewportInput::new();
/// let cmd = input.handle_event(InputEvent::Scroll { delta: 1.0 }, None);
/// assert!(cmd.is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to absolute viewport position.
    CursorMoved {
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Mouse button pressed or released.
    MouseButton {
        /// Which button changed.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Scroll wheel (positive = zoom in).
    Scroll {
        /// Scroll amount (positive = zoom in, negative = zoom out).
        delta: f32,
    },
    /// Modifier key state changed.
    ModifiersChanged {
        /// Whether the shift key is held.
        shift: bool,
    },
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button.
    Left,
    /// Secondary (right) mouse button.
    Right,
    /// Middle mouse button (wheel click).
    Middle,
}
