//! Converts raw pointer events into viewport commands.
//!
//! `ViewportInput` owns the transient pointer state (cursor position,
//! drag detection, shift modifier). It sits between the window events of
//! one viewport and that viewport's camera controller.

use glam::Vec2;

use super::event::{InputEvent, MouseButton};

/// Squared pixel distance past which a press becomes a drag.
const DRAG_THRESHOLD_SQ: f32 = 1.0;

/// Orbit camera gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    /// Orbit around the target by a pixel delta.
    Rotate {
        /// Cursor movement in pixels.
        delta: Vec2,
    },
    /// Translate camera and target by a pixel delta.
    Pan {
        /// Cursor movement in pixels.
        delta: Vec2,
    },
    /// Dolly toward (positive) or away from the target.
    Zoom {
        /// Scroll amount.
        delta: f32,
    },
}

/// Command produced by [`ViewportInput`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportCommand {
    /// Move this viewport's camera.
    Camera(CameraCommand),
    /// A source marker was clicked.
    SelectSource {
        /// Index of the clicked source.
        index: usize,
    },
}

/// Pointer state machine for one viewport.
#[derive(Debug, Clone, Default)]
pub struct ViewportInput {
    cursor: Option<Vec2>,
    mouse_pressed: bool,
    shift_pressed: bool,
    dragging: bool,
    /// Marker under the cursor when the button went down.
    press_target: Option<usize>,
}

impl ViewportInput {
    /// Fresh input state: no button held, no modifiers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known cursor position in physical pixels.
    #[must_use]
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Whether the primary button is held.
    #[must_use]
    pub fn mouse_pressed(&self) -> bool {
        self.mouse_pressed
    }

    /// Whether the shift modifier is held.
    #[must_use]
    pub fn shift_pressed(&self) -> bool {
        self.shift_pressed
    }

    /// Process a raw event and return zero or one commands.
    ///
    /// `hovered_marker` is the source marker currently under the cursor,
    /// as reported by the presentation layer's picking.
    pub fn handle_event(
        &mut self,
        event: InputEvent,
        hovered_marker: Option<usize>,
    ) -> Option<ViewportCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => self.handle_cursor_moved(x, y),
            InputEvent::MouseButton { button, pressed } => {
                self.handle_mouse_button(button, pressed, hovered_marker)
            }
            InputEvent::Scroll { delta } => {
                Some(ViewportCommand::Camera(CameraCommand::Zoom { delta }))
            }
            InputEvent::ModifiersChanged { shift } => {
                self.shift_pressed = shift;
                None
            }
        }
    }

    fn handle_cursor_moved(&mut self, x: f32, y: f32) -> Option<ViewportCommand> {
        let pos = Vec2::new(x, y);
        let previous = self.cursor.replace(pos);
        if !self.mouse_pressed {
            return None;
        }
        let delta = pos - previous?;
        if delta.length_squared() > DRAG_THRESHOLD_SQ {
            self.dragging = true;
        }
        let cmd = if self.shift_pressed {
            CameraCommand::Pan { delta }
        } else {
            CameraCommand::Rotate { delta }
        };
        Some(ViewportCommand::Camera(cmd))
    }

    fn handle_mouse_button(
        &mut self,
        button: MouseButton,
        pressed: bool,
        hovered_marker: Option<usize>,
    ) -> Option<ViewportCommand> {
        if button != MouseButton::Left {
            return None;
        }
        if pressed {
            self.mouse_pressed = true;
            self.dragging = false;
            self.press_target = hovered_marker;
            return None;
        }

        self.mouse_pressed = false;
        let pressed_on = self.press_target.take();
        if std::mem::take(&mut self.dragging) {
            return None;
        }
        // Click: press and release on the same marker.
        match (pressed_on, hovered_marker) {
            (Some(down), Some(up)) if down == up => {
                Some(ViewportCommand::SelectSource { index: up })
            }
            _ => None,
        }
    }
}
