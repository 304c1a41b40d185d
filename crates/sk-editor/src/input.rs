//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and pen events into a unified `InputEvent`
//! consumed by the interaction controller. Coordinates are canvas-local
//! pixels. Only one pointer is tracked at a time.

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pen contact).
    PointerDown { x: f32, y: f32 },

    /// Pointer moved.
    PointerMove { x: f32, y: f32 },

    /// Pointer released.
    PointerUp { x: f32, y: f32 },

    /// Key pressed while the canvas has focus (`"Delete"`, `"Escape"`, ...).
    Key { key: String },
}

impl InputEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self::PointerDown { x, y }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::PointerUp { x, y }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y } | Self::PointerMove { x, y } | Self::PointerUp { x, y } => {
                Some((*x, *y))
            }
            Self::Key { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_of_pointer_events() {
        assert_eq!(InputEvent::down(1.0, 2.0).position(), Some((1.0, 2.0)));
        assert_eq!(InputEvent::up(3.0, 4.0).position(), Some((3.0, 4.0)));
        assert_eq!(
            InputEvent::Key {
                key: "Delete".into()
            }
            .position(),
            None
        );
    }
}
