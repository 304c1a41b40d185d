//! Hit testing: point → resize handle, element body, or empty canvas.
//!
//! Handles of the selected element are checked first since they are drawn
//! above everything. Bodies are then checked front-to-back by `z_order`;
//! on equal rank the later-created element wins, matching paint order.

use sk_core::id::ElementId;
use sk_core::model::{Geometry, Scene};

/// One of the eight grab points on a selected element's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::N,
        ResizeHandle::NE,
        ResizeHandle::E,
        ResizeHandle::SE,
        ResizeHandle::S,
        ResizeHandle::SW,
        ResizeHandle::W,
    ];

    /// Whether dragging this handle moves the left edge.
    pub fn moves_left(&self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }

    /// Whether dragging this handle moves the right edge.
    pub fn moves_right(&self) -> bool {
        matches!(self, Self::E | Self::NE | Self::SE)
    }

    /// Whether dragging this handle moves the top edge.
    pub fn moves_top(&self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    /// Whether dragging this handle moves the bottom edge.
    pub fn moves_bottom(&self) -> bool {
        matches!(self, Self::S | Self::SE | Self::SW)
    }

    /// Centre of this handle on `g`'s bounding box.
    pub fn position(&self, g: &Geometry) -> (f32, f32) {
        let x = if self.moves_left() {
            g.x
        } else if self.moves_right() {
            g.right()
        } else {
            g.x + g.width / 2.0
        };
        let y = if self.moves_top() {
            g.y
        } else if self.moves_bottom() {
            g.bottom()
        } else {
            g.y + g.height / 2.0
        };
        (x, y)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::N => "n",
            Self::NE => "ne",
            Self::E => "e",
            Self::SE => "se",
            Self::S => "s",
            Self::SW => "sw",
            Self::W => "w",
            Self::NW => "nw",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == name)
    }
}

/// What a pointer-down landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    Handle(ElementId, ResizeHandle),
    Body(ElementId),
    Canvas,
}

/// Classify the point (px, py). `handle_radius` is the half-size of the
/// square grab area around each handle.
pub fn hit_test(scene: &Scene, px: f32, py: f32, handle_radius: f32) -> Hit {
    if let Some(el) = scene.selected_element()
        && el.template().resizable
    {
        for handle in ResizeHandle::ALL {
            let (hx, hy) = handle.position(&el.geometry);
            if (px - hx).abs() <= handle_radius && (py - hy).abs() <= handle_radius {
                return Hit::Handle(el.id, handle);
            }
        }
    }

    scene
        .elements()
        .iter()
        .enumerate()
        .filter(|(_, el)| el.geometry.contains(px, py))
        .max_by_key(|(i, el)| (el.z_order, *i))
        .map_or(Hit::Canvas, |(_, el)| Hit::Body(el.id))
}
