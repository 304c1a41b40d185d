//! Interaction controller: the pointer state machine for direct
//! manipulation.
//!
//! ```text
//!            down on body                      down on handle
//!   Dragging <──────────── Idle ─────────────> Resizing
//!       │                  ▲  ▲                    │
//!       └────── up ────────┘  └─────── up ─────────┘
//!                     down on canvas: Idle (deselect)
//! ```
//!
//! The controller translates input into `SceneMutation`s that the editor
//! session applies. Every move is recomputed from the snapshot taken at
//! pointer-down, so applying moves in arrival order gives last-write-wins
//! per frame with no accumulated drift.

use crate::hit::{Hit, ResizeHandle};
use crate::input::InputEvent;
use crate::session::SceneMutation;
use sk_core::id::ElementId;
use sk_core::model::{Geometry, GeometryPatch, MIN_SIZE, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Dragging,
    Resizing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Move,
    Resize(ResizeHandle),
}

/// Ephemeral record of an in-progress gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSession {
    pub element: ElementId,
    pub mode: InteractionMode,
    /// Pointer position at gesture start.
    pub pointer: (f32, f32),
    /// Element geometry at gesture start.
    pub start: Geometry,
}

#[derive(Debug, Default)]
pub struct InteractionController {
    session: Option<InteractionSession>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        match self.session.map(|s| s.mode) {
            None => InteractionState::Idle,
            Some(InteractionMode::Move) => InteractionState::Dragging,
            Some(InteractionMode::Resize(_)) => InteractionState::Resizing,
        }
    }

    pub fn session(&self) -> Option<&InteractionSession> {
        self.session.as_ref()
    }

    /// Drop any gesture in progress (scene replaced, element deleted).
    pub fn reset(&mut self) {
        self.session = None;
    }

    /// Handle an input event, returning zero or more mutations.
    /// `hit` is only consulted for pointer-down.
    pub fn handle(&mut self, event: &InputEvent, hit: Hit, scene: &Scene) -> Vec<SceneMutation> {
        match *event {
            InputEvent::PointerDown { x, y } => self.pointer_down(hit, x, y, scene),
            InputEvent::PointerMove { x, y } => self.pointer_move(x, y),
            InputEvent::PointerUp { .. } => {
                self.session = None;
                vec![]
            }
            InputEvent::Key { .. } => vec![],
        }
    }

    fn pointer_down(&mut self, hit: Hit, x: f32, y: f32, scene: &Scene) -> Vec<SceneMutation> {
        if let Some(active) = &self.session {
            // Single-pointer model: a second press mid-gesture is ignored.
            log::warn!("pointer down during active gesture on {}", active.element);
            return vec![];
        }

        let (id, mode) = match hit {
            Hit::Canvas => return vec![SceneMutation::Deselect],
            Hit::Body(id) => (id, InteractionMode::Move),
            Hit::Handle(id, handle) => (id, InteractionMode::Resize(handle)),
        };
        let Some(el) = scene.get(id) else {
            return vec![];
        };

        self.session = Some(InteractionSession {
            element: id,
            mode,
            pointer: (x, y),
            start: el.geometry,
        });

        match mode {
            InteractionMode::Move => vec![
                SceneMutation::Select(id),
                SceneMutation::BringToFront(id),
            ],
            InteractionMode::Resize(_) => vec![SceneMutation::Select(id)],
        }
    }

    fn pointer_move(&mut self, x: f32, y: f32) -> Vec<SceneMutation> {
        let Some(s) = self.session else {
            return vec![];
        };
        let dx = x - s.pointer.0;
        let dy = y - s.pointer.1;

        let patch = match s.mode {
            InteractionMode::Move => GeometryPatch::position(s.start.x + dx, s.start.y + dy),
            InteractionMode::Resize(handle) => {
                GeometryPatch::all(resize_geometry(s.start, handle, dx, dy))
            }
        };
        vec![SceneMutation::SetGeometry {
            id: s.element,
            patch,
        }]
    }
}

/// Geometry after dragging `handle` by (dx, dy) from `start`.
///
/// Edges not attached to the handle stay put. When the handle moves the top
/// or left edge, position shifts by the raw pointer delta while the size
/// shrinks by it; the size is then floored at [`MIN_SIZE`]. The floor is
/// applied to the size only, so once it engages the opposite edge is no
/// longer anchored.
pub fn resize_geometry(start: Geometry, handle: ResizeHandle, dx: f32, dy: f32) -> Geometry {
    let mut g = start;

    if handle.moves_right() {
        g.width = start.width + dx;
    } else if handle.moves_left() {
        g.width = start.width - dx;
        g.x = start.x + dx;
    }

    if handle.moves_bottom() {
        g.height = start.height + dy;
    } else if handle.moves_top() {
        g.height = start.height - dy;
        g.y = start.y + dy;
    }

    g.width = g.width.max(MIN_SIZE);
    g.height = g.height.max(MIN_SIZE);
    g
}
