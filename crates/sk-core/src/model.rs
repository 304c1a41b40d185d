//! Element model and the scene store.
//!
//! A scene is a flat, creation-ordered list of absolutely positioned
//! elements plus a single selection pointer. Stacking is tracked by an
//! explicit `z_order` rank rather than list position, so the layer list and
//! the exported markup keep creation order while the canvas paints by rank.

use crate::id::ElementId;
use crate::templates::{Template, template};
use crate::error::SketchError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Width/height floor applied by every geometry mutation.
pub const MIN_SIZE: f32 = 20.0;

// ─── Kinds ───────────────────────────────────────────────────────────────

/// The closed set of element kinds offered by the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Block,
    Button,
    Paragraph,
    Image,
    Line,
    Arrow,
    Ellipse,
}

impl ElementKind {
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Block,
        ElementKind::Button,
        ElementKind::Paragraph,
        ElementKind::Image,
        ElementKind::Line,
        ElementKind::Arrow,
        ElementKind::Ellipse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Block => "block",
            Self::Button => "button",
            Self::Paragraph => "paragraph",
            Self::Image => "image",
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Ellipse => "ellipse",
        }
    }

    /// Glyph shown next to the element in the layer list.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Block => "▭",
            Self::Button => "⏺",
            Self::Paragraph => "¶",
            Self::Image => "🖼",
            Self::Line => "─",
            Self::Arrow => "→",
            Self::Ellipse => "◯",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementKind {
    type Err = SketchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SketchError::UnknownKind(s.to_string()))
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Position and size in canvas pixels. `x`/`y` are the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Geometry {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// Partial geometry update; `None` fields are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometryPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl GeometryPatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn all(g: Geometry) -> Self {
        Self {
            x: Some(g.x),
            y: Some(g.y),
            width: Some(g.width),
            height: Some(g.height),
        }
    }
}

// ─── Media ───────────────────────────────────────────────────────────────

/// An uploaded raster image attached to an `image` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    /// Original file name, used for `images/<file_name>` on export.
    pub file_name: String,
    pub mime: String,
    /// `data:<mime>;base64,...`; the raw bytes travel inside it.
    pub data_url: String,
    pub natural_width: u32,
    pub natural_height: u32,
}

// ─── Elements ────────────────────────────────────────────────────────────

/// CSS property → value, ordered by property name.
pub type StyleMap = BTreeMap<String, String>;

/// One positioned, styled visual object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub name: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub style: StyleMap,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub classes: SmallVec<[String; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaRef>,
    #[serde(default)]
    pub z_order: i64,
}

impl Element {
    /// Instantiate from a template. The caller assigns position and rank.
    pub fn from_template(id: ElementId, t: &Template) -> Self {
        Self {
            id,
            kind: t.kind,
            name: t.kind.as_str().to_string(),
            geometry: Geometry::new(0.0, 0.0, t.width, t.height),
            style: t
                .style
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            classes: SmallVec::new(),
            content: t.content.map(str::to_string),
            media: None,
            z_order: 0,
        }
    }

    pub fn template(&self) -> &'static Template {
        template(self.kind)
    }
}

// ─── Canvas ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

// ─── Scene store ─────────────────────────────────────────────────────────

/// The editor's single source of truth: elements in creation order plus
/// the current selection.
///
/// Invariants held by every method:
/// - element ids are unique;
/// - `selected`, when set, names an element in `elements`;
/// - every width/height written through the store is at least [`MIN_SIZE`].
///
/// `revision` increments on every mutation so projections (layer list,
/// properties form) can tell when to refresh. `outline_revision` skips
/// geometry-only changes, which the layer list does not show.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    elements: Vec<Element>,
    selected: Option<ElementId>,
    canvas: CanvasSize,
    revision: u64,
    outline_revision: u64,
}

impl Scene {
    #[must_use]
    pub fn new(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            ..Default::default()
        }
    }

    /// Rebuild a scene from persisted elements. Later duplicates of an id
    /// are dropped so the uniqueness invariant survives hand-edited data.
    pub fn restore(elements: Vec<Element>, canvas: CanvasSize) -> Self {
        let mut scene = Self::new(canvas);
        for mut el in elements {
            if scene.contains(el.id) {
                log::warn!("dropping duplicate element id {}", el.id);
                continue;
            }
            el.geometry.width = el.geometry.width.max(MIN_SIZE);
            el.geometry.height = el.geometry.height.max(MIN_SIZE);
            scene.elements.push(el);
        }
        scene
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Like [`revision`](Self::revision), but unchanged by moves and resizes.
    pub fn outline_revision(&self) -> u64 {
        self.outline_revision
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Highest stacking rank in the scene (0 when empty).
    pub fn max_z(&self) -> i64 {
        self.elements.iter().map(|e| e.z_order).max().unwrap_or(0)
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.outline_revision += 1;
    }

    // ─── Creation ────────────────────────────────────────────────────────

    /// Instantiate `kind` from the template registry, place it (centered on
    /// the canvas when `pos` is `None`), stack it on top, and select it.
    pub fn create_element(&mut self, kind: ElementKind, pos: Option<(f32, f32)>) -> ElementId {
        let t = template(kind);
        let id = ElementId::fresh(kind.as_str(), |id| self.contains(id));
        let el = Element::from_template(id, t);
        self.insert(el, pos)
    }

    /// Insert an `image` element backed by an uploaded file. `width` and
    /// `height` default to the image's natural size at the upload boundary.
    pub fn create_image(
        &mut self,
        media: MediaRef,
        width: f32,
        height: f32,
        pos: Option<(f32, f32)>,
    ) -> ElementId {
        let t = template(ElementKind::Image);
        let id = ElementId::fresh(ElementKind::Image.as_str(), |id| self.contains(id));
        let mut el = Element::from_template(id, t);
        if width.is_finite() {
            el.geometry.width = width.max(MIN_SIZE);
        }
        if height.is_finite() {
            el.geometry.height = height.max(MIN_SIZE);
        }
        el.media = Some(media);
        self.insert(el, pos)
    }

    fn insert(&mut self, mut el: Element, pos: Option<(f32, f32)>) -> ElementId {
        let (x, y) = pos.filter(|(x, y)| x.is_finite() && y.is_finite()).unwrap_or((
            (self.canvas.width - el.geometry.width) / 2.0,
            (self.canvas.height - el.geometry.height) / 2.0,
        ));
        el.geometry.x = x;
        el.geometry.y = y;
        el.z_order = self.max_z() + 1;
        let id = el.id;
        log::debug!("create {} {id} at ({x}, {y})", el.kind);
        self.elements.push(el);
        self.selected = Some(id);
        self.touch();
        id
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select `id`. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: ElementId) -> bool {
        if !self.contains(id) {
            log::warn!("select: no element {id}");
            return false;
        }
        if self.selected != Some(id) {
            self.selected = Some(id);
            self.touch();
        }
        true
    }

    pub fn deselect(&mut self) {
        if self.selected.take().is_some() {
            self.touch();
        }
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Apply a partial geometry update, flooring width/height at
    /// [`MIN_SIZE`]. NaN and infinite fields are ignored. Returns `false`
    /// for stale ids.
    pub fn update_geometry(&mut self, id: ElementId, patch: GeometryPatch) -> bool {
        let Some(el) = self.get_mut(id) else {
            return false;
        };
        let finite = |v: Option<f32>| v.filter(|n| n.is_finite());
        let g = &mut el.geometry;
        if let Some(x) = finite(patch.x) {
            g.x = x;
        }
        if let Some(y) = finite(patch.y) {
            g.y = y;
        }
        if let Some(w) = finite(patch.width) {
            g.width = w.max(MIN_SIZE);
        }
        if let Some(h) = finite(patch.height) {
            g.height = h.max(MIN_SIZE);
        }
        self.revision += 1;
        true
    }

    /// Raise `id` above every other element.
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        let top = self.max_z() + 1;
        let Some(el) = self.get_mut(id) else {
            return false;
        };
        el.z_order = top;
        self.touch();
        true
    }

    /// Change the display name. The markup id is unaffected.
    pub fn rename(&mut self, id: ElementId, name: &str) -> bool {
        let Some(el) = self.get_mut(id) else {
            return false;
        };
        el.name = name.to_string();
        self.touch();
        true
    }

    pub fn set_style(&mut self, id: ElementId, property: &str, value: &str) -> bool {
        let Some(el) = self.get_mut(id) else {
            return false;
        };
        el.style.insert(property.to_string(), value.to_string());
        self.touch();
        true
    }

    pub fn remove_style(&mut self, id: ElementId, property: &str) -> bool {
        let Some(el) = self.get_mut(id) else {
            return false;
        };
        let removed = el.style.remove(property).is_some();
        if removed {
            self.touch();
        }
        removed
    }

    /// Replace the inner text. Ignored for kinds without text editing.
    pub fn set_content(&mut self, id: ElementId, text: &str) -> bool {
        let Some(el) = self.get_mut(id) else {
            return false;
        };
        if !el.template().editable_text {
            return false;
        }
        el.content = Some(text.to_string());
        self.touch();
        true
    }

    pub fn set_classes<I, S>(&mut self, id: ElementId, classes: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(el) = self.get_mut(id) else {
            return false;
        };
        el.classes = classes.into_iter().map(Into::into).collect();
        self.touch();
        true
    }

    /// Delete `id`, clearing the selection if it pointed there. Idempotent.
    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let pos = self.elements.iter().position(|e| e.id == id)?;
        let removed = self.elements.remove(pos);
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("remove {id}");
        self.touch();
        Some(removed)
    }

    /// Drop every element. Irreversible; callers gate it behind a
    /// confirmation.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.selected = None;
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_centers_and_selects() {
        let mut scene = Scene::new(CanvasSize::default());
        let id = scene.create_element(ElementKind::Block, None);
        let el = scene.get(id).unwrap();
        let t = template(ElementKind::Block);

        assert_eq!(el.geometry.x, (800.0 - t.width) / 2.0);
        assert_eq!(el.geometry.y, (600.0 - t.height) / 2.0);
        assert_eq!(el.name, "block");
        assert_eq!(scene.selected(), Some(id));
        assert_eq!(el.z_order, 1);
    }

    #[test]
    fn create_at_explicit_position() {
        let mut scene = Scene::default();
        let id = scene.create_element(ElementKind::Button, Some((10.0, 15.0)));
        let g = scene.get(id).unwrap().geometry;
        assert_eq!((g.x, g.y), (10.0, 15.0));
    }

    #[test]
    fn z_order_grows_on_create() {
        let mut scene = Scene::default();
        let a = scene.create_element(ElementKind::Block, None);
        let b = scene.create_element(ElementKind::Ellipse, None);
        assert!(scene.get(b).unwrap().z_order > scene.get(a).unwrap().z_order);
    }

    #[test]
    fn geometry_floor() {
        let mut scene = Scene::default();
        let id = scene.create_element(ElementKind::Block, None);
        scene.update_geometry(
            id,
            GeometryPatch {
                width: Some(3.0),
                height: Some(-40.0),
                ..Default::default()
            },
        );
        let g = scene.get(id).unwrap().geometry;
        assert_eq!(g.width, MIN_SIZE);
        assert_eq!(g.height, MIN_SIZE);
    }

    #[test]
    fn stale_ids_are_noops() {
        let mut scene = Scene::default();
        let ghost = ElementId::intern("ghost_element");
        assert!(!scene.select(ghost));
        assert!(!scene.rename(ghost, "x"));
        assert!(!scene.bring_to_front(ghost));
        assert!(!scene.update_geometry(ghost, GeometryPatch::position(1.0, 1.0)));
        assert!(scene.remove(ghost).is_none());
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn remove_clears_selection_and_is_idempotent() {
        let mut scene = Scene::default();
        let a = scene.create_element(ElementKind::Paragraph, None);
        assert!(scene.remove(a).is_some());
        assert!(scene.remove(a).is_none());
        assert_eq!(scene.selected(), None);
        assert!(scene.is_empty());
    }

    #[test]
    fn remove_other_keeps_selection() {
        let mut scene = Scene::default();
        let a = scene.create_element(ElementKind::Block, None);
        let b = scene.create_element(ElementKind::Block, None);
        scene.select(a);
        scene.remove(b);
        assert_eq!(scene.selected(), Some(a));
    }

    #[test]
    fn content_only_for_text_kinds() {
        let mut scene = Scene::default();
        let p = scene.create_element(ElementKind::Paragraph, None);
        let line = scene.create_element(ElementKind::Line, None);
        assert!(scene.set_content(p, "Hello"));
        assert!(!scene.set_content(line, "nope"));
        assert_eq!(scene.get(p).unwrap().content.as_deref(), Some("Hello"));
        assert_eq!(scene.get(line).unwrap().content, None);
    }

    #[test]
    fn rename_keeps_id() {
        let mut scene = Scene::default();
        let id = scene.create_element(ElementKind::Button, None);
        scene.rename(id, "Sign up");
        let el = scene.get(id).unwrap();
        assert_eq!(el.name, "Sign up");
        assert_eq!(el.id, id);
    }

    #[test]
    fn clear_empties_everything() {
        let mut scene = Scene::default();
        scene.create_element(ElementKind::Block, None);
        scene.create_element(ElementKind::Arrow, None);
        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.selected(), None);
    }

    #[test]
    fn restore_drops_duplicate_ids() {
        let mut scene = Scene::default();
        let id = scene.create_element(ElementKind::Block, None);
        let el = scene.get(id).unwrap().clone();
        let restored = Scene::restore(vec![el.clone(), el], CanvasSize::default());
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.selected(), None);
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("ellipse".parse::<ElementKind>().unwrap(), ElementKind::Ellipse);
        assert!(matches!(
            "triangle".parse::<ElementKind>(),
            Err(SketchError::UnknownKind(k)) if k == "triangle"
        ));
    }

    #[test]
    fn revision_tracks_mutations() {
        let mut scene = Scene::default();
        let r0 = scene.revision();
        let id = scene.create_element(ElementKind::Block, None);
        let r1 = scene.revision();
        assert!(r1 > r0);
        scene.select(id);
        // Already selected: nothing changed.
        assert_eq!(scene.revision(), r1);

        let outline = scene.outline_revision();
        scene.update_geometry(id, GeometryPatch { x: Some(4.0), ..Default::default() });
        assert!(scene.revision() > r1);
        assert_eq!(scene.outline_revision(), outline);
        scene.rename(id, "Card");
        assert!(scene.outline_revision() > outline);
    }

    #[test]
    fn non_finite_geometry_is_ignored() {
        let mut scene = Scene::new(CanvasSize { width: 800.0, height: 600.0 });
        let id = scene.create_element(ElementKind::Block, Some((f32::NAN, 5.0)));
        let placed = scene.get(id).unwrap().geometry;
        assert!(placed.x.is_finite() && placed.y.is_finite());

        scene.update_geometry(
            id,
            GeometryPatch {
                x: Some(f32::INFINITY),
                y: Some(7.0),
                width: Some(f32::NAN),
                height: Some(f32::NEG_INFINITY),
            },
        );
        let g = scene.get(id).unwrap().geometry;
        assert_eq!((g.x, g.y, g.width, g.height), (placed.x, 7.0, placed.width, placed.height));

        let img = scene.create_image(
            MediaRef {
                file_name: "a.png".into(),
                mime: "image/png".into(),
                data_url: "data:image/png;base64,AA==".into(),
                natural_width: 1,
                natural_height: 1,
            },
            f32::NAN,
            f32::INFINITY,
            Some((0.0, 0.0)),
        );
        let g = scene.get(img).unwrap().geometry;
        assert!(g.width.is_finite() && g.height.is_finite());
    }
}
