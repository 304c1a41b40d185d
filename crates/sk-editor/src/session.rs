//! Editor session: owns the scene and routes every change to it.
//!
//! - **Canvas input** goes through the interaction controller, which emits
//!   `SceneMutation`s; the session applies them in arrival order.
//! - **Panels** (palette, layer list, properties form) call the session
//!   directly.
//! - **Destructive actions** (delete, clear) park in a pending
//!   confirmation until the user answers.
//! - **Failures** never abort editing: they become `Notification`s and the
//!   in-memory scene stays authoritative.

use crate::hit::{Hit, hit_test};
use crate::input::InputEvent;
use crate::interaction::{InteractionController, InteractionState};
use serde::Serialize;
use sk_core::bundle::bundle_bytes;
use sk_core::document::{ProjectGateway, SceneDocument};
use sk_core::emitter::{self, Export};
use sk_core::error::{Result, SketchError};
use sk_core::id::ElementId;
use sk_core::layers::{LayerEntry, LayerList};
use sk_core::media::decode_upload;
use sk_core::model::*;
use sk_core::props::PropertiesForm;

/// A scene change produced by canvas interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneMutation {
    Select(ElementId),
    Deselect,
    BringToFront(ElementId),
    SetGeometry { id: ElementId, patch: GeometryPatch },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    pub canvas: CanvasSize,
    /// Half-size of each resize handle's grab square, in pixels.
    pub handle_radius: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            handle_radius: 6.0,
        }
    }
}

/// A destructive action waiting for a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Delete(ElementId),
    Clear,
}

impl Confirmation {
    pub fn prompt(&self) -> String {
        match self {
            Self::Delete(id) => format!("Delete element {id}?"),
            Self::Clear => "Clear the whole canvas? This cannot be undone.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Non-blocking message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// A decoded upload awaiting placement. Width and height start at the
/// image's natural size and may be edited before insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    pub media: MediaRef,
    pub width: f32,
    pub height: f32,
}

pub struct EditorSession {
    scene: Scene,
    controller: InteractionController,
    layers: LayerList,
    config: EditorConfig,
    pending: Option<Confirmation>,
    notifications: Vec<Notification>,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_scene(Scene::new(config.canvas), config)
    }

    pub fn with_scene(scene: Scene, config: EditorConfig) -> Self {
        let mut layers = LayerList::new();
        layers.sync(&scene);
        Self {
            scene,
            controller: InteractionController::new(),
            layers,
            config,
            pending: None,
            notifications: Vec::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.controller.state()
    }

    pub fn layers(&mut self) -> &[LayerEntry] {
        self.layers.sync(&self.scene);
        self.layers.entries()
    }

    /// Properties form for the current selection.
    pub fn selected_form(&self) -> Option<PropertiesForm> {
        self.scene.selected_element().map(PropertiesForm::from_element)
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NotificationLevel::Info => log::info!("{message}"),
            NotificationLevel::Error => log::warn!("{message}"),
        }
        self.notifications.push(Notification { level, message });
    }

    fn fail(&mut self, err: &SketchError) {
        self.notify(NotificationLevel::Error, err.to_string());
    }

    /// Drain queued notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // ─── Palette ─────────────────────────────────────────────────────────

    /// Create an element from a palette name. Unknown names are reported
    /// and leave the scene unchanged.
    pub fn add_element(&mut self, kind: &str, pos: Option<(f32, f32)>) -> Result<ElementId> {
        match kind.parse::<ElementKind>() {
            Ok(kind) => Ok(self.add_kind(kind, pos)),
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub fn add_kind(&mut self, kind: ElementKind, pos: Option<(f32, f32)>) -> ElementId {
        let id = self.scene.create_element(kind, pos);
        self.layers.sync(&self.scene);
        id
    }

    // ─── Image upload ────────────────────────────────────────────────────

    /// Validate an upload; on success the caller may adjust the size before
    /// [`insert_image`](Self::insert_image).
    pub fn prepare_image(&mut self, file_name: &str, mime: &str, bytes: &[u8]) -> Result<PendingImage> {
        match decode_upload(file_name, mime, bytes) {
            Ok(media) => Ok(PendingImage {
                width: media.natural_width as f32,
                height: media.natural_height as f32,
                media,
            }),
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub fn insert_image(&mut self, pending: PendingImage, pos: Option<(f32, f32)>) -> ElementId {
        let id = self
            .scene
            .create_image(pending.media, pending.width, pending.height, pos);
        self.layers.sync(&self.scene);
        id
    }

    // ─── Canvas input ────────────────────────────────────────────────────

    /// Feed one input event. Returns `true` if the scene changed.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        if let InputEvent::Key { key } = event {
            return self.handle_key(key);
        }
        let hit = match event {
            InputEvent::PointerDown { x, y } => {
                hit_test(&self.scene, *x, *y, self.config.handle_radius)
            }
            _ => Hit::Canvas,
        };
        let mutations = self.controller.handle(event, hit, &self.scene);
        let mut changed = false;
        for m in mutations {
            changed |= self.apply_mutation(m);
        }
        changed
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.handle(&InputEvent::down(x, y))
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.handle(&InputEvent::moved(x, y))
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.handle(&InputEvent::up(x, y))
    }

    fn handle_key(&mut self, key: &str) -> bool {
        match key {
            "Delete" | "Backspace" => {
                if let Some(id) = self.scene.selected() {
                    self.request_delete(id);
                }
                false
            }
            "Escape" => {
                if self.pending.take().is_some() {
                    return false;
                }
                let had = self.scene.selected().is_some();
                self.scene.deselect();
                had
            }
            _ => false,
        }
    }

    /// Apply one mutation. Stale ids are ignored.
    pub fn apply_mutation(&mut self, mutation: SceneMutation) -> bool {
        let outline = !matches!(mutation, SceneMutation::SetGeometry { .. });
        let changed = match mutation {
            SceneMutation::Select(id) => self.scene.select(id),
            SceneMutation::Deselect => {
                let had = self.scene.selected().is_some();
                self.scene.deselect();
                had
            }
            SceneMutation::BringToFront(id) => self.scene.bring_to_front(id),
            SceneMutation::SetGeometry { id, patch } => self.scene.update_geometry(id, patch),
        };
        if changed && outline {
            self.layers.sync(&self.scene);
        }
        changed
    }

    // ─── Panels ──────────────────────────────────────────────────────────

    pub fn select(&mut self, id: ElementId) -> bool {
        self.layers.click(&mut self.scene, id)
    }

    pub fn rename(&mut self, id: ElementId, name: &str) -> bool {
        self.layers.rename(&mut self.scene, id, name)
    }

    /// Submit the properties form for `id`. Invalid values are reported
    /// and change nothing; a stale id is a silent no-op.
    pub fn submit_properties(&mut self, id: ElementId, form: &PropertiesForm) -> bool {
        match form.apply_to(&mut self.scene, id) {
            Ok(changed) => {
                self.layers.sync(&self.scene);
                changed
            }
            Err(err) => {
                self.fail(&err);
                false
            }
        }
    }

    // ─── Destructive actions ─────────────────────────────────────────────

    pub fn request_delete(&mut self, id: ElementId) -> Option<Confirmation> {
        if !self.scene.contains(id) {
            return None;
        }
        let c = Confirmation::Delete(id);
        self.pending = Some(c);
        Some(c)
    }

    pub fn request_clear(&mut self) -> Confirmation {
        self.pending = Some(Confirmation::Clear);
        Confirmation::Clear
    }

    pub fn pending_confirmation(&self) -> Option<Confirmation> {
        self.pending
    }

    /// Answer the pending confirmation. Declining leaves the scene as it
    /// was. Returns `true` if the scene changed.
    pub fn resolve_confirmation(&mut self, accept: bool) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if !accept {
            return false;
        }
        let changed = match pending {
            Confirmation::Delete(id) => {
                if self.controller.session().is_some_and(|s| s.element == id) {
                    self.controller.reset();
                }
                self.scene.remove(id).is_some()
            }
            Confirmation::Clear => {
                self.controller.reset();
                let had = !self.scene.is_empty();
                self.scene.clear();
                had
            }
        };
        self.layers.sync(&self.scene);
        changed
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn document(&self) -> SceneDocument {
        SceneDocument::capture(&self.scene)
    }

    /// Save a snapshot through `gateway`. Failure is reported, not fatal.
    pub fn save(&mut self, gateway: &mut dyn ProjectGateway, project_id: &str) -> bool {
        let doc = self.document();
        match gateway.save(project_id, &doc) {
            Ok(()) => {
                self.notify(NotificationLevel::Info, format!("Saved project {project_id}"));
                true
            }
            Err(err) => {
                self.fail(&err);
                false
            }
        }
    }

    /// Replace the scene with the stored project. On failure the current
    /// scene is kept.
    pub fn load(&mut self, gateway: &mut dyn ProjectGateway, project_id: &str) -> bool {
        match gateway.load(project_id) {
            Ok(doc) => {
                self.replace_document(doc);
                true
            }
            Err(err) => {
                self.fail(&err);
                false
            }
        }
    }

    /// Install a loaded document, abandoning any gesture and confirmation.
    pub fn replace_document(&mut self, doc: SceneDocument) {
        self.controller.reset();
        self.pending = None;
        self.scene = doc.into_scene();
        self.config.canvas = self.scene.canvas();
        self.layers.reset();
        self.layers.sync(&self.scene);
    }

    // ─── Output ──────────────────────────────────────────────────────────

    pub fn export(&self, year: i32) -> Export {
        emitter::export(&self.scene, year)
    }

    pub fn preview(&self, year: i32) -> String {
        emitter::emit_preview(&self.scene, year)
    }

    pub fn bundle(&mut self, year: i32) -> Option<Vec<u8>> {
        match bundle_bytes(&self.scene, year) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                self.fail(&err);
                None
            }
        }
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sk_core::document::MemoryGateway;

    #[test]
    fn unknown_kind_reports_and_does_not_mutate() {
        let mut session = EditorSession::default();
        let rev = session.scene().revision();
        assert!(session.add_element("marquee", None).is_err());
        assert_eq!(session.scene().revision(), rev);
        let notes = session.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
        assert!(notes[0].message.contains("marquee"));
    }

    #[test]
    fn moves_do_not_rebuild_layer_list() {
        let mut session = EditorSession::default();
        let id = session.add_kind(ElementKind::Block, None);
        session.layers();
        assert!(session.apply_mutation(SceneMutation::SetGeometry {
            id,
            patch: GeometryPatch {
                x: Some(3.0),
                ..Default::default()
            },
        }));
        assert!(!session.layers.sync(&session.scene));

        session.rename(id, "Hero");
        assert_eq!(session.layers()[0].name, "Hero");
    }

    #[test]
    fn loading_into_a_fresh_session_rebuilds_layers() {
        let mut source = EditorSession::default();
        source.add_kind(ElementKind::Block, None);
        source.add_kind(ElementKind::Button, None);
        let mut gw = MemoryGateway::new();
        assert!(source.save(&mut gw, "p"));

        let mut session = EditorSession::default();
        assert!(session.layers().is_empty());
        assert!(session.load(&mut gw, "p"));
        assert_eq!(session.layers().len(), 2);
    }

    #[test]
    fn declining_delete_keeps_element() {
        let mut session = EditorSession::default();
        let id = session.add_kind(ElementKind::Block, None);
        assert_eq!(session.request_delete(id), Some(Confirmation::Delete(id)));
        assert!(!session.resolve_confirmation(false));
        assert!(session.scene().contains(id));
        assert_eq!(session.pending_confirmation(), None);
    }

    #[test]
    fn clear_requires_confirmation() {
        let mut session = EditorSession::default();
        session.add_kind(ElementKind::Block, None);
        session.add_kind(ElementKind::Ellipse, None);
        session.request_clear();
        assert_eq!(session.scene().len(), 2);
        assert!(session.resolve_confirmation(true));
        assert!(session.scene().is_empty());
        assert!(session.layers().is_empty());
    }

    #[test]
    fn delete_key_asks_first() {
        let mut session = EditorSession::default();
        let id = session.add_kind(ElementKind::Button, None);
        session.handle(&InputEvent::Key {
            key: "Delete".into(),
        });
        assert!(session.scene().contains(id));
        assert_eq!(session.pending_confirmation(), Some(Confirmation::Delete(id)));

        session.handle(&InputEvent::Key {
            key: "Escape".into(),
        });
        assert_eq!(session.pending_confirmation(), None);
        assert_eq!(session.scene().selected(), Some(id));
    }

    #[test]
    fn delete_of_already_removed_element_is_noop() {
        let mut session = EditorSession::default();
        let id = session.add_kind(ElementKind::Block, None);
        session.request_delete(id);
        session.resolve_confirmation(true);
        assert_eq!(session.request_delete(id), None);
    }

    #[test]
    fn gateway_failure_is_a_notification() {
        let mut session = EditorSession::default();
        let id = session.add_kind(ElementKind::Block, None);
        let mut gw = MemoryGateway::new();
        assert!(!session.load(&mut gw, "missing"));
        assert!(session.scene().contains(id));
        let notes = session.take_notifications();
        assert_eq!(notes[0].level, NotificationLevel::Error);
    }

    #[test]
    fn invalid_form_is_reported() {
        let mut session = EditorSession::default();
        let id = session.add_kind(ElementKind::Block, None);
        let mut form = session.selected_form().unwrap();
        form.x = "left".into();
        assert!(!session.submit_properties(id, &form));
        assert_eq!(session.take_notifications().len(), 1);
    }
}
