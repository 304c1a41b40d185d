//! WASM bridge for Sketchkit: exposes the editor session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the DOM and
//! pointer capture; every state change goes through [`SketchCanvas`], which
//! answers with plain values or JSON strings.

mod storage;

use serde::Serialize;
use sk_core::document::SceneDocument;
use sk_core::id::ElementId;
use sk_core::model::{CanvasSize, ElementKind};
use sk_core::props::PropertiesForm;
use sk_editor::input::InputEvent;
use sk_editor::interaction::InteractionState;
use sk_editor::session::{EditorConfig, EditorSession, PendingImage};
use storage::LocalStorageGateway;
use wasm_bindgen::prelude::*;

/// Key prefix for projects saved in `localStorage`.
const STORAGE_PREFIX: &str = "sketchkit:";

/// The main WASM-facing editor controller.
#[wasm_bindgen]
pub struct SketchCanvas {
    session: EditorSession,
    /// Decoded upload waiting for the size dialog.
    pending_image: Option<PendingImage>,
    gateway: LocalStorageGateway,
}

#[wasm_bindgen]
impl SketchCanvas {
    /// Create an editor over an empty canvas of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Self {
        console_error_panic_hook_setup();

        let config = EditorConfig {
            canvas: CanvasSize { width, height },
            ..Default::default()
        };
        Self {
            session: EditorSession::new(config),
            pending_image: None,
            gateway: LocalStorageGateway::new(STORAGE_PREFIX),
        }
    }

    // ─── Pointer & keyboard ──────────────────────────────────────────────

    /// Returns true if the scene changed.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.session.pointer_down(x, y)
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.session.pointer_move(x, y)
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.session.pointer_up(x, y)
    }

    /// `Delete`/`Backspace` open a delete confirmation; `Escape` cancels a
    /// confirmation or clears the selection.
    pub fn handle_key(&mut self, key: &str) -> bool {
        self.session.handle(&InputEvent::Key {
            key: key.to_string(),
        })
    }

    /// `"idle"`, `"dragging"` or `"resizing"`.
    pub fn get_interaction_state(&self) -> String {
        state_name(self.session.interaction_state()).to_string()
    }

    // ─── Scene ───────────────────────────────────────────────────────────

    /// Create an element from a palette name. Omitted coordinates center it.
    /// Returns the new id, or an empty string for an unknown kind.
    pub fn add_element(&mut self, kind: &str, x: Option<f32>, y: Option<f32>) -> String {
        self.session
            .add_element(kind, position(x, y))
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Full scene for the renderer:
    /// `{"elements":[...],"selected":"<id>"|null,"canvas":{...},"state":"idle"}`.
    pub fn get_scene_json(&self) -> String {
        let scene = self.session.scene();
        let snapshot = serde_json::json!({
            "elements": scene.elements(),
            "selected": scene.selected(),
            "canvas": scene.canvas(),
            "state": state_name(self.session.interaction_state()),
        });
        snapshot.to_string()
    }

    /// Scene revision; the page re-renders when it moves.
    pub fn get_revision(&self) -> f64 {
        self.session.scene().revision() as f64
    }

    pub fn get_selected_id(&self) -> String {
        self.session
            .scene()
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    // ─── Layers panel ────────────────────────────────────────────────────

    pub fn get_layers_json(&mut self) -> String {
        to_json(self.session.layers(), "[]")
    }

    pub fn select_layer(&mut self, id: &str) -> bool {
        self.session.select(ElementId::intern(id))
    }

    pub fn rename_layer(&mut self, id: &str, name: &str) -> bool {
        self.session.rename(ElementId::intern(id), name)
    }

    // ─── Properties panel ────────────────────────────────────────────────

    /// Form values for the selection, or `{}` when nothing is selected.
    pub fn get_selected_form(&self) -> String {
        match self.session.selected_form() {
            Some(form) => to_json(&form, "{}"),
            None => "{}".to_string(),
        }
    }

    /// Submit a form (same JSON shape as `get_selected_form`).
    /// Returns `true` if the element changed.
    pub fn submit_properties(&mut self, id: &str, json: &str) -> bool {
        let form: PropertiesForm = match serde_json::from_str(json) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("properties form: {e}");
                return false;
            }
        };
        self.session.submit_properties(ElementId::intern(id), &form)
    }

    // ─── Confirmations ───────────────────────────────────────────────────

    /// Ask to delete `id`. Returns the prompt text, or empty if `id` is gone.
    pub fn request_delete(&mut self, id: &str) -> String {
        self.session
            .request_delete(ElementId::intern(id))
            .map(|c| c.prompt())
            .unwrap_or_default()
    }

    pub fn request_clear(&mut self) -> String {
        self.session.request_clear().prompt()
    }

    /// Prompt of the open confirmation, or empty.
    pub fn get_pending_prompt(&self) -> String {
        self.session
            .pending_confirmation()
            .map(|c| c.prompt())
            .unwrap_or_default()
    }

    pub fn resolve_confirmation(&mut self, accept: bool) -> bool {
        self.session.resolve_confirmation(accept)
    }

    // ─── Image upload ────────────────────────────────────────────────────

    /// Validate an uploaded file. Returns `{"ok":true,"width":..,"height":..}`
    /// with the natural size, or `{"ok":false}` (details arrive as a
    /// notification).
    pub fn prepare_image(&mut self, file_name: &str, mime: &str, bytes: &[u8]) -> String {
        match self.session.prepare_image(file_name, mime, bytes) {
            Ok(pending) => {
                let reply = serde_json::json!({
                    "ok": true,
                    "width": pending.width,
                    "height": pending.height,
                });
                self.pending_image = Some(pending);
                reply.to_string()
            }
            Err(_) => {
                self.pending_image = None;
                r#"{"ok":false}"#.to_string()
            }
        }
    }

    /// Place the prepared image with the (possibly edited) size.
    /// Returns the new id, or empty if nothing was prepared.
    pub fn insert_image(&mut self, width: f32, height: f32, x: Option<f32>, y: Option<f32>) -> String {
        let Some(mut pending) = self.pending_image.take() else {
            return String::new();
        };
        // Non-finite overrides keep the natural size.
        if width.is_finite() {
            pending.width = width;
        }
        if height.is_finite() {
            pending.height = height;
        }
        self.session
            .insert_image(pending, position(x, y))
            .as_str()
            .to_string()
    }

    pub fn cancel_image(&mut self) {
        self.pending_image = None;
    }

    // ─── Notifications ───────────────────────────────────────────────────

    /// Drain queued `{"level","message"}` notifications as a JSON array.
    pub fn take_notifications(&mut self) -> String {
        to_json(&self.session.take_notifications(), "[]")
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    pub fn save_project(&mut self, project_id: &str) -> bool {
        self.session.save(&mut self.gateway, project_id)
    }

    pub fn load_project(&mut self, project_id: &str) -> bool {
        self.session.load(&mut self.gateway, project_id)
    }

    /// The stored-project JSON for the current scene.
    pub fn get_document_json(&self) -> String {
        self.session
            .document()
            .to_json()
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Replace the scene from a project document (e.g. fetched by the page
    /// from a remote API). Returns `false` and keeps the scene on bad input.
    pub fn load_document_json(&mut self, json: &str) -> bool {
        match SceneDocument::from_json(json) {
            Ok(doc) => {
                self.session.replace_document(doc);
                true
            }
            Err(e) => {
                log::warn!("load document: {e}");
                false
            }
        }
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Exported `index.html`. `year` defaults to the current year.
    pub fn export_html(&self, year: Option<i32>) -> String {
        self.session.export(year.unwrap_or_else(current_year)).markup
    }

    /// Exported `styles.css`, with images under `images/`.
    pub fn export_css(&self, year: Option<i32>) -> String {
        self.session.export(year.unwrap_or_else(current_year)).stylesheet
    }

    /// Single self-contained document with inline styles and embedded
    /// images, for a preview iframe.
    pub fn preview_html(&self, year: Option<i32>) -> String {
        self.session.preview(year.unwrap_or_else(current_year))
    }

    /// Zip bundle bytes; empty on failure.
    pub fn export_bundle(&mut self, year: Option<i32>) -> Vec<u8> {
        self.session
            .bundle(year.unwrap_or_else(current_year))
            .unwrap_or_default()
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn position(x: Option<f32>, y: Option<f32>) -> Option<(f32, f32)> {
    x.zip(y)
}

fn state_name(state: InteractionState) -> &'static str {
    match state {
        InteractionState::Idle => "idle",
        InteractionState::Dragging => "dragging",
        InteractionState::Resizing => "resizing",
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string())
}

fn current_year() -> i32 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::new_0().get_full_year() as i32
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use chrono::Datelike;
        chrono::Local::now().year()
    }
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Sketchkit WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone functions (no canvas needed) ─────────────────────────────

/// Palette entries as JSON: `[{"kind":"block","icon":"▭","width":..,"height":..}]`.
#[wasm_bindgen]
pub fn palette_json() -> String {
    let entries: Vec<_> = ElementKind::ALL
        .iter()
        .map(|&kind| {
            let t = sk_core::templates::template(kind);
            serde_json::json!({
                "kind": kind.as_str(),
                "icon": kind.icon(),
                "width": t.width,
                "height": t.height,
            })
        })
        .collect();
    serde_json::Value::Array(entries).to_string()
}
