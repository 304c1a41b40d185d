//! Persistence projection and the project gateway seam.
//!
//! The gateway only ever sees a [`SceneDocument`]: elements in creation
//! order plus the canvas size. Selection and in-progress gestures stay in
//! the editor.

use crate::error::{Result, SketchError};
use crate::model::{CanvasSize, Element, Scene};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The stored shape of a project: `{"elements": [...], "canvasSize": {...}}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub canvas_size: CanvasSize,
}

impl SceneDocument {
    /// Snapshot a scene. Owned, so the scene may keep changing while a save
    /// of this snapshot is still in flight.
    pub fn capture(scene: &Scene) -> Self {
        Self {
            elements: scene.elements().to_vec(),
            canvas_size: scene.canvas(),
        }
    }

    pub fn into_scene(self) -> Scene {
        Scene::restore(self.elements, self.canvas_size)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Project storage, keyed by project id.
pub trait ProjectGateway {
    fn load(&mut self, project_id: &str) -> Result<SceneDocument>;
    fn save(&mut self, project_id: &str, doc: &SceneDocument) -> Result<()>;
}

/// In-process gateway that stores serialized JSON, so a save/load cycle
/// exercises the same encoding as the real API.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    projects: HashMap<String, String>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored JSON for a project, if any.
    pub fn raw(&self, project_id: &str) -> Option<&str> {
        self.projects.get(project_id).map(String::as_str)
    }
}

impl ProjectGateway for MemoryGateway {
    fn load(&mut self, project_id: &str) -> Result<SceneDocument> {
        let json = self
            .projects
            .get(project_id)
            .ok_or_else(|| SketchError::gateway(project_id, "not found"))?;
        SceneDocument::from_json(json)
    }

    fn save(&mut self, project_id: &str, doc: &SceneDocument) -> Result<()> {
        self.projects.insert(project_id.to_string(), doc.to_json()?);
        Ok(())
    }
}
