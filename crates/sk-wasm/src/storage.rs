//! Browser `localStorage` as a project gateway.

use sk_core::document::{ProjectGateway, SceneDocument};
use sk_core::error::{Result, SketchError};
use web_sys::Storage;

pub struct LocalStorageGateway {
    prefix: String,
}

impl LocalStorageGateway {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }

    fn key(&self, project_id: &str) -> String {
        format!("{}{project_id}", self.prefix)
    }

    fn storage(&self, project_id: &str) -> Result<Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| SketchError::gateway(project_id, "local storage unavailable"))
    }
}

impl ProjectGateway for LocalStorageGateway {
    fn load(&mut self, project_id: &str) -> Result<SceneDocument> {
        let storage = self.storage(project_id)?;
        match storage.get_item(&self.key(project_id)) {
            Ok(Some(json)) => SceneDocument::from_json(&json),
            Ok(None) => Err(SketchError::gateway(project_id, "not found")),
            Err(e) => Err(SketchError::gateway(project_id, format!("{e:?}"))),
        }
    }

    fn save(&mut self, project_id: &str, doc: &SceneDocument) -> Result<()> {
        let storage = self.storage(project_id)?;
        let json = doc.to_json()?;
        // Quota errors surface here as a JS exception.
        storage
            .set_item(&self.key(project_id), &json)
            .map_err(|e| SketchError::gateway(project_id, format!("{e:?}")))
    }
}
