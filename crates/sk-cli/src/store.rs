//! File-backed project gateway: one `<dir>/<project_id>.json` per project.

use sk_core::document::{ProjectGateway, SceneDocument};
use sk_core::error::{Result, SketchError};
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileGateway {
    dir: PathBuf,
}

impl FileGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a project's file. Ids that could escape `dir` are refused.
    pub fn path(&self, project_id: &str) -> Result<PathBuf> {
        let valid = !project_id.is_empty()
            && project_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
        if !valid {
            return Err(SketchError::gateway(project_id, "invalid project id"));
        }
        Ok(self.dir.join(format!("{project_id}.json")))
    }

    pub fn exists(&self, project_id: &str) -> bool {
        self.path(project_id).is_ok_and(|p| p.is_file())
    }
}

impl ProjectGateway for FileGateway {
    fn load(&mut self, project_id: &str) -> Result<SceneDocument> {
        let path = self.path(project_id)?;
        let json = fs::read_to_string(&path)
            .map_err(|e| SketchError::gateway(project_id, format!("{}: {e}", path.display())))?;
        SceneDocument::from_json(&json)
    }

    fn save(&mut self, project_id: &str, doc: &SceneDocument) -> Result<()> {
        let path = self.path(project_id)?;
        fs::create_dir_all(&self.dir)?;
        // Write-then-rename so a crash never leaves a truncated project.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, doc.to_json()?)?;
        fs::rename(&tmp, &path)?;
        log::debug!("saved {} ({} elements)", path.display(), doc.elements.len());
        Ok(())
    }
}
