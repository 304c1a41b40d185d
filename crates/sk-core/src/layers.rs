//! Layer list projection: a read-only, creation-ordered view of the scene
//! for the sidebar. Writes go back through the scene store.

use crate::id::ElementId;
use crate::model::Scene;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerEntry {
    pub id: ElementId,
    pub name: String,
    pub icon: &'static str,
    pub selected: bool,
}

/// Cached projection, rebuilt whenever the scene's outline revision moves.
/// Moves and resizes leave it alone.
#[derive(Debug, Clone, Default)]
pub struct LayerList {
    entries: Vec<LayerEntry>,
    synced_revision: Option<u64>,
}

impl LayerList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh from `scene` if it changed since the last sync.
    /// Returns `true` when the entries were rebuilt.
    pub fn sync(&mut self, scene: &Scene) -> bool {
        if self.synced_revision == Some(scene.outline_revision()) {
            return false;
        }
        let selected = scene.selected();
        self.entries = scene
            .elements()
            .iter()
            .map(|el| LayerEntry {
                id: el.id,
                name: el.name.clone(),
                icon: el.kind.icon(),
                selected: selected == Some(el.id),
            })
            .collect();
        self.synced_revision = Some(scene.outline_revision());
        true
    }

    /// Drop the cache so the next sync rebuilds, e.g. after the scene is
    /// replaced wholesale and its revisions start over.
    pub fn reset(&mut self) {
        self.synced_revision = None;
    }

    pub fn entries(&self) -> &[LayerEntry] {
        &self.entries
    }

    /// Inline rename from the list. Empty names are ignored.
    pub fn rename(&mut self, scene: &mut Scene, id: ElementId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let changed = scene.rename(id, name);
        self.sync(scene);
        changed
    }

    /// Click-to-select from the list.
    pub fn click(&mut self, scene: &mut Scene, id: ElementId) -> bool {
        let changed = scene.select(id);
        self.sync(scene);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn follows_creation_order_not_z_order() {
        let mut scene = Scene::default();
        let a = scene.create_element(ElementKind::Block, None);
        let b = scene.create_element(ElementKind::Button, None);
        scene.bring_to_front(a);

        let mut layers = LayerList::new();
        layers.sync(&scene);
        let ids: Vec<_> = layers.entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(layers.entries()[1].icon, ElementKind::Button.icon());
    }

    #[test]
    fn resyncs_only_on_change() {
        let mut scene = Scene::default();
        let mut layers = LayerList::new();
        assert!(layers.sync(&scene));
        assert!(!layers.sync(&scene));

        let id = scene.create_element(ElementKind::Paragraph, None);
        assert!(layers.sync(&scene));
        assert_eq!(layers.entries().len(), 1);

        scene.update_geometry(
            id,
            crate::model::GeometryPatch { x: Some(40.0), width: Some(90.0), ..Default::default() },
        );
        assert!(!layers.sync(&scene));

        scene.remove(id);
        assert!(layers.sync(&scene));
        assert!(layers.entries().is_empty());
    }

    #[test]
    fn reset_forgets_previous_scene() {
        let mut layers = LayerList::new();
        layers.sync(&Scene::default());

        let mut source = Scene::default();
        let id = source.create_element(ElementKind::Block, None);
        let restored = Scene::restore(source.elements().to_vec(), source.canvas());
        layers.reset();
        assert!(layers.sync(&restored));
        assert_eq!(layers.entries()[0].id, id);
    }

    #[test]
    fn rename_and_click_write_back() {
        let mut scene = Scene::default();
        let a = scene.create_element(ElementKind::Block, None);
        let b = scene.create_element(ElementKind::Block, None);
        let mut layers = LayerList::new();
        layers.sync(&scene);

        assert!(layers.rename(&mut scene, a, "  Header  "));
        assert_eq!(scene.get(a).unwrap().name, "Header");
        assert_eq!(layers.entries()[0].name, "Header");

        assert!(!layers.rename(&mut scene, a, "   "));

        assert!(layers.click(&mut scene, a));
        assert_eq!(scene.selected(), Some(a));
        assert!(layers.entries()[0].selected);
        assert!(!layers.entries().iter().any(|e| e.id == b && e.selected));
    }
}
