pub mod bundle;
pub mod document;
pub mod emitter;
pub mod error;
pub mod id;
pub mod layers;
pub mod media;
pub mod model;
pub mod props;
pub mod templates;

pub use document::{MemoryGateway, ProjectGateway, SceneDocument};
pub use emitter::{Export, ImageMode};
pub use error::{Result, SketchError};
pub use id::ElementId;
pub use layers::{LayerEntry, LayerList};
pub use model::*;
pub use props::PropertiesForm;
pub use templates::{Template, lookup, template};
