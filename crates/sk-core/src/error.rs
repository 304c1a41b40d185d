//! Error taxonomy for the editor engine.
//!
//! Stale element ids are never errors: scene operations treat them as
//! no-ops. Everything here is rejected at a boundary (form input, upload,
//! gateway, export) before the scene is touched.

use thiserror::Error;

pub type Result<T, E = SketchError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SketchError {
    /// Palette or persisted data named a kind outside the closed set.
    #[error("unknown element kind `{0}`")]
    UnknownKind(String),

    /// Upload was not a JPEG, PNG, or GIF.
    #[error("unsupported file type `{0}`: choose a JPEG, PNG, or GIF image")]
    UnsupportedMedia(String),

    /// Upload claimed an image type but the bytes do not decode.
    #[error("could not read image `{file}`: {source}")]
    Decode {
        file: String,
        #[source]
        source: image::ImageError,
    },

    /// A properties-form field failed to parse.
    #[error("invalid value `{value}` for {field}")]
    InvalidValue { field: &'static str, value: String },

    /// The persistence gateway rejected a load or save.
    #[error("project `{project}`: {message}")]
    Gateway { project: String, message: String },

    #[error("malformed scene document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bundle export failed: {0}")]
    Bundle(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SketchError {
    pub fn gateway(project: &str, message: impl Into<String>) -> Self {
        Self::Gateway {
            project: project.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid(field: &'static str, value: &str) -> Self {
        Self::InvalidValue {
            field,
            value: value.to_string(),
        }
    }
}
