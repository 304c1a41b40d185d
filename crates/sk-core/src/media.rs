//! Image upload boundary.
//!
//! Accepts a single JPEG, PNG, or GIF file, reads its natural size from the
//! decoder, and packs the bytes into a `data:` URL so the scene stays
//! self-contained.

use crate::error::{Result, SketchError};
use crate::model::MediaRef;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// MIME types the upload dialog accepts.
pub const ACCEPTED_MIME: &[&str] = &["image/jpeg", "image/png", "image/gif"];

fn accepted_format(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Gif
    )
}

/// Validate an uploaded file and build its [`MediaRef`].
///
/// The declared MIME type is checked first so non-images are rejected
/// without decoding; the bytes must then sniff as one of the accepted
/// formats. The stored MIME type is the sniffed one.
pub fn decode_upload(file_name: &str, mime: &str, bytes: &[u8]) -> Result<MediaRef> {
    let declared = mime.trim().to_ascii_lowercase();
    let declared = if declared == "image/jpg" {
        "image/jpeg".to_string()
    } else {
        declared
    };
    if !ACCEPTED_MIME.contains(&declared.as_str()) {
        return Err(SketchError::UnsupportedMedia(mime.to_string()));
    }

    let format = image::guess_format(bytes).map_err(|source| SketchError::Decode {
        file: file_name.to_string(),
        source,
    })?;
    if !accepted_format(format) {
        return Err(SketchError::UnsupportedMedia(
            format.to_mime_type().to_string(),
        ));
    }

    let (natural_width, natural_height) = ImageReader::with_format(Cursor::new(bytes), format)
        .into_dimensions()
        .map_err(|source| SketchError::Decode {
            file: file_name.to_string(),
            source,
        })?;

    let mime = format.to_mime_type();
    log::debug!("decoded upload {file_name}: {mime} {natural_width}x{natural_height}");

    Ok(MediaRef {
        file_name: file_name.to_string(),
        mime: mime.to_string(),
        data_url: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
        natural_width,
        natural_height,
    })
}

/// Recover the raw file bytes from a media reference's data URL.
pub fn media_bytes(media: &MediaRef) -> Result<Vec<u8>> {
    let payload = media
        .data_url
        .split_once(";base64,")
        .map(|(_, p)| p)
        .ok_or_else(|| SketchError::invalid("image data", &media.file_name))?;
    STANDARD
        .decode(payload)
        .map_err(|_| SketchError::invalid("image data", &media.file_name))
}
