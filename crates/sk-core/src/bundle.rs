//! Bundle export: `index.html`, `styles.css`, and `images/` in one zip.

use crate::emitter::{self, image_assets};
use crate::error::Result;
use crate::media::media_bytes;
use crate::model::Scene;
use std::collections::HashSet;
use std::io::{Seek, Write};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Write the bundle for `scene` into `sink`. Stylesheet image references
/// point at the `images/` entries written alongside.
pub fn write_bundle<W: Write + Seek>(scene: &Scene, year: i32, sink: W) -> Result<W> {
    let export = emitter::export(scene, year);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(sink);

    zip.start_file("index.html", options)?;
    zip.write_all(export.markup.as_bytes())?;
    zip.start_file("styles.css", options)?;
    zip.write_all(export.stylesheet.as_bytes())?;

    let assets = image_assets(scene);
    if !assets.is_empty() {
        zip.add_directory("images/", options)?;
    }
    let mut written = HashSet::new();
    for asset in &assets {
        if !written.insert(asset.path.as_str()) {
            continue;
        }
        let bytes = media_bytes(asset.media)?;
        // Already-compressed raster formats gain nothing from deflate.
        zip.start_file(
            asset.path.as_str(),
            options.compression_method(CompressionMethod::Stored),
        )?;
        zip.write_all(&bytes)?;
    }

    log::debug!(
        "bundle: {} elements, {} image files",
        scene.len(),
        written.len()
    );
    Ok(zip.finish()?)
}

/// Bundle into an in-memory buffer (browser download path).
pub fn bundle_bytes(scene: &Scene, year: i32) -> Result<Vec<u8>> {
    let cursor = write_bundle(scene, year, std::io::Cursor::new(Vec::new()))?;
    Ok(cursor.into_inner())
}
