use std::io::{Cursor, Write as _};
use std::path::Path;

use anyhow::Context as _;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;

use crate::foundation::core::{ArtifactKind, ImageFormat};
use crate::foundation::error::{PageDiffError, PageDiffResult};

/// Create `path`'s parent directory if needed.
pub fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Encode `image` and move it into place at `path` in one rename.
///
/// Bytes are written to a temporary file next to the destination first, so concurrent writers
/// racing on the same path never leave a truncated file behind: readers observe either the old
/// file or a complete new one.
pub fn write_image_atomic(
    image: &DynamicImage,
    path: &Path,
    format: ImageFormat,
    jpeg_quality: u8,
    artifact: ArtifactKind,
) -> PageDiffResult<()> {
    let bytes = encode(image, format, jpeg_quality)
        .map_err(|e| PageDiffError::persist(artifact, path, e))?;
    write_bytes_atomic(path, &bytes).map_err(|e| PageDiffError::persist(artifact, path, e))
}

/// Write `bytes` to `path` via a sibling temporary file and a rename.
pub fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    ensure_parent_dir(path)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".pagediff-")
        .suffix(".partial")
        .tempfile_in(dir)
        .with_context(|| format!("create temporary file in '{}'", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("write temporary file for '{}'", path.display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync temporary file for '{}'", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("rename into '{}'", path.display()))?;
    Ok(())
}

fn encode(image: &DynamicImage, format: ImageFormat, jpeg_quality: u8) -> anyhow::Result<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            if image.color().has_alpha() {
                anyhow::bail!("jpeg cannot store an alpha channel");
            }
            let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality.clamp(1, 100));
            image.write_with_encoder(encoder).context("encode jpeg")?;
        }
        ImageFormat::Png | ImageFormat::Bmp => {
            image
                .write_to(&mut Cursor::new(&mut buf), format.to_image_format())
                .with_context(|| format!("encode {}", format.extension()))?;
        }
    }
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/io/persist.rs"]
mod tests;
