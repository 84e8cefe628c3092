use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use image::DynamicImage;

use crate::foundation::core::Orientation;
use crate::foundation::error::{PageDiffError, PageDiffResult};

/// Header-level facts about a source raster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    /// Path the info was read from.
    pub path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Container format detected from the file contents, if any.
    pub format: Option<image::ImageFormat>,
}

impl ImageInfo {
    /// Orientation derived from the dimensions.
    pub fn orientation(&self) -> Orientation {
        Orientation::of(self.width, self.height)
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Where the orchestrator gets pixels from.
///
/// Implementations must be side-effect free on the source files.
pub trait ImageSource {
    /// Whether `path` names something this source can attempt to read.
    fn exists(&self, path: &Path) -> bool;

    /// Read dimensions and format without decoding pixel data.
    fn probe(&self, path: &Path) -> PageDiffResult<ImageInfo>;

    /// Decode the full raster.
    fn decode(&self, path: &Path) -> PageDiffResult<DynamicImage>;
}

type FileReader = image::ImageReader<BufReader<File>>;

/// [`ImageSource`] backed by the local filesystem; formats are sniffed from file contents.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsImageSource;

impl FsImageSource {
    fn reader(path: &Path, stage: &'static str) -> PageDiffResult<FileReader> {
        image::ImageReader::open(path)
            .map_err(|e| PageDiffError::unreadable(path, stage, image::ImageError::IoError(e)))?
            .with_guessed_format()
            .map_err(|e| PageDiffError::unreadable(path, stage, image::ImageError::IoError(e)))
    }
}

impl ImageSource for FsImageSource {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn probe(&self, path: &Path) -> PageDiffResult<ImageInfo> {
        let reader = Self::reader(path, "probe")?;
        let format = reader.format();
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| PageDiffError::unreadable(path, "probe", e))?;
        Ok(ImageInfo {
            path: path.to_path_buf(),
            width,
            height,
            format,
        })
    }

    fn decode(&self, path: &Path) -> PageDiffResult<DynamicImage> {
        Self::reader(path, "decode")?
            .decode()
            .map_err(|e| PageDiffError::unreadable(path, "decode", e))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/source.rs"]
mod tests;
