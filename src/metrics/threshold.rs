use image::GrayImage;
use imageproc::contrast::{ThresholdType, otsu_level};

use crate::metrics::ssim::DiffMap;

/// Foreground value in a [`BinaryMask`].
pub const FOREGROUND: u8 = 255;
/// Background value in a [`BinaryMask`].
pub const BACKGROUND: u8 = 0;

/// Grayscale raster whose pixels are all [`FOREGROUND`] or [`BACKGROUND`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    image: GrayImage,
}

impl BinaryMask {
    /// Mask width.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Mask height.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Whether `(x, y)` is foreground.
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] == FOREGROUND
    }

    /// Number of foreground pixels.
    pub fn foreground_count(&self) -> usize {
        self.image.as_raw().iter().filter(|&&v| v == FOREGROUND).count()
    }

    /// Borrow the mask as an 8-bit image.
    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}

/// Mask plus the level that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Binarized {
    /// Otsu level; intensities strictly above it became foreground.
    pub threshold: u8,
    /// Resulting mask.
    pub mask: BinaryMask,
}

/// Turn a similarity map into a mask whose foreground marks the regions that differ.
///
/// The map is first rendered as dissimilarity (`round((1 - s) * 255)`) so that differing
/// pixels are bright; see [`binarize_intensity`] for the thresholding rule.
#[tracing::instrument(skip_all, fields(width = diff.width(), height = diff.height()))]
pub fn binarize(diff: &DiffMap) -> Binarized {
    binarize_intensity(&diff.to_dissimilarity_image())
}

/// Threshold an 8-bit dissimilarity image at its Otsu level.
///
/// Pixels strictly brighter than the level become [`FOREGROUND`]; the rest become
/// [`BACKGROUND`]. The level is recomputed from the histogram on every call and is `0` when
/// only one intensity is present. Feeding a mask back in reproduces it unchanged.
pub fn binarize_intensity(intensity: &GrayImage) -> Binarized {
    let threshold = otsu_level(intensity);
    let image = imageproc::contrast::threshold(intensity, threshold, ThresholdType::Binary);
    tracing::debug!(threshold, "otsu threshold selected");
    Binarized {
        threshold,
        mask: BinaryMask { image },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/metrics/threshold.rs"]
mod tests;
