use std::fmt;

/// Page orientation derived from pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// `width > height`.
    Landscape,
    /// `width <= height` (square pages count as portrait).
    Portrait,
}

impl Orientation {
    /// Classify a `width x height` raster.
    pub fn of(width: u32, height: u32) -> Self {
        if width > height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
        })
    }
}

/// Axis-aligned bounding box of one region of difference, in pixel coordinates.
///
/// `x`/`y` is the top-left pixel; `width`/`height` count pixels (a single pixel is `1x1`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Region {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    /// Exclusive right edge.
    pub fn right(self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> u32 {
        self.y + self.height
    }

    /// Whether `other` lies entirely inside this box.
    pub fn covers(self, other: Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Straight (non-premultiplied) RGBA8 color.
pub type Rgba8 = [u8; 4];

/// Raster formats artifacts can be written in.
///
/// Format names never travel through the engine as strings; this enum is mapped to a file
/// extension and an encoder at the persistence boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossy, no alpha. Fine for diff/threshold previews.
    Jpeg,
    /// Lossless with alpha.
    Png,
    /// Uncompressed with alpha.
    Bmp,
}

impl ImageFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Bmp => "bmp",
        }
    }

    /// Whether an RGBA overlay survives a round trip through this format.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// The four artifacts a comparison persists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// SSIM map rescaled to 8-bit grayscale.
    Diff,
    /// Binary mask after thresholding.
    Threshold,
    /// Overlay for the first image.
    MarksA,
    /// Overlay for the second image.
    MarksB,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Diff => "diff",
            Self::Threshold => "threshold",
            Self::MarksA => "marks_a",
            Self::MarksB => "marks_b",
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
