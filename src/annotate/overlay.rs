use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::foundation::core::{Region, Rgba8};
use crate::foundation::error::{PageDiffError, PageDiffResult};

/// Transparent RGBA canvas that receives region outlines for one source image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    canvas: RgbaImage,
}

impl Overlay {
    /// Fully transparent canvas of the given size.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            canvas: RgbaImage::new(width, height),
        }
    }

    /// Canvas width.
    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    /// Canvas height.
    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Straight RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        self.canvas.get_pixel(x, y).0
    }

    /// Whether `(x, y)` is untouched (alpha 0).
    pub fn is_transparent_at(&self, x: u32, y: u32) -> bool {
        self.canvas.get_pixel(x, y).0[3] == 0
    }

    /// Borrow the canvas.
    pub fn as_image(&self) -> &RgbaImage {
        &self.canvas
    }
}

/// Stroke appearance for both sides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayStyle {
    /// Stroke width in pixels, centered on the outline.
    pub stroke_width: u32,
    /// Stroke color on the first image's overlay.
    pub color_a: Rgba8,
    /// Stroke color on the second image's overlay.
    pub color_b: Rgba8,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke_width: 5,
            color_a: [255, 128, 0, 255],
            color_b: [0, 128, 255, 255],
        }
    }
}

impl OverlayStyle {
    /// Reject styles that would produce ambiguous or invisible overlays.
    pub fn validate(&self) -> PageDiffResult<()> {
        if self.stroke_width == 0 {
            return Err(PageDiffError::validation("stroke width must be > 0"));
        }
        if self.color_a == self.color_b {
            return Err(PageDiffError::validation(
                "overlay colors for the two sides must differ",
            ));
        }
        if self.color_a[3] != 255 || self.color_b[3] != 255 {
            return Err(PageDiffError::validation("overlay colors must be opaque"));
        }
        Ok(())
    }
}

/// Outline every region on both canvases, in each side's color.
///
/// The outline runs from `(x, y)` to `(x + width, y + height)` and the stroke is centered on
/// it, so drawn boxes enclose the region with some margin. Everything not under a stroke stays
/// fully transparent.
#[tracing::instrument(skip_all, fields(regions = regions.len()))]
pub fn annotate(
    regions: &[Region],
    mut overlay_a: Overlay,
    mut overlay_b: Overlay,
    style: &OverlayStyle,
) -> PageDiffResult<(Overlay, Overlay)> {
    style.validate()?;
    for region in regions {
        stroke_rect(&mut overlay_a.canvas, *region, style.stroke_width, style.color_a);
        stroke_rect(&mut overlay_b.canvas, *region, style.stroke_width, style.color_b);
    }
    Ok((overlay_a, overlay_b))
}

fn stroke_rect(canvas: &mut RgbaImage, region: Region, stroke_width: u32, color: Rgba8) {
    let t = stroke_width as i32;
    let (x, y) = (region.x as i32, region.y as i32);
    // Outline corners are inclusive, so the nominal outline spans width + 1 pixels.
    let (w, h) = (region.width as i32 + 1, region.height as i32 + 1);

    for offset in -(t / 2)..(t - t / 2) {
        let (ow, oh) = (w + 2 * offset, h + 2 * offset);
        if ow <= 0 || oh <= 0 {
            continue;
        }
        let rect = Rect::at(x - offset, y - offset).of_size(ow as u32, oh as u32);
        draw_hollow_rect_mut(canvas, rect, Rgba(color));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/annotate/overlay.rs"]
mod tests;
