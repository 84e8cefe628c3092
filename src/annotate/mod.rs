/// Transparent overlays with region outlines.
pub mod overlay;
