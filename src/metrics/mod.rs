/// Separable window filter.
pub mod filter;
/// Structural similarity scoring.
pub mod ssim;
/// Otsu binarization of diff maps.
pub mod threshold;
