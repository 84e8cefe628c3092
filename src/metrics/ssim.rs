//! Windowed structural similarity (SSIM) between two grayscale rasters.
//!
//! For every pixel the local means `μa, μb`, variances `σa², σb²` and covariance `σab` are taken
//! over a sliding window, and
//!
//! ```text
//! SSIM = (2 μa μb + C1)(2 σab + C2) / ((μa² + μb² + C1)(σa² + σb² + C2))
//! C1 = (0.01 L)²,  C2 = (0.03 L)²
//! ```
//!
//! where `L` is the dynamic range. Borders are mirrored so the map has the input's shape.

use image::{GrayImage, Luma};

use crate::foundation::error::{PageDiffError, PageDiffResult};
use crate::metrics::filter::{Kernel, filter_plane};

const K1: f64 = 0.01;
const K2: f64 = 0.03;

/// Sliding window used to gather local statistics.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SsimWindow {
    /// Flat `size x size` box; statistics use the sample (`n - 1`) covariance normalization.
    Uniform {
        /// Odd window side length.
        size: u32,
    },
    /// Gaussian-weighted `size x size` window; population covariance normalization.
    Gaussian {
        /// Odd window side length.
        size: u32,
        /// Standard deviation in pixels.
        sigma: f64,
    },
}

impl Default for SsimWindow {
    fn default() -> Self {
        Self::Uniform { size: 7 }
    }
}

impl SsimWindow {
    /// Side length of the window.
    pub fn size(self) -> u32 {
        match self {
            Self::Uniform { size } | Self::Gaussian { size, .. } => size,
        }
    }

    fn kernel(self) -> PageDiffResult<Kernel> {
        match self {
            Self::Uniform { size } => Kernel::uniform(size),
            Self::Gaussian { size, sigma } => Kernel::gaussian(size, sigma),
        }
    }

    fn covariance_norm(self) -> f64 {
        match self {
            Self::Uniform { size } => {
                let n = f64::from(size * size);
                n / (n - 1.0)
            }
            Self::Gaussian { .. } => 1.0,
        }
    }
}

/// Scorer parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SsimParams {
    /// Window shape and size.
    pub window: SsimWindow,
    /// Dynamic range `L` of the input samples (255 for 8-bit).
    pub dynamic_range: f64,
}

impl Default for SsimParams {
    fn default() -> Self {
        Self {
            window: SsimWindow::default(),
            dynamic_range: 255.0,
        }
    }
}

/// Per-pixel local similarity, clamped to `[0, 1]`.
///
/// `1.0` means locally identical; values near `0` mean locally different.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffMap {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl DiffMap {
    /// Build a map from row-major values. Values are clamped to `[0, 1]`.
    pub fn from_values(width: u32, height: u32, values: Vec<f32>) -> PageDiffResult<Self> {
        if values.len() != (width as usize) * (height as usize) {
            return Err(PageDiffError::validation(format!(
                "diff map expects {width}x{height} values, got {}",
                values.len()
            )));
        }
        let values = values
            .into_iter()
            .map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) })
            .collect();
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Map width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Map height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Similarity at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Row-major similarity values.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// 8-bit rendering for previews: similar pixels are bright (`round(s * 255)`).
    pub fn to_similarity_image(&self) -> GrayImage {
        self.to_gray(|v| v)
    }

    /// 8-bit rendering with the sign flipped (`round((1 - s) * 255)`), so that regions that
    /// differ are bright. This is what the binarizer thresholds.
    pub fn to_dissimilarity_image(&self) -> GrayImage {
        self.to_gray(|v| 1.0 - v)
    }

    fn to_gray(&self, f: impl Fn(f32) -> f32) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            let v = f(self.get(x, y)).clamp(0.0, 1.0);
            Luma([(v * 255.0).round() as u8])
        })
    }
}

/// Output of the scorer; immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityResult {
    /// Mean SSIM in `[-1, 1]`.
    pub score: f64,
    /// Per-pixel similarity map, same shape as the inputs.
    pub diff: DiffMap,
}

/// Score two equal-shaped grayscale images and produce the full similarity map.
///
/// `score` averages the raw SSIM values away from the borders (a margin of half a window on
/// each side) when the image is large enough, and over the whole map otherwise.
#[tracing::instrument(skip_all, fields(width = a.width(), height = a.height()))]
pub fn score_and_diff(
    a: &GrayImage,
    b: &GrayImage,
    params: &SsimParams,
) -> PageDiffResult<SimilarityResult> {
    if a.dimensions() != b.dimensions() {
        return Err(PageDiffError::ShapeMismatch {
            a: a.dimensions(),
            b: b.dimensions(),
        });
    }
    if !params.dynamic_range.is_finite() || params.dynamic_range <= 0.0 {
        return Err(PageDiffError::validation("dynamic range must be > 0"));
    }
    let (width, height) = a.dimensions();
    if width == 0 || height == 0 {
        return Err(PageDiffError::validation("cannot score an empty image"));
    }

    let kernel = params.window.kernel()?;
    let cov_norm = params.window.covariance_norm();
    let (w, h) = (width as usize, height as usize);

    let xa: Vec<f64> = a.as_raw().iter().map(|&v| f64::from(v)).collect();
    let xb: Vec<f64> = b.as_raw().iter().map(|&v| f64::from(v)).collect();
    let aa: Vec<f64> = xa.iter().map(|v| v * v).collect();
    let bb: Vec<f64> = xb.iter().map(|v| v * v).collect();
    let ab: Vec<f64> = xa.iter().zip(&xb).map(|(p, q)| p * q).collect();

    let ua = filter_plane(&xa, w, h, &kernel);
    let ub = filter_plane(&xb, w, h, &kernel);
    let uaa = filter_plane(&aa, w, h, &kernel);
    let ubb = filter_plane(&bb, w, h, &kernel);
    let uab = filter_plane(&ab, w, h, &kernel);

    let c1 = (K1 * params.dynamic_range).powi(2);
    let c2 = (K2 * params.dynamic_range).powi(2);

    let raw: Vec<f64> = (0..w * h)
        .map(|i| {
            let va = cov_norm * (uaa[i] - ua[i] * ua[i]);
            let vb = cov_norm * (ubb[i] - ub[i] * ub[i]);
            let vab = cov_norm * (uab[i] - ua[i] * ub[i]);
            let num = (2.0 * ua[i] * ub[i] + c1) * (2.0 * vab + c2);
            let den = (ua[i] * ua[i] + ub[i] * ub[i] + c1) * (va + vb + c2);
            num / den
        })
        .collect();

    let score = mean_interior(&raw, w, h, kernel.radius()).clamp(-1.0, 1.0);
    let diff = DiffMap::from_values(width, height, raw.iter().map(|&v| v as f32).collect())?;

    tracing::debug!(score, "ssim computed");
    Ok(SimilarityResult { score, diff })
}

fn mean_interior(values: &[f64], w: usize, h: usize, pad: usize) -> f64 {
    let (x0, x1, y0, y1) = if w > 2 * pad && h > 2 * pad {
        (pad, w - pad, pad, h - pad)
    } else {
        (0, w, 0, h)
    };
    let mut sum = 0.0;
    for y in y0..y1 {
        sum += values[y * w + x0..y * w + x1].iter().sum::<f64>();
    }
    sum / ((x1 - x0) * (y1 - y0)) as f64
}

#[cfg(test)]
#[path = "../../tests/unit/metrics/ssim.rs"]
mod tests;
