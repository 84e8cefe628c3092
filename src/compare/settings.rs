use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::annotate::overlay::OverlayStyle;
use crate::foundation::core::{ImageFormat, Rgba8};
use crate::foundation::error::{PageDiffError, PageDiffResult};
use crate::io::naming::ArtifactFormats;
use crate::metrics::ssim::{SsimParams, SsimWindow};

/// How a comparison was requested; carried into reports as `ctype`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareKind {
    /// Pair picked by a person.
    #[default]
    Manual,
    /// Pair picked by tooling.
    Auto,
}

impl CompareKind {
    /// Report spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Auto => "auto",
        }
    }
}

/// Tunables for one [`Comparator`](crate::Comparator), loadable from JSON.
///
/// Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareSettings {
    /// SSIM window.
    pub window: SsimWindow,
    /// Dynamic range of input samples.
    pub dynamic_range: f64,
    /// Overlay stroke width in pixels.
    pub stroke_width: u32,
    /// Stroke color on the first image's overlay.
    pub color_a: Rgba8,
    /// Stroke color on the second image's overlay.
    pub color_b: Rgba8,
    /// Diff map file format.
    pub diff_format: ImageFormat,
    /// Threshold mask file format.
    pub threshold_format: ImageFormat,
    /// Overlay file format.
    pub marks_format: ImageFormat,
    /// JPEG quality (1..=100) for JPEG artifacts.
    pub jpeg_quality: u8,
    /// Reported comparison type.
    pub kind: CompareKind,
}

impl Default for CompareSettings {
    fn default() -> Self {
        let style = OverlayStyle::default();
        let formats = ArtifactFormats::default();
        Self {
            window: SsimWindow::default(),
            dynamic_range: 255.0,
            stroke_width: style.stroke_width,
            color_a: style.color_a,
            color_b: style.color_b,
            diff_format: formats.diff,
            threshold_format: formats.threshold,
            marks_format: formats.marks,
            jpeg_quality: 95,
            kind: CompareKind::Manual,
        }
    }
}

impl CompareSettings {
    /// Read and validate settings from a JSON file.
    pub fn from_json_path(path: &Path) -> PageDiffResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open settings '{}'", path.display()))?;
        let settings: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse settings JSON '{}'", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check every field for values the engine cannot honor.
    pub fn validate(&self) -> PageDiffResult<()> {
        match self.window {
            SsimWindow::Uniform { size } | SsimWindow::Gaussian { size, .. }
                if size < 3 || size.is_multiple_of(2) =>
            {
                return Err(PageDiffError::validation(format!(
                    "window size must be odd and >= 3, got {size}"
                )));
            }
            SsimWindow::Gaussian { sigma, .. } if !sigma.is_finite() || sigma <= 0.0 => {
                return Err(PageDiffError::validation("gaussian sigma must be > 0"));
            }
            _ => {}
        }
        if !self.dynamic_range.is_finite() || self.dynamic_range <= 0.0 {
            return Err(PageDiffError::validation("dynamic_range must be > 0"));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PageDiffError::validation("jpeg_quality must be in 1..=100"));
        }
        if !self.marks_format.supports_alpha() {
            return Err(PageDiffError::validation(format!(
                "marks_format '{}' cannot store transparency",
                self.marks_format.extension()
            )));
        }
        self.overlay_style().validate()
    }

    /// Scorer parameters.
    pub fn ssim_params(&self) -> SsimParams {
        SsimParams {
            window: self.window,
            dynamic_range: self.dynamic_range,
        }
    }

    /// Annotator style.
    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            stroke_width: self.stroke_width,
            color_a: self.color_a,
            color_b: self.color_b,
        }
    }

    /// Output formats for the naming collaborator.
    pub fn artifact_formats(&self) -> ArtifactFormats {
        ArtifactFormats {
            diff: self.diff_format,
            threshold: self.threshold_format,
            marks: self.marks_format,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compare/settings.rs"]
mod tests;
