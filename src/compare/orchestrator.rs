use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{DynamicImage, GrayImage};

use crate::annotate::overlay::{Overlay, annotate};
use crate::compare::settings::{CompareKind, CompareSettings};
use crate::foundation::core::{ArtifactKind, Orientation, Region};
use crate::foundation::error::{PageDiffError, PageDiffResult};
use crate::foundation::timer::Timer;
use crate::io::naming::{ArtifactPaths, PageRef};
use crate::io::persist::write_image_atomic;
use crate::io::source::{FsImageSource, ImageInfo, ImageSource};
use crate::metrics::ssim::{SimilarityResult, score_and_diff};
use crate::metrics::threshold::{BinaryMask, binarize};
use crate::regions::contours::extract_regions;

/// Lifecycle of one comparison.
///
/// `Created -> Validating -> {Invalid | Scoring -> Thresholding -> Extracting -> Annotating ->
/// Persisting -> Done}`; no transition goes backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComparisonStage {
    /// Nothing has run yet.
    Created,
    /// Checking files, orientation and dimensions.
    Validating,
    /// Terminal: the pair cannot be compared.
    Invalid,
    /// Computing SSIM.
    Scoring,
    /// Binarizing the diff map.
    Thresholding,
    /// Extracting regions from the mask.
    Extracting,
    /// Drawing overlays.
    Annotating,
    /// Writing artifacts.
    Persisting,
    /// Terminal: everything computed and written.
    Done,
}

impl ComparisonStage {
    /// Lowercase stage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Validating => "validating",
            Self::Invalid => "invalid",
            Self::Scoring => "scoring",
            Self::Thresholding => "thresholding",
            Self::Extracting => "extracting",
            Self::Annotating => "annotating",
            Self::Persisting => "persisting",
            Self::Done => "done",
        }
    }

    /// Whether the stage ends the lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Invalid | Self::Done)
    }
}

impl fmt::Display for ComparisonStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a pair was judged INVALID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Incompatibility {
    /// A source file does not exist.
    MissingFile {
        /// The missing path.
        path: PathBuf,
    },
    /// One page is landscape and the other portrait.
    OrientationMismatch {
        /// Orientation of the first image.
        a: Orientation,
        /// Orientation of the second image.
        b: Orientation,
    },
    /// Same orientation, different pixel dimensions.
    DimensionMismatch {
        /// `(width, height)` of the first image.
        a: (u32, u32),
        /// `(width, height)` of the second image.
        b: (u32, u32),
    },
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFile { path } => write!(f, "missing file '{}'", path.display()),
            Self::OrientationMismatch { a, b } => write!(f, "orientation {a} vs {b}"),
            Self::DimensionMismatch { a, b } => {
                write!(f, "dimensions {}x{} vs {}x{}", a.0, a.1, b.0, b.1)
            }
        }
    }
}

/// Everything the pixel pipeline produces for a comparable pair.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffProducts {
    /// Score and similarity map.
    pub similarity: SimilarityResult,
    /// Otsu level used for the mask.
    pub threshold: u8,
    /// Foreground marks differing pixels.
    pub mask: BinaryMask,
    /// Bounding boxes of the differing regions.
    pub regions: Vec<Region>,
    /// Outlines for the first image.
    pub overlay_a: Overlay,
    /// Outlines for the second image.
    pub overlay_b: Overlay,
}

/// Result of [`Comparator::compare`]. Owned by the caller; nothing else holds a reference.
#[derive(Debug)]
pub struct ComparisonOutcome {
    /// `<stemA>_vs_<stemB>`.
    pub name: String,
    /// First source path as given.
    pub file_a: PathBuf,
    /// Second source path as given.
    pub file_b: PathBuf,
    /// Page identity parsed from the first file name.
    pub page_a: Option<PageRef>,
    /// Page identity parsed from the second file name.
    pub page_b: Option<PageRef>,
    /// Reported comparison type.
    pub kind: CompareKind,
    /// Where artifacts go (or would have gone).
    pub paths: ArtifactPaths,
    /// Last stage reached.
    pub stage: ComparisonStage,
    /// Set when the pair was INVALID.
    pub incompatibility: Option<Incompatibility>,
    /// Set for comparable pairs.
    pub products: Option<DiffProducts>,
    /// Set when computing succeeded but writing an artifact failed.
    pub persist_error: Option<PageDiffError>,
    /// Wall-clock time for validation, computation and persistence.
    pub elapsed: Duration,
    /// Local completion time (`%Y-%m-%d %H:%M`).
    pub completed_at: String,
}

impl ComparisonOutcome {
    /// Whether the pair was comparable.
    pub fn is_valid(&self) -> bool {
        self.incompatibility.is_none()
    }

    /// Mean SSIM, if computed.
    pub fn score(&self) -> Option<f64> {
        self.products.as_ref().map(|p| p.similarity.score)
    }

    /// Regions of difference; empty for identical or INVALID pairs.
    pub fn regions(&self) -> &[Region] {
        self.products
            .as_ref()
            .map(|p| p.regions.as_slice())
            .unwrap_or_default()
    }

    /// Whether all four artifacts were written.
    pub fn persisted(&self) -> bool {
        self.stage == ComparisonStage::Done
    }
}

/// Runs comparisons of page image pairs into one session folder.
///
/// A `Comparator` holds no per-comparison state, so one instance may serve many comparisons,
/// including concurrently from several threads.
pub struct Comparator<S = FsImageSource> {
    source: S,
    settings: CompareSettings,
    session: PathBuf,
    log_sink: Option<tracing::Dispatch>,
}

impl Comparator<FsImageSource> {
    /// Comparator reading images from the local filesystem.
    pub fn new(settings: CompareSettings, session: impl Into<PathBuf>) -> PageDiffResult<Self> {
        Self::with_source(FsImageSource, settings, session)
    }
}

impl<S: ImageSource> Comparator<S> {
    /// Comparator reading images through `source`.
    pub fn with_source(
        source: S,
        settings: CompareSettings,
        session: impl Into<PathBuf>,
    ) -> PageDiffResult<Self> {
        settings.validate()?;
        Ok(Self {
            source,
            settings,
            session: session.into(),
            log_sink: None,
        })
    }

    /// Route this comparator's log events to `sink` instead of the ambient subscriber.
    pub fn with_log_sink(mut self, sink: tracing::Dispatch) -> Self {
        self.log_sink = Some(sink);
        self
    }

    /// Active settings.
    pub fn settings(&self) -> &CompareSettings {
        &self.settings
    }

    /// Session folder artifacts are written under.
    pub fn session(&self) -> &Path {
        &self.session
    }

    /// Artifact locations for a pair.
    pub fn artifact_paths(&self, file_a: &Path, file_b: &Path) -> ArtifactPaths {
        ArtifactPaths::for_pair(
            &self.session,
            file_a,
            file_b,
            &self.settings.artifact_formats(),
        )
    }

    /// Validate, compute and persist one pair.
    ///
    /// INVALID pairs and persistence failures come back as `Ok` with the reason recorded on
    /// the outcome; only unreadable sources are returned as `Err`.
    pub fn compare(&self, file_a: &Path, file_b: &Path) -> PageDiffResult<ComparisonOutcome> {
        match &self.log_sink {
            Some(sink) => {
                tracing::dispatcher::with_default(sink, || self.compare_inner(file_a, file_b))
            }
            None => self.compare_inner(file_a, file_b),
        }
    }

    /// Run the pixel pipeline on two grayscale rasters already known to be comparable.
    pub fn compute(&self, gray_a: &GrayImage, gray_b: &GrayImage) -> PageDiffResult<DiffProducts> {
        let mut stage = ComparisonStage::Validating;
        self.compute_tracked(gray_a, gray_b, &mut stage)
    }

    fn compare_inner(&self, file_a: &Path, file_b: &Path) -> PageDiffResult<ComparisonOutcome> {
        let mut timer = Timer::start();
        let paths = self.artifact_paths(file_a, file_b);
        let span = tracing::info_span!("compare", name = %paths.name);
        let _enter = span.enter();

        let mut stage = ComparisonStage::Created;
        advance(&mut stage, ComparisonStage::Validating);

        let mut products = None;
        let mut persist_error = None;
        let incompatibility = match self.validate(file_a, file_b)? {
            Err(reason) => {
                advance(&mut stage, ComparisonStage::Invalid);
                Some(reason)
            }
            Ok(()) => {
                let gray_a = self.source.decode(file_a)?.to_luma8();
                let gray_b = self.source.decode(file_b)?.to_luma8();
                let computed = self.compute_tracked(&gray_a, &gray_b, &mut stage)?;

                advance(&mut stage, ComparisonStage::Persisting);
                match self.persist(&computed, &paths) {
                    Ok(()) => advance(&mut stage, ComparisonStage::Done),
                    Err(e) => {
                        tracing::warn!(error = %e, "artifact persistence failed");
                        persist_error = Some(e);
                    }
                }
                products = Some(computed);
                None
            }
        };

        let elapsed = timer.stop();
        let outcome = ComparisonOutcome {
            name: paths.name.clone(),
            file_a: file_a.to_path_buf(),
            file_b: file_b.to_path_buf(),
            page_a: PageRef::from_path(file_a),
            page_b: PageRef::from_path(file_b),
            kind: self.settings.kind,
            paths,
            stage,
            incompatibility,
            products,
            persist_error,
            elapsed,
            completed_at: Timer::timestamp(),
        };

        match (&outcome.incompatibility, outcome.score()) {
            (Some(reason), _) => {
                tracing::warn!(
                    %reason,
                    "{} vs {} :: ssim: INVALID",
                    display_name(file_a),
                    display_name(file_b)
                );
            }
            (None, Some(score)) => {
                tracing::info!(
                    regions = outcome.regions().len(),
                    elapsed_s = elapsed.as_secs_f64(),
                    "{} vs {} :: ssim: {:.3} %",
                    display_name(file_a),
                    display_name(file_b),
                    score * 100.0
                );
            }
            (None, None) => {}
        }
        Ok(outcome)
    }

    /// Outer `Err` is fatal (unreadable source); inner `Err` marks the pair INVALID.
    fn validate(
        &self,
        file_a: &Path,
        file_b: &Path,
    ) -> PageDiffResult<Result<(), Incompatibility>> {
        for path in [file_a, file_b] {
            if !self.source.exists(path) {
                return Ok(Err(Incompatibility::MissingFile {
                    path: path.to_path_buf(),
                }));
            }
        }
        let info_a = self.source.probe(file_a)?;
        let info_b = self.source.probe(file_b)?;
        Ok(check_compatible(&info_a, &info_b))
    }

    fn compute_tracked(
        &self,
        gray_a: &GrayImage,
        gray_b: &GrayImage,
        stage: &mut ComparisonStage,
    ) -> PageDiffResult<DiffProducts> {
        advance(stage, ComparisonStage::Scoring);
        let similarity = score_and_diff(gray_a, gray_b, &self.settings.ssim_params())?;

        advance(stage, ComparisonStage::Thresholding);
        let binarized = binarize(&similarity.diff);

        advance(stage, ComparisonStage::Extracting);
        let regions = extract_regions(&binarized.mask);

        advance(stage, ComparisonStage::Annotating);
        let (overlay_a, overlay_b) = annotate(
            &regions,
            Overlay::transparent(gray_a.width(), gray_a.height()),
            Overlay::transparent(gray_b.width(), gray_b.height()),
            &self.settings.overlay_style(),
        )?;

        Ok(DiffProducts {
            similarity,
            threshold: binarized.threshold,
            mask: binarized.mask,
            regions,
            overlay_a,
            overlay_b,
        })
    }

    /// Writes stop at the first failure; artifacts written before it stay on disk.
    fn persist(&self, products: &DiffProducts, paths: &ArtifactPaths) -> PageDiffResult<()> {
        let s = &self.settings;
        let q = s.jpeg_quality;
        write_image_atomic(
            &DynamicImage::ImageLuma8(products.similarity.diff.to_similarity_image()),
            &paths.diff,
            s.diff_format,
            q,
            ArtifactKind::Diff,
        )?;
        write_image_atomic(
            &DynamicImage::ImageLuma8(products.mask.as_image().clone()),
            &paths.threshold,
            s.threshold_format,
            q,
            ArtifactKind::Threshold,
        )?;
        write_image_atomic(
            &DynamicImage::ImageRgba8(products.overlay_a.as_image().clone()),
            &paths.marks_a,
            s.marks_format,
            q,
            ArtifactKind::MarksA,
        )?;
        write_image_atomic(
            &DynamicImage::ImageRgba8(products.overlay_b.as_image().clone()),
            &paths.marks_b,
            s.marks_format,
            q,
            ArtifactKind::MarksB,
        )
    }
}

fn check_compatible(a: &ImageInfo, b: &ImageInfo) -> Result<(), Incompatibility> {
    if a.orientation() != b.orientation() {
        return Err(Incompatibility::OrientationMismatch {
            a: a.orientation(),
            b: b.orientation(),
        });
    }
    if a.dimensions() != b.dimensions() {
        return Err(Incompatibility::DimensionMismatch {
            a: a.dimensions(),
            b: b.dimensions(),
        });
    }
    Ok(())
}

fn advance(stage: &mut ComparisonStage, next: ComparisonStage) {
    debug_assert!(next > *stage, "stage {stage} cannot move to {next}");
    tracing::trace!(from = %stage, to = %next, "stage");
    *stage = next;
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/compare/orchestrator.rs"]
mod tests;
