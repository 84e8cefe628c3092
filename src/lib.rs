//! pagediff compares rendered PDF page images and marks where they differ.
//!
//! Given two page rasters of the same size, a comparison runs four pixel stages:
//!
//! 1. **Score**: structural similarity (SSIM) between the grayscale pages, as a mean score plus a
//!    per-pixel [`DiffMap`].
//! 2. **Threshold**: Otsu binarization of the map into a [`BinaryMask`] whose foreground marks
//!    dissimilar pixels.
//! 3. **Extract**: bounding boxes ([`Region`]) of the outermost connected foreground blobs.
//! 4. **Annotate**: outlines of every region drawn onto one transparent [`Overlay`] per page.
//!
//! [`Comparator`] sequences the stages for a pair of files, checks the pair is comparable first,
//! times the work and persists the artifacts (diff map, mask and both overlays) under a session
//! folder. [`ComparisonReport`] appends each outcome to the session's CSV report.
//!
//! Incompatible pairs (missing file, orientation or size mismatch) are not errors: they finish
//! as INVALID outcomes so batch runs keep going.
//!
//! The engine never installs a global `tracing` subscriber. Use
//! [`Comparator::with_log_sink`] to route a comparator's events to a specific sink.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod annotate;
mod compare;
mod foundation;
mod io;
mod metrics;
mod regions;
mod report;

pub use annotate::overlay::{Overlay, OverlayStyle, annotate};
pub use compare::orchestrator::{
    Comparator, ComparisonOutcome, ComparisonStage, DiffProducts, Incompatibility,
};
pub use compare::settings::{CompareKind, CompareSettings};
pub use foundation::core::{ArtifactKind, ImageFormat, Orientation, Region, Rgba8};
pub use foundation::error::{PageDiffError, PageDiffResult};
pub use foundation::timer::{TIMESTAMP_FORMAT, Timer};
pub use io::naming::{
    ArtifactFormats, ArtifactPaths, DIFF_DIR, MARKS_DIR, PAGE_MARKER, PAIR_SEPARATOR, PageRef,
    THRESHOLD_DIR, file_stem, pair_name,
};
pub use io::persist::{ensure_parent_dir, write_bytes_atomic, write_image_atomic};
pub use io::source::{FsImageSource, ImageInfo, ImageSource};
pub use metrics::ssim::{DiffMap, SimilarityResult, SsimParams, SsimWindow, score_and_diff};
pub use metrics::threshold::{
    BACKGROUND, Binarized, BinaryMask, FOREGROUND, binarize, binarize_intensity,
};
pub use regions::contours::{ExternalContour, external_contours, extract_regions};
pub use report::comparison::{COLUMNS, ComparisonReport, REPORT_FILE, ReportRow};
