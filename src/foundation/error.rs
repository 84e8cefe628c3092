use std::path::PathBuf;

use crate::foundation::core::ArtifactKind;

/// Convenience result type used across pagediff.
pub type PageDiffResult<T> = Result<T, PageDiffError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Incompatible input pairs are not errors: they end as an INVALID
/// [`ComparisonOutcome`](crate::ComparisonOutcome) carrying an
/// [`Incompatibility`](crate::Incompatibility).
#[derive(thiserror::Error, Debug)]
pub enum PageDiffError {
    /// Invalid user-provided settings or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Two buffers handed to a pixel stage do not share a shape.
    #[error("shape mismatch: {a:?} vs {b:?}")]
    ShapeMismatch {
        /// `(width, height)` of the first input.
        a: (u32, u32),
        /// `(width, height)` of the second input.
        b: (u32, u32),
    },

    /// A source path exists but is not a supported raster image.
    #[error("unreadable image '{}' during {stage}: {source}", path.display())]
    UnreadableImage {
        /// Offending file.
        path: PathBuf,
        /// Orchestrator stage that attempted the read.
        stage: &'static str,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },

    /// Writing an output artifact failed.
    #[error("persist error: {artifact} '{}': {source:#}", path.display())]
    Persist {
        /// Which artifact was being written.
        artifact: ArtifactKind,
        /// Destination path.
        path: PathBuf,
        /// Underlying IO / encoder error.
        #[source]
        source: anyhow::Error,
    },

    /// A pre-existing report file could not be understood.
    #[error("report error: {0}")]
    Report(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PageDiffError {
    /// Build a [`PageDiffError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PageDiffError::Report`] value.
    pub fn report(msg: impl Into<String>) -> Self {
        Self::Report(msg.into())
    }

    /// Build a [`PageDiffError::Persist`] value.
    pub fn persist(
        artifact: ArtifactKind,
        path: impl Into<PathBuf>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Persist {
            artifact,
            path: path.into(),
            source: source.into(),
        }
    }

    /// Build a [`PageDiffError::UnreadableImage`] value.
    pub fn unreadable(
        path: impl Into<PathBuf>,
        stage: &'static str,
        source: image::ImageError,
    ) -> Self {
        Self::UnreadableImage {
            path: path.into(),
            stage,
            source,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
