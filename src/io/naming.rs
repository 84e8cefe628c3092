use std::path::{Path, PathBuf};

use crate::foundation::core::ImageFormat;

/// Joins the two source stems in a pair name.
pub const PAIR_SEPARATOR: &str = "_vs_";
/// Separates a PDF stem from its page number in rendered page file names.
pub const PAGE_MARKER: &str = "__pg_";

/// Session sub-folder holding diff maps.
pub const DIFF_DIR: &str = "diff";
/// Session sub-folder holding threshold masks.
pub const THRESHOLD_DIR: &str = "thres";
/// Session sub-folder holding overlays.
pub const MARKS_DIR: &str = "marks";

/// File name with its final extension removed (`a.b.jpg` -> `a.b`).
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<stemA>_vs_<stemB>`.
pub fn pair_name(file_a: &Path, file_b: &Path) -> String {
    format!("{}{PAIR_SEPARATOR}{}", file_stem(file_a), file_stem(file_b))
}

/// Output locations for one compared pair inside a session folder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Pair name shared by all artifacts.
    pub name: String,
    /// `<session>/diff/<name>.<ext>`
    pub diff: PathBuf,
    /// `<session>/thres/<name>.<ext>`
    pub threshold: PathBuf,
    /// `<session>/marks/<name>_a.<ext>`
    pub marks_a: PathBuf,
    /// `<session>/marks/<name>_b.<ext>`
    pub marks_b: PathBuf,
}

/// Per-artifact output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArtifactFormats {
    /// Diff map format.
    pub diff: ImageFormat,
    /// Threshold mask format.
    pub threshold: ImageFormat,
    /// Overlay format; must carry alpha.
    pub marks: ImageFormat,
}

impl Default for ArtifactFormats {
    fn default() -> Self {
        Self {
            diff: ImageFormat::Jpeg,
            threshold: ImageFormat::Jpeg,
            marks: ImageFormat::Png,
        }
    }
}

impl ArtifactPaths {
    /// Derive the four output paths. Pure: nothing is created on disk.
    pub fn for_pair(
        session: &Path,
        file_a: &Path,
        file_b: &Path,
        formats: &ArtifactFormats,
    ) -> Self {
        let name = pair_name(file_a, file_b);
        let marks_dir = session.join(MARKS_DIR);
        Self {
            diff: session
                .join(DIFF_DIR)
                .join(format!("{name}.{}", formats.diff.extension())),
            threshold: session
                .join(THRESHOLD_DIR)
                .join(format!("{name}.{}", formats.threshold.extension())),
            marks_a: marks_dir.join(format!("{name}_a.{}", formats.marks.extension())),
            marks_b: marks_dir.join(format!("{name}_b.{}", formats.marks.extension())),
            name,
        }
    }
}

/// A rendered PDF page identified by its file name (`<source>__pg_<NN>.<ext>`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PageRef {
    /// Stem of the PDF the page came from.
    pub source: String,
    /// 1-based page number.
    pub page: u32,
}

impl PageRef {
    /// Recover source and page from a rendered page file name. Returns `None` for files that
    /// do not follow the convention.
    pub fn parse(file_name: &str) -> Option<Self> {
        let (source, rest) = file_name.split_once(PAGE_MARKER)?;
        let digits = rest.split('.').next()?;
        let page = digits.parse().ok()?;
        Some(Self {
            source: source.to_string(),
            page,
        })
    }

    /// Like [`PageRef::parse`] on the final component of `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::parse(&path.file_name()?.to_string_lossy())
    }

    /// File name for this page with a two-digit zero-padded page number.
    pub fn file_name(&self, format: ImageFormat) -> String {
        format!(
            "{}{PAGE_MARKER}{:02}.{}",
            self.source,
            self.page,
            format.extension()
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/naming.rs"]
mod tests;
