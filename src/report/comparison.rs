use std::fs::File;
use std::io::{Read as _, Seek as _, SeekFrom, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::compare::orchestrator::ComparisonOutcome;
use crate::foundation::error::{PageDiffError, PageDiffResult};
use crate::io::naming::{PageRef, file_stem};
use crate::io::persist::ensure_parent_dir;

/// File name of the per-session comparison report.
pub const REPORT_FILE: &str = "_comparison.report";

/// Header row of the report, in column order.
pub const COLUMNS: [&str; 16] = [
    "source_a",
    "page_a",
    "source_b",
    "page_b",
    "score",
    "ctype",
    "valid",
    "name",
    "duration",
    "date",
    "image_a_path",
    "image_b_path",
    "diff_path",
    "thres_path",
    "marks_a_path",
    "marks_b_path",
];

/// One report line. Field order matches [`COLUMNS`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReportRow {
    /// PDF stem of the first page, or its file stem.
    pub source_a: String,
    /// Page number of the first image; empty when the name carries none.
    pub page_a: String,
    /// PDF stem of the second page, or its file stem.
    pub source_b: String,
    /// Page number of the second image; empty when the name carries none.
    pub page_b: String,
    /// Mean SSIM with five decimals; empty for INVALID pairs.
    pub score: String,
    /// `manual` or `auto`.
    pub ctype: String,
    /// Whether the pair was comparable.
    pub valid: bool,
    /// Pair name.
    pub name: String,
    /// Seconds spent, five decimals.
    pub duration: String,
    /// Completion timestamp.
    pub date: String,
    /// First source image.
    pub image_a_path: String,
    /// Second source image.
    pub image_b_path: String,
    /// Diff map; empty unless artifacts were written.
    pub diff_path: String,
    /// Threshold mask; empty unless artifacts were written.
    pub thres_path: String,
    /// First overlay; empty unless artifacts were written.
    pub marks_a_path: String,
    /// Second overlay; empty unless artifacts were written.
    pub marks_b_path: String,
}

impl ReportRow {
    /// Flatten an outcome into a report line.
    pub fn from_outcome(outcome: &ComparisonOutcome) -> Self {
        let (source_a, page_a) = page_columns(outcome.page_a.as_ref(), &outcome.file_a);
        let (source_b, page_b) = page_columns(outcome.page_b.as_ref(), &outcome.file_b);
        let written = |p: &Path| {
            if outcome.persisted() {
                p.display().to_string()
            } else {
                String::new()
            }
        };
        Self {
            source_a,
            page_a,
            source_b,
            page_b,
            score: outcome
                .score()
                .map(|s| format!("{s:.5}"))
                .unwrap_or_default(),
            ctype: outcome.kind.as_str().to_string(),
            valid: outcome.is_valid(),
            name: outcome.name.clone(),
            duration: format!("{:.5}", outcome.elapsed.as_secs_f64()),
            date: outcome.completed_at.clone(),
            image_a_path: outcome.file_a.display().to_string(),
            image_b_path: outcome.file_b.display().to_string(),
            diff_path: written(&outcome.paths.diff),
            thres_path: written(&outcome.paths.threshold),
            marks_a_path: written(&outcome.paths.marks_a),
            marks_b_path: written(&outcome.paths.marks_b),
        }
    }
}

fn page_columns(page: Option<&PageRef>, file: &Path) -> (String, String) {
    match page {
        Some(p) => (p.source.clone(), p.page.to_string()),
        None => (file_stem(file), String::new()),
    }
}

/// Append-only CSV log of the comparisons run in one session folder.
#[derive(Clone, Debug)]
pub struct ComparisonReport {
    path: PathBuf,
}

impl ComparisonReport {
    /// Report at `<dir>/_comparison.report`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(REPORT_FILE),
        }
    }

    /// Report file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add one line for `outcome`, creating the file with a header if it is missing or empty.
    ///
    /// The report is held under an exclusive lock while its header is checked and the row is
    /// appended, so concurrent appends from threads or processes never drop each other's rows.
    /// Existing lines are never rewritten.
    #[tracing::instrument(skip_all, fields(path = %self.path.display(), name = %outcome.name))]
    pub fn append(&self, outcome: &ComparisonOutcome) -> PageDiffResult<()> {
        ensure_parent_dir(&self.path)?;
        let mut file = File::options()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("open report '{}'", self.path.display()))?;
        file.lock()
            .with_context(|| format!("lock report '{}'", self.path.display()))?;

        let mut existing = Vec::new();
        file.seek(SeekFrom::Start(0))
            .and_then(|_| file.read_to_end(&mut existing))
            .with_context(|| format!("read report '{}'", self.path.display()))?;

        let fresh = existing.is_empty();
        if !fresh {
            self.check_header(&existing)?;
        }

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(fresh)
            .from_writer(Vec::new());
        wtr.serialize(ReportRow::from_outcome(outcome))
            .context("serialize report row")?;
        let row = wtr
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flush report row: {}", e.error()))?;

        let mut bytes = Vec::with_capacity(row.len() + 1);
        if !fresh && !existing.ends_with(b"\n") {
            bytes.push(b'\n');
        }
        bytes.extend_from_slice(&row);
        file.write_all(&bytes)
            .and_then(|_| file.sync_data())
            .with_context(|| format!("append to report '{}'", self.path.display()))?;
        tracing::debug!(fresh, "report row appended");
        Ok(())
    }

    /// Read every line back. A missing or empty report has no rows; otherwise the header must
    /// match [`COLUMNS`].
    pub fn rows(&self) -> PageDiffResult<Vec<ReportRow>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("open report '{}'", self.path.display()))
                    .into());
            }
        };
        let mut bytes = Vec::new();
        file.lock_shared()
            .and_then(|_| file.read_to_end(&mut bytes))
            .with_context(|| format!("read report '{}'", self.path.display()))?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }
        self.check_header(&bytes)?;

        let mut rdr = csv::Reader::from_reader(bytes.as_slice());
        rdr.deserialize::<ReportRow>()
            .enumerate()
            .map(|(i, row)| {
                row.map_err(|e| {
                    PageDiffError::report(format!(
                        "'{}' line {}: {e}",
                        self.path.display(),
                        i + 2
                    ))
                })
            })
            .collect()
    }

    fn check_header(&self, bytes: &[u8]) -> PageDiffResult<()> {
        let mut rdr = csv::Reader::from_reader(bytes);
        let headers = rdr
            .headers()
            .with_context(|| format!("read report header '{}'", self.path.display()))?;
        if !headers.iter().eq(COLUMNS) {
            return Err(PageDiffError::report(format!(
                "'{}' has unexpected columns: {}",
                self.path.display(),
                headers.iter().collect::<Vec<_>>().join(",")
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/report/comparison.rs"]
mod tests;
