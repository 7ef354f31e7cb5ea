//! Local directory submission source.
//!
//! Layout: `<root>/<task_id>/<rater>[.<sequence>].csv`. Each CSV needs a
//! `paper_doi` and a `citation_number` column (matched case-insensitively,
//! surrounding whitespace ignored); other columns are ignored.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kappa_core::{CellValue, KappaError, RaterSubmission, SubmissionRow, SubmissionSource};
use tracing::{debug, warn};

pub const PAPER_COLUMN: &str = "paper_doi";
pub const CITATION_COLUMN: &str = "citation_number";

pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Task directories under the root. Numeric names sort numerically and
    /// come before the rest.
    pub fn task_ids(&self) -> std::io::Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                ids.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        ids.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        });
        Ok(ids)
    }
}

#[async_trait]
impl SubmissionSource for DirectorySource {
    async fn fetch_submissions(&self, task_id: &str) -> kappa_core::Result<Vec<RaterSubmission>> {
        let dir = self.root.join(task_id);
        let unavailable = |e: std::io::Error| KappaError::SourceUnavailable {
            task_id: task_id.to_string(),
            reason: format!("{}: {e}", dir.display()),
        };

        let mut entries = tokio::fs::read_dir(&dir).await.map_err(unavailable)?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")) {
                files.push(path);
            }
        }
        files.sort();

        let mut submissions = Vec::with_capacity(files.len());
        for path in files {
            let (rater, sequence) = rater_from_path(&path);
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let submission = match tokio::fs::read(&path).await {
                Ok(bytes) => match parse_submission(&bytes) {
                    Ok(rows) => {
                        debug!(task_id = %task_id, rater = %rater, rows = rows.len(), "submission parsed");
                        RaterSubmission::parsed(rater, rows)
                    }
                    Err(reason) => {
                        warn!(task_id = %task_id, file = %file_name, reason = %reason, "submission unreadable");
                        RaterSubmission::unreadable(rater, reason)
                    }
                },
                Err(e) => {
                    warn!(task_id = %task_id, file = %file_name, error = %e, "submission unreadable");
                    RaterSubmission::unreadable(rater, e.to_string())
                }
            };
            submissions.push(
                submission
                    .with_submission_id(file_name)
                    .with_sequence(sequence),
            );
        }
        Ok(submissions)
    }
}

/// `alice.2.csv` → (`alice`, 2); `alice.csv` → (`alice`, 0).
fn rater_from_path(path: &Path) -> (String, u32) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.rsplit_once('.') {
        Some((rater, seq)) => match seq.parse::<u32>() {
            Ok(seq) => (rater.to_string(), seq),
            Err(_) => (stem.clone(), 0),
        },
        None => (stem, 0),
    }
}

/// UTF-8 when valid, Latin-1 otherwise.
fn decode(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.trim_start_matches('\u{feff}').to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Extract `(paper_doi, citation_number)` rows from CSV text.
pub fn parse_submission(bytes: &[u8]) -> Result<Vec<SubmissionRow>, String> {
    let text = decode(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("missing column {name:?}"))
    };
    let paper_idx = column(PAPER_COLUMN)?;
    let citation_idx = column(CITATION_COLUMN)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let paper = record.get(paper_idx).unwrap_or("").trim();
        let citation = match record.get(citation_idx).map(str::trim) {
            None | Some("") => CellValue::Missing,
            Some(cell) => CellValue::Text(cell.to_string()),
        };
        rows.push(SubmissionRow {
            paper_id: paper.to_string(),
            citation,
        });
    }
    Ok(rows)
}
