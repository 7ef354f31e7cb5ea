//! Rater submissions as handed to the engine by the fetch/parse layer.

use serde::{Deserialize, Serialize};

/// Opaque task identifier (one review unit, e.g. an issue number).
pub type TaskId = String;

/// Raw content of a citation-number cell.
///
/// Spreadsheet exports mix numeric and textual cells in the same column,
/// so both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Missing cells and numeric NaN carry no citation.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Number(n) => n.is_nan(),
            Self::Text(_) => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

/// One row of a submission: a paper and the citation cell annotated for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRow {
    pub paper_id: String,
    pub citation: CellValue,
}

impl SubmissionRow {
    pub fn new(paper_id: impl Into<String>, citation: impl Into<CellValue>) -> Self {
        Self {
            paper_id: paper_id.into(),
            citation: citation.into(),
        }
    }
}

/// What the parse layer managed to read from a rater's file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionBody {
    Parsed { rows: Vec<SubmissionRow> },
    /// The rater submitted something that could not be read. It counts as a
    /// submission but never as an available one.
    Unreadable { reason: String },
}

/// One rater's annotation file for a task. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaterSubmission {
    rater: String,
    submission_id: Option<String>,
    sequence: u32,
    body: SubmissionBody,
}

impl RaterSubmission {
    pub fn parsed(rater: impl Into<String>, rows: Vec<SubmissionRow>) -> Self {
        Self {
            rater: rater.into(),
            submission_id: None,
            sequence: 0,
            body: SubmissionBody::Parsed { rows },
        }
    }

    pub fn unreadable(rater: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            rater: rater.into(),
            submission_id: None,
            sequence: 0,
            body: SubmissionBody::Unreadable {
                reason: reason.into(),
            },
        }
    }

    /// Build a parsed submission from `(paper id, citation cell)` text pairs.
    pub fn from_pairs<I, P, C>(rater: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<CellValue>,
    {
        let rows = pairs
            .into_iter()
            .map(|(paper, cell)| SubmissionRow::new(paper, cell))
            .collect();
        Self::parsed(rater, rows)
    }

    /// Attach the upstream identifier (used by the ignore list).
    pub fn with_submission_id(mut self, id: impl Into<String>) -> Self {
        self.submission_id = Some(id.into());
        self
    }

    /// Resubmission order; the highest sequence per rater wins.
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn rater(&self) -> &str {
        &self.rater
    }

    pub fn submission_id(&self) -> Option<&str> {
        self.submission_id.as_deref()
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn body(&self) -> &SubmissionBody {
        &self.body
    }

    /// Parsed rows, or an empty slice for unreadable submissions.
    pub fn rows(&self) -> &[SubmissionRow] {
        match &self.body {
            SubmissionBody::Parsed { rows } => rows,
            SubmissionBody::Unreadable { .. } => &[],
        }
    }
}

/// Everything the engine needs for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInput {
    pub task_id: TaskId,
    pub submissions: Vec<RaterSubmission>,
}

impl TaskInput {
    pub fn new(task_id: impl Into<TaskId>, submissions: Vec<RaterSubmission>) -> Self {
        Self {
            task_id: task_id.into(),
            submissions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_and_missing_cells_are_missing() {
        assert!(CellValue::Missing.is_missing());
        assert!(CellValue::Number(f64::NAN).is_missing());
        assert!(!CellValue::Number(3.0).is_missing());
        assert!(!CellValue::from("").is_missing());
    }

    #[test]
    fn unreadable_submission_has_no_rows() {
        let sub = RaterSubmission::unreadable("bob", "parse error");
        assert!(sub.rows().is_empty());
        assert!(matches!(sub.body(), SubmissionBody::Unreadable { .. }));
    }

    #[test]
    fn builder_sets_identity() {
        let sub = RaterSubmission::from_pairs("alice", [("10.1/x", "1")])
            .with_submission_id("973784087")
            .with_sequence(2);
        assert_eq!(sub.rater(), "alice");
        assert_eq!(sub.submission_id(), Some("973784087"));
        assert_eq!(sub.sequence(), 2);
        assert_eq!(sub.rows().len(), 1);
    }
}
