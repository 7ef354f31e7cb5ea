//! Recoverable, local reasons for narrowing a task's data.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::keys::PaperKey;

/// Why a row, submission, table or whole task contributed no score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Exclusion {
    /// A row's paper identifier has no DOI form; only that row is dropped.
    NormalizationFailure { rater: String, raw_paper_id: String },
    /// The submission names more papers than one task can hold.
    MalformedSubmission {
        rater: String,
        distinct_papers: usize,
        max_papers: usize,
    },
    /// The parse layer could not read the file.
    UnreadableSubmission { rater: String, reason: String },
    /// The submission id is on the configured ignore list.
    IgnoredSubmission { rater: String, submission_id: String },
    /// A later submission from the same rater replaced this one.
    SupersededSubmission { rater: String, sequence: u32 },
    /// No items survived normalization for this paper.
    EmptyTable { paper: PaperKey },
    /// Too few available submissions to measure agreement.
    InsufficientRaters { available: usize, required: usize },
}

impl Exclusion {
    /// Stable snake_case tag, used for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NormalizationFailure { .. } => "normalization_failure",
            Self::MalformedSubmission { .. } => "malformed_submission",
            Self::UnreadableSubmission { .. } => "unreadable_submission",
            Self::IgnoredSubmission { .. } => "ignored_submission",
            Self::SupersededSubmission { .. } => "superseded_submission",
            Self::EmptyTable { .. } => "empty_table",
            Self::InsufficientRaters { .. } => "insufficient_raters",
        }
    }

    /// Whether a whole rater submission was discarded.
    pub fn drops_submission(&self) -> bool {
        matches!(
            self,
            Self::MalformedSubmission { .. }
                | Self::UnreadableSubmission { .. }
                | Self::IgnoredSubmission { .. }
                | Self::SupersededSubmission { .. }
        )
    }
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NormalizationFailure {
                rater,
                raw_paper_id,
            } => write!(f, "{rater}: no DOI in paper id {raw_paper_id:?}"),
            Self::MalformedSubmission {
                rater,
                distinct_papers,
                max_papers,
            } => write!(
                f,
                "{rater}: submission lists {distinct_papers} papers (max {max_papers})"
            ),
            Self::UnreadableSubmission { rater, reason } => {
                write!(f, "{rater}: unreadable submission ({reason})")
            }
            Self::IgnoredSubmission {
                rater,
                submission_id,
            } => write!(f, "{rater}: submission {submission_id} is ignored"),
            Self::SupersededSubmission { rater, sequence } => {
                write!(f, "{rater}: submission #{sequence} superseded by a later one")
            }
            Self::EmptyTable { paper } => write!(f, "{paper}: no items to score"),
            Self::InsufficientRaters {
                available,
                required,
            } => write!(
                f,
                "only {available} available submission(s), {required} required"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_level_kinds() {
        let malformed = Exclusion::MalformedSubmission {
            rater: "alice".into(),
            distinct_papers: 15,
            max_papers: 10,
        };
        assert!(malformed.drops_submission());
        assert_eq!(malformed.kind(), "malformed_submission");
        assert_eq!(
            malformed.to_string(),
            "alice: submission lists 15 papers (max 10)"
        );

        let row = Exclusion::NormalizationFailure {
            rater: "alice".into(),
            raw_paper_id: "n/a".into(),
        };
        assert!(!row.drops_submission());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let e = Exclusion::InsufficientRaters {
            available: 1,
            required: 2,
        };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["kind"], "insufficient_raters");
        assert_eq!(v["available"], 1);
    }
}
