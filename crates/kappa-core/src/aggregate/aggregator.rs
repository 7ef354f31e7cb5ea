//! Per-task submission aggregation.
//!
//! [`Aggregator::aggregate`] selects which rater submissions count, reduces
//! each one to `paper -> {items}`, folds them into a [`TableBuilder`] and
//! finalizes one [`AgreementTable`] per paper.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::aggregate::table::{AgreementTable, TableBuilder};
use crate::config::AgreementConfig;
use crate::domain::{
    CellValue, Exclusion, ItemKey, PaperKey, RaterSubmission, SubmissionBody, TaskId,
};
use crate::normalize::{normalize_item_id, normalize_item_token, normalize_paper_id};
use crate::split::split_citation_cell;

/// Finalized tables for one task plus everything that was narrowed away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAggregation {
    pub task_id: TaskId,
    /// Distinct raters, after the ignore list and resubmissions.
    pub submissions: usize,
    /// Raters whose submission was read and accepted.
    pub available_submissions: usize,
    pub tables: BTreeMap<PaperKey, AgreementTable>,
    pub exclusions: Vec<Exclusion>,
}

/// One accepted rater reduced to its per-paper item sets.
type PaperItems = BTreeMap<PaperKey, BTreeSet<ItemKey>>;

/// Builds agreement tables under a fixed configuration.
pub struct Aggregator<'a> {
    config: &'a AgreementConfig,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a AgreementConfig) -> Self {
        Self { config }
    }

    /// Aggregate all submissions of one task.
    pub fn aggregate(&self, task_id: &str, submissions: &[RaterSubmission]) -> TaskAggregation {
        let mut exclusions = Vec::new();
        let selected = self.select_latest(submissions, &mut exclusions);

        let mut accepted = Vec::with_capacity(selected.len());
        for submission in &selected {
            if let Some(papers) = self.reduce_submission(submission, &mut exclusions) {
                accepted.push(papers);
            }
        }

        let available = accepted.len();
        let tables = accepted
            .iter()
            .fold(TableBuilder::default(), |builder, papers| builder.fold_in(papers))
            .finalize(available);

        debug!(
            task_id = %task_id,
            submissions = selected.len(),
            available,
            papers = tables.len(),
            "task aggregated"
        );

        TaskAggregation {
            task_id: task_id.to_string(),
            submissions: selected.len(),
            available_submissions: available,
            tables,
            exclusions,
        }
    }

    /// Drop ignored submissions and keep only the latest one per rater,
    /// preserving the order in which raters first appeared.
    fn select_latest<'s>(
        &self,
        submissions: &'s [RaterSubmission],
        exclusions: &mut Vec<Exclusion>,
    ) -> Vec<&'s RaterSubmission> {
        let mut order: Vec<&str> = Vec::new();
        let mut latest: HashMap<&str, &'s RaterSubmission> = HashMap::new();

        for submission in submissions {
            if let Some(id) = submission.submission_id() {
                if self.config.is_ignored(id) {
                    exclusions.push(Exclusion::IgnoredSubmission {
                        rater: submission.rater().to_string(),
                        submission_id: id.to_string(),
                    });
                    continue;
                }
            }

            let rater = submission.rater();
            match latest.get(rater).copied() {
                None => {
                    order.push(rater);
                    latest.insert(rater, submission);
                }
                Some(current) => {
                    // Equal sequences: the later entry wins.
                    let (kept, replaced) = if submission.sequence() >= current.sequence() {
                        (submission, current)
                    } else {
                        (current, submission)
                    };
                    exclusions.push(Exclusion::SupersededSubmission {
                        rater: rater.to_string(),
                        sequence: replaced.sequence(),
                    });
                    latest.insert(rater, kept);
                }
            }
        }

        order
            .into_iter()
            .filter_map(|rater| latest.get(rater).copied())
            .collect()
    }

    /// Reduce one submission to `paper -> {items}`, or `None` if the whole
    /// submission must be discarded.
    fn reduce_submission(
        &self,
        submission: &RaterSubmission,
        exclusions: &mut Vec<Exclusion>,
    ) -> Option<PaperItems> {
        let rater = submission.rater();
        let rows = match submission.body() {
            SubmissionBody::Parsed { rows } => rows,
            SubmissionBody::Unreadable { reason } => {
                exclusions.push(Exclusion::UnreadableSubmission {
                    rater: rater.to_string(),
                    reason: reason.clone(),
                });
                return None;
            }
        };

        let mut papers = PaperItems::new();
        for row in rows {
            if row.paper_id.trim().is_empty() {
                trace!(rater = %rater, "row without paper id skipped");
                continue;
            }
            let paper = match normalize_paper_id(&row.paper_id, self.config.doi_policy) {
                Ok(paper) => paper,
                Err(err) => {
                    exclusions.push(Exclusion::NormalizationFailure {
                        rater: rater.to_string(),
                        raw_paper_id: err.raw,
                    });
                    continue;
                }
            };
            let items = papers.entry(paper).or_default();
            items.extend(cell_items(&row.citation));
        }

        if papers.len() > self.config.max_papers_per_submission {
            exclusions.push(Exclusion::MalformedSubmission {
                rater: rater.to_string(),
                distinct_papers: papers.len(),
                max_papers: self.config.max_papers_per_submission,
            });
            return None;
        }

        Some(papers)
    }
}

/// Item keys contained in one citation cell.
fn cell_items(cell: &CellValue) -> Vec<ItemKey> {
    match cell {
        _ if cell.is_missing() => Vec::new(),
        CellValue::Text(text) => split_citation_cell(text)
            .iter()
            .filter_map(|token| normalize_item_token(token))
            .collect(),
        other => normalize_item_id(other).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubmissionRow;

    fn key(doi: &str) -> PaperKey {
        normalize_paper_id(doi, Default::default()).unwrap()
    }

    #[test]
    fn cell_items_split_and_bracket() {
        let keys: Vec<String> = cell_items(&CellValue::from("3, 5"))
            .into_iter()
            .map(|k| k.as_str().to_string())
            .collect();
        assert_eq!(keys, vec!["[3]", "[5]"]);
        assert!(cell_items(&CellValue::Number(f64::NAN)).is_empty());
        assert_eq!(cell_items(&CellValue::Number(4.0))[0].as_str(), "[4]");
        assert!(cell_items(&CellValue::from("n/a")).is_empty());
    }

    #[test]
    fn duplicate_items_within_a_rater_count_once() {
        let config = AgreementConfig::default();
        let a = RaterSubmission::from_pairs("a", [("10.1/x", "1"), ("10.1/x", "1, 2")]);
        let b = RaterSubmission::from_pairs("b", [("10.1/x", "[1]")]);

        let agg = Aggregator::new(&config).aggregate("t", &[a, b]);
        let table = &agg.tables[&key("10.1/x")];
        let one = table.get(&normalize_item_token("1").unwrap()).unwrap();
        assert_eq!((one.y, one.n), (2, 0));
        let two = table.get(&normalize_item_token("2").unwrap()).unwrap();
        assert_eq!((two.y, two.n), (1, 1));
    }

    #[test]
    fn latest_submission_per_rater_wins() {
        let config = AgreementConfig::default();
        let first = RaterSubmission::from_pairs("a", [("10.1/x", "1")]).with_sequence(0);
        let second = RaterSubmission::from_pairs("a", [("10.1/x", "2")]).with_sequence(1);
        let other = RaterSubmission::from_pairs("b", [("10.1/x", "2")]);

        let agg = Aggregator::new(&config).aggregate("t", &[first, other, second]);
        assert_eq!(agg.submissions, 2);
        assert_eq!(agg.available_submissions, 2);
        let table = &agg.tables[&key("10.1/x")];
        assert!(table.get(&normalize_item_token("1").unwrap()).is_none());
        assert_eq!(table.get(&normalize_item_token("2").unwrap()).unwrap().y, 2);
        assert!(agg.exclusions.contains(&Exclusion::SupersededSubmission {
            rater: "a".into(),
            sequence: 0
        }));
    }

    #[test]
    fn ignored_submissions_are_not_counted() {
        let config = AgreementConfig {
            ignored_submissions: vec!["c-1".into()],
            ..AgreementConfig::default()
        };
        let ignored = RaterSubmission::from_pairs("c", [("10.1/x", "1")]).with_submission_id("c-1");
        let kept = RaterSubmission::from_pairs("a", [("10.1/x", "1")]);

        let agg = Aggregator::new(&config).aggregate("t", &[ignored, kept]);
        assert_eq!(agg.submissions, 1);
        assert_eq!(agg.available_submissions, 1);
        assert_eq!(agg.exclusions[0].kind(), "ignored_submission");
    }

    #[test]
    fn blank_paper_rows_are_skipped_quietly() {
        let config = AgreementConfig::default();
        let sub = RaterSubmission::parsed(
            "a",
            vec![
                SubmissionRow::new("", "1"),
                SubmissionRow::new("10.1/x", "2"),
            ],
        );
        let agg = Aggregator::new(&config).aggregate("t", &[sub]);
        assert!(agg.exclusions.is_empty());
        assert_eq!(agg.tables.len(), 1);
    }
}
