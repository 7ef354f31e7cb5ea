//! Per-task pipeline: aggregate, gate on rater count, score each table.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregator, AgreementTable};
use crate::config::AgreementConfig;
use crate::domain::{Exclusion, PaperKey, Result, TaskId, TaskInput};
use crate::metrics::METRICS;
use crate::obs::{self, TaskSpan};
use crate::score::{score_table, AgreementScore};
use crate::summary::{BatchSummary, ScoredRow};

/// Everything produced for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task_id: TaskId,
    pub submissions: usize,
    pub available_submissions: usize,
    /// Finalized tables, kept for inspection.
    pub tables: BTreeMap<PaperKey, AgreementTable>,
    /// One score per non-empty table, in paper order.
    pub scores: Vec<AgreementScore>,
    pub exclusions: Vec<Exclusion>,
}

impl TaskOutcome {
    pub fn rows(&self) -> Vec<ScoredRow> {
        self.scores.iter().cloned().map(ScoredRow::from).collect()
    }
}

/// Synchronous agreement engine. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Engine {
    config: AgreementConfig,
}

impl Engine {
    pub fn new(config: AgreementConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AgreementConfig {
        &self.config
    }

    pub fn process_task(&self, input: &TaskInput) -> TaskOutcome {
        let task_id = input.task_id.as_str();
        let _span = TaskSpan::enter(task_id);
        obs::emit_task_started(task_id, input.submissions.len());

        let aggregation = Aggregator::new(&self.config).aggregate(task_id, &input.submissions);
        let mut exclusions = aggregation.exclusions;
        let mut scores = Vec::new();

        if aggregation.available_submissions < self.config.min_raters {
            exclusions.push(Exclusion::InsufficientRaters {
                available: aggregation.available_submissions,
                required: self.config.min_raters,
            });
        } else {
            for (paper, table) in &aggregation.tables {
                match score_table(table, self.config.kappa_method, self.config.round_digits) {
                    Some(kappa) => {
                        obs::emit_table_scored(task_id, paper, table.len(), kappa);
                        METRICS.inc_tables_scored();
                        scores.push(AgreementScore {
                            task_id: task_id.to_string(),
                            paper: paper.clone(),
                            submissions: aggregation.submissions,
                            available_submissions: aggregation.available_submissions,
                            kappa,
                        });
                    }
                    None => {
                        METRICS.inc_tables_skipped();
                        exclusions.push(Exclusion::EmptyTable {
                            paper: paper.clone(),
                        });
                    }
                }
            }
        }

        METRICS.inc_tasks();
        METRICS.add_submissions_accepted(aggregation.available_submissions as u64);
        for exclusion in &exclusions {
            match exclusion {
                Exclusion::NormalizationFailure { .. } => METRICS.inc_rows_dropped(),
                e if e.drops_submission() => METRICS.inc_submissions_excluded(),
                _ => {}
            }
            obs::emit_exclusion(task_id, exclusion);
        }
        obs::emit_task_finished(
            task_id,
            aggregation.available_submissions,
            scores.len(),
            exclusions.len(),
        );

        TaskOutcome {
            task_id: task_id.to_string(),
            submissions: aggregation.submissions,
            available_submissions: aggregation.available_submissions,
            tables: aggregation.tables,
            scores,
            exclusions,
        }
    }

    /// Process tasks in order, appending each task's rows to one summary.
    pub fn process_batch<'a, I>(&self, tasks: I) -> BatchSummary
    where
        I: IntoIterator<Item = &'a TaskInput>,
    {
        let started = Instant::now();
        let mut summary = BatchSummary::new();
        let mut task_count = 0usize;
        for input in tasks {
            task_count += 1;
            summary.extend_task(self.process_task(input).rows());
        }
        obs::emit_batch_finished(
            task_count,
            summary.len(),
            started.elapsed().as_millis() as u64,
        );
        summary
    }
}
