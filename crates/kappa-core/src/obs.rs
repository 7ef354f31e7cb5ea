//! Structured observability hooks for task and batch lifecycle events.
//!
//! Events are emitted at `info!` level, exclusions at `warn!`/`debug!`.
//! Filter with `RUST_LOG`; for JSON output pass `--json` to the CLI.

use tracing::{debug, info, warn};

use crate::domain::{Exclusion, PaperKey};

/// RAII guard that enters a task-scoped span for the duration of a task.
///
/// ```ignore
/// let _span = TaskSpan::enter("197");
/// // all tracing calls now carry task_id = "197"
/// ```
pub struct TaskSpan {
    _span: tracing::span::EnteredSpan,
}

impl TaskSpan {
    pub fn enter(task_id: &str) -> Self {
        let span = tracing::info_span!("kappa.task", task_id = %task_id);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_task_started(task_id: &str, submissions: usize) {
    info!(event = "task.started", task_id = %task_id, submissions = submissions);
}

pub fn emit_task_finished(task_id: &str, available: usize, scored: usize, excluded: usize) {
    info!(
        event = "task.finished",
        task_id = %task_id,
        available_submissions = available,
        scored = scored,
        excluded = excluded,
    );
}

/// Submission-level exclusions warn; row and table level ones are debug noise.
pub fn emit_exclusion(task_id: &str, exclusion: &Exclusion) {
    if exclusion.drops_submission() || matches!(exclusion, Exclusion::InsufficientRaters { .. }) {
        warn!(
            event = "task.excluded",
            task_id = %task_id,
            kind = exclusion.kind(),
            detail = %exclusion,
        );
    } else {
        debug!(
            event = "task.excluded",
            task_id = %task_id,
            kind = exclusion.kind(),
            detail = %exclusion,
        );
    }
}

pub fn emit_table_scored(task_id: &str, paper: &PaperKey, items: usize, kappa: f64) {
    info!(
        event = "table.scored",
        task_id = %task_id,
        paper = %paper,
        items = items,
        kappa = kappa,
    );
}

pub fn emit_batch_finished(tasks: usize, rows: usize, duration_ms: u64) {
    info!(
        event = "batch.finished",
        tasks = tasks,
        rows = rows,
        duration_ms = duration_ms,
    );
}

/// A task whose submissions could not be fetched at all.
pub fn emit_source_error(task_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "task.source_error", task_id = %task_id, error = %error);
}
