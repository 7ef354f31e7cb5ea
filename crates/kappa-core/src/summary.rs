//! Batch-level collection of scored rows.
//!
//! [`BatchSummary`] is the hand-off point to reporting: an ordered list of
//! `(task, submissions, available, paper, kappa)` rows plus simple
//! statistics and histogram binning over the scores.

use serde::{Deserialize, Serialize};

use crate::domain::{PaperKey, TaskId};
use crate::score::{round_to, AgreementScore};

/// Lower edge of the histogram range.
pub const KAPPA_MIN: f64 = -1.0;
/// Upper edge of the histogram range.
pub const KAPPA_MAX: f64 = 1.0;

/// Bin edges are rounded to this many decimals so they compare equal to
/// rounded scores.
const EDGE_DIGITS: u32 = 12;

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRow {
    pub task_id: TaskId,
    pub submissions: usize,
    pub available_submissions: usize,
    pub paper: PaperKey,
    pub kappa: f64,
}

impl From<AgreementScore> for ScoredRow {
    fn from(score: AgreementScore) -> Self {
        Self {
            task_id: score.task_id,
            submissions: score.submissions,
            available_submissions: score.available_submissions,
            paper: score.paper,
            kappa: score.kappa,
        }
    }
}

/// Aggregate statistics over all scored rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreStats {
    pub count: usize,
    pub tasks: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// One equal-width histogram bin, `[lower, upper)` except the last which is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Score distribution over `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

/// Ordered sequence of scored rows for a batch of tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    rows: Vec<ScoredRow>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ScoredRow) {
        self.rows.push(row);
    }

    /// Append all rows of one task in one step.
    pub fn extend_task(&mut self, rows: Vec<ScoredRow>) {
        self.rows.extend(rows);
    }

    pub fn rows(&self) -> &[ScoredRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ScoredRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows for one task, in processing order.
    pub fn task_rows<'a>(&'a self, task_id: &'a str) -> impl Iterator<Item = &'a ScoredRow> + 'a {
        self.rows.iter().filter(move |row| row.task_id == task_id)
    }

    /// Stable-sort rows by the position of their task in `order`. Rows of
    /// tasks not in `order` go last. Within a task, row order is preserved.
    pub fn sort_by_task_order(&mut self, order: &[TaskId]) {
        self.rows.sort_by_key(|row| {
            order
                .iter()
                .position(|task| *task == row.task_id)
                .unwrap_or(usize::MAX)
        });
    }

    pub fn stats(&self) -> Option<ScoreStats> {
        if self.rows.is_empty() {
            return None;
        }

        let scores = self.rows.iter().map(|r| r.kappa);
        let sum: f64 = scores.clone().sum();
        let min = scores.clone().fold(f64::INFINITY, f64::min);
        let max = scores.fold(f64::NEG_INFINITY, f64::max);

        let mut tasks: Vec<&str> = self.rows.iter().map(|r| r.task_id.as_str()).collect();
        tasks.sort_unstable();
        tasks.dedup();

        Some(ScoreStats {
            count: self.rows.len(),
            tasks: tasks.len(),
            mean: sum / self.rows.len() as f64,
            min,
            max,
        })
    }

    /// Bin scores into `bins` equal-width bins over `[-1, 1]`. A score on an
    /// edge belongs to the bin starting there; scores outside the range land
    /// in the nearest end bin.
    pub fn histogram(&self, bins: usize) -> Histogram {
        let bins = bins.max(1);
        let width = (KAPPA_MAX - KAPPA_MIN) / bins as f64;
        let edge = |i: usize| round_to(KAPPA_MIN + width * i as f64, EDGE_DIGITS);

        let mut out: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: edge(i),
                upper: edge(i + 1),
                count: 0,
            })
            .collect();

        for row in &self.rows {
            let idx = out
                .iter()
                .rposition(|bin| bin.lower <= row.kappa)
                .unwrap_or(0);
            out[idx].count += 1;
        }

        Histogram { bins: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgreementConfig;
    use crate::normalize::{normalize_paper_id, DoiPolicy};

    fn row(task: &str, kappa: f64) -> ScoredRow {
        ScoredRow {
            task_id: task.to_string(),
            submissions: 3,
            available_submissions: 2,
            paper: normalize_paper_id("10.1/x", DoiPolicy::Extract).unwrap(),
            kappa,
        }
    }

    #[test]
    fn stats_over_rows() {
        let mut summary = BatchSummary::new();
        assert!(summary.stats().is_none());
        summary.extend_task(vec![row("1", -0.2), row("1", 0.6)]);
        summary.push(row("2", 1.0));

        let stats = summary.stats().unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.tasks, 2);
        assert!((stats.mean - 0.4666666).abs() < 1e-6);
        assert_eq!(stats.min, -0.2);
        assert_eq!(stats.max, 1.0);
    }

    #[test]
    fn histogram_edges() {
        let mut summary = BatchSummary::new();
        summary.extend_task(vec![row("1", -1.0), row("1", 0.0), row("1", 1.0), row("1", 0.95)]);

        let hist = summary.histogram(4);
        let counts: Vec<usize> = hist.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 0, 1, 2]);
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.bins[0].lower, -1.0);
        assert_eq!(hist.bins[3].upper, 1.0);
    }

    #[test]
    fn scores_on_bin_edges_open_the_upper_bin() {
        let mut summary = BatchSummary::new();
        summary.extend_task(vec![row("1", 0.2), row("1", 0.4), row("1", -0.6)]);

        let hist = summary.histogram(10);
        let lowers: Vec<f64> = hist.bins.iter().filter(|b| b.count == 1).map(|b| b.lower).collect();
        assert_eq!(lowers, vec![-0.6, 0.2, 0.4]);
        assert_eq!(hist.bins[6].lower, 0.2);
        assert_eq!(hist.bins[6].upper, 0.4);
    }

    #[test]
    fn default_bins_are_quarter_width() {
        let mut summary = BatchSummary::new();
        summary.extend_task(vec![row("1", -0.75), row("1", 0.25), row("1", 0.24), row("1", 1.0)]);

        let hist = summary.histogram(AgreementConfig::default().histogram_bins);
        assert_eq!(hist.bins.len(), 8);
        let counts: Vec<usize> = hist.bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![0, 1, 0, 0, 1, 1, 0, 1]);
        assert_eq!(hist.bins[1].lower, -0.75);
        assert_eq!(hist.bins[5].upper, 0.5);
    }

    #[test]
    fn sort_by_task_order_is_stable() {
        let mut summary = BatchSummary::new();
        summary.extend_task(vec![row("b", 0.1), row("b", 0.2)]);
        summary.extend_task(vec![row("a", 0.3)]);
        summary.sort_by_task_order(&["a".to_string(), "b".to_string()]);

        let kappas: Vec<f64> = summary.rows().iter().map(|r| r.kappa).collect();
        assert_eq!(kappas, vec![0.3, 0.1, 0.2]);
        assert_eq!(summary.task_rows("b").count(), 2);
    }
}
