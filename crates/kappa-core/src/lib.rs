//! Inter-rater agreement engine.
//!
//! Raters independently list which cited artifacts belong to which paper.
//! This crate normalizes their identifiers, tabulates who listed what, and
//! scores each paper with Fleiss' kappa:
//!
//! ```ignore
//! let engine = Engine::new(AgreementConfig::default())?;
//! let outcome = engine.process_task(&TaskInput::new("197", submissions));
//! for score in &outcome.scores {
//!     println!("{} {}", score.paper, score.kappa);
//! }
//! ```
//!
//! Fetching, CSV parsing and schema validation happen outside; the engine
//! receives already-parsed [`RaterSubmission`]s.

pub mod aggregate;
pub mod config;
pub mod domain;
pub mod engine;
pub mod metrics;
pub mod normalize;
pub mod obs;
pub mod parallel;
pub mod reporting;
pub mod score;
pub mod split;
pub mod summary;
pub mod telemetry;

pub use aggregate::{Aggregator, AgreementRow, AgreementTable, TaskAggregation};
pub use config::AgreementConfig;
pub use domain::{
    CellValue, Exclusion, InvalidPaperId, ItemKey, KappaError, PaperKey, RaterSubmission, Result,
    SubmissionBody, SubmissionRow, TaskId, TaskInput,
};
pub use engine::{Engine, TaskOutcome};
pub use metrics::METRICS;
pub use normalize::{normalize_item_id, normalize_item_token, normalize_paper_id, DoiPolicy};
pub use obs::TaskSpan;
pub use parallel::{BatchRunner, SubmissionSource};
pub use reporting::{
    render_summary_md, write_batch_json, write_scores_csv, write_scores_csv_file, BatchArtifact,
};
pub use score::{fleiss_kappa, score_table, AgreementScore, KappaMethod};
pub use split::split_citation_cell;
pub use summary::{BatchSummary, Histogram, HistogramBin, ScoreStats, ScoredRow};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
