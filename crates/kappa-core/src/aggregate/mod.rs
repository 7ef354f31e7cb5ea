//! Submission aggregation into per-paper agreement tables.

pub mod aggregator;
pub mod table;

pub use aggregator::{Aggregator, TaskAggregation};
pub use table::{AgreementRow, AgreementTable};
