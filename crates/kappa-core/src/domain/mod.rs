//! Domain model for agreement computation.
//!
//! - `RaterSubmission`: one rater's parsed rows for a task
//! - `PaperKey` / `ItemKey`: canonical identifiers
//! - `Exclusion`: recoverable reasons data was narrowed
//! - `KappaError`: failures of the ambient layer

pub mod error;
pub mod exclusion;
pub mod keys;
pub mod submission;

pub use error::{InvalidPaperId, KappaError, Result};
pub use exclusion::Exclusion;
pub use keys::{ItemKey, PaperKey};
pub use submission::{
    CellValue, RaterSubmission, SubmissionBody, SubmissionRow, TaskId, TaskInput,
};
