//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! max_papers_per_submission = 10
//! doi_policy = "extract"
//! kappa_method = "fleiss"
//! round_digits = 2
//! ignored_submissions = ["973784087"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{KappaError, Result};
use crate::normalize::DoiPolicy;
use crate::score::KappaMethod;

/// Expected number of papers in one task's work package.
pub const DEFAULT_MAX_PAPERS: usize = 10;

/// Agreement needs at least two raters.
pub const MIN_RATERS_FLOOR: usize = 2;

/// Quarter-width bins over `[-1, 1]`.
pub const DEFAULT_HISTOGRAM_BINS: usize = 8;

/// Beyond this many decimals rounding stops being meaningful for `f64`.
pub const MAX_ROUND_DIGITS: u32 = 15;

/// Tunables for aggregation and scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgreementConfig {
    /// A submission naming more distinct papers than this is discarded.
    pub max_papers_per_submission: usize,
    pub doi_policy: DoiPolicy,
    pub kappa_method: KappaMethod,
    /// Decimal places kept in reported scores.
    pub round_digits: u32,
    /// Submission ids that are never processed.
    pub ignored_submissions: Vec<String>,
    /// Tasks with fewer available submissions produce no scores.
    pub min_raters: usize,
    /// Bin count for the score histogram.
    pub histogram_bins: usize,
}

impl Default for AgreementConfig {
    fn default() -> Self {
        Self {
            max_papers_per_submission: DEFAULT_MAX_PAPERS,
            doi_policy: DoiPolicy::default(),
            kappa_method: KappaMethod::default(),
            round_digits: 2,
            ignored_submissions: Vec::new(),
            min_raters: MIN_RATERS_FLOOR,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl AgreementConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_papers_per_submission == 0 {
            return Err(KappaError::InvalidConfig(
                "max_papers_per_submission must be at least 1".to_string(),
            ));
        }
        if self.min_raters < MIN_RATERS_FLOOR {
            return Err(KappaError::InvalidConfig(format!(
                "min_raters must be at least {MIN_RATERS_FLOOR}, got {}",
                self.min_raters
            )));
        }
        if self.round_digits > MAX_ROUND_DIGITS {
            return Err(KappaError::InvalidConfig(format!(
                "round_digits must be at most {MAX_ROUND_DIGITS}, got {}",
                self.round_digits
            )));
        }
        if self.histogram_bins == 0 {
            return Err(KappaError::InvalidConfig(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_ignored(&self, submission_id: &str) -> bool {
        self.ignored_submissions.iter().any(|id| id == submission_id)
    }

    pub fn with_max_papers(mut self, max: usize) -> Self {
        self.max_papers_per_submission = max;
        self
    }

    pub fn with_doi_policy(mut self, policy: DoiPolicy) -> Self {
        self.doi_policy = policy;
        self
    }

    pub fn with_kappa_method(mut self, method: KappaMethod) -> Self {
        self.kappa_method = method;
        self
    }
}
