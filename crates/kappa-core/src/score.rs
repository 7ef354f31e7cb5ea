//! Fleiss' kappa over two categories (listed / not listed).
//!
//! For a table of K items rated by R raters, with `y` raters marking an item
//! present and `n` marking it absent:
//!
//! ```text
//! P_i   = ((y² − y) + (n² − n)) / (R · (R − 1))      observed, per item
//! P̄     = mean(P_i)
//! P̄_e   = (Σy / RK)² + (Σn / RK)²                   expected (Fleiss)
//! kappa = (P̄ − P̄_e) / (1 − P̄_e + ε)
//! ```
//!
//! `ε` ([`KAPPA_EPSILON`]) is not part of the statistic. It only keeps the
//! division finite when every rater agrees on every item (`P̄_e == 1`), in
//! which case the score is 0.

use serde::{Deserialize, Serialize};

use crate::aggregate::AgreementTable;
use crate::domain::{PaperKey, TaskId};

/// Added to the denominator so perfect uniform agreement does not divide by zero.
pub const KAPPA_EPSILON: f64 = 1e-32;

/// Floating-point summation can land a hair above the theoretical maximum.
pub const KAPPA_UPPER_BOUND: f64 = 1.0;

/// How chance agreement is estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KappaMethod {
    /// Category proportions taken from the table's marginals.
    #[default]
    Fleiss,
    /// Free-marginal: both categories equally likely (`P̄_e = 1/2`).
    Uniform,
}

/// Unrounded, unclamped kappa. `None` for tables with no rows or fewer than
/// two raters, where agreement is undefined.
pub fn fleiss_kappa(table: &AgreementTable, method: KappaMethod) -> Option<f64> {
    let raters = table.raters();
    if table.is_empty() || raters < 2 {
        return None;
    }

    let r = raters as f64;
    let k = table.len() as f64;
    let pair_count = r * (r - 1.0);

    let observed = table
        .rows()
        .iter()
        .map(|row| {
            let (y, n) = (row.y as f64, row.n as f64);
            ((y * y - y) + (n * n - n)) / pair_count
        })
        .sum::<f64>()
        / k;

    let expected = match method {
        KappaMethod::Fleiss => {
            let p_yes = table.total_present() as f64 / (r * k);
            let p_no = table.total_absent() as f64 / (r * k);
            p_yes * p_yes + p_no * p_no
        }
        KappaMethod::Uniform => 0.5,
    };

    Some((observed - expected) / (1.0 - expected + KAPPA_EPSILON))
}

/// Round half away from zero to `digits` decimal places.
///
/// Ties are decided on `value * 10^digits`, not on the exact binary value,
/// so this is not Python's `round()`: `0.125` gives `0.13` here where Python
/// gives `0.12`. Returns NaN once `10^digits` overflows.
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(digits).unwrap_or(i32::MAX));
    (value * factor).round() / factor
}

/// Reported score: rounded, then clamped to at most [`KAPPA_UPPER_BOUND`].
/// `None` when the table is unscorable or rounding left a non-finite value.
pub fn score_table(table: &AgreementTable, method: KappaMethod, digits: u32) -> Option<f64> {
    fleiss_kappa(table, method)
        .map(|raw| round_to(raw, digits))
        .filter(|rounded| rounded.is_finite())
        .map(|rounded| rounded.min(KAPPA_UPPER_BOUND))
}

/// Kappa for one (task, paper), with the counts that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreementScore {
    pub task_id: TaskId,
    pub paper: PaperKey,
    pub submissions: usize,
    pub available_submissions: usize,
    pub kappa: f64,
}
