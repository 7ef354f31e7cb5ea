//! Canonical paper and item keys.
//!
//! Keys are only minted by the normalizers in [`crate::normalize`], so two
//! keys compare equal exactly when their raw inputs denote the same paper or
//! the same cited artifact.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical paper identifier: a `https://doi.org/...` URL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaperKey(String);

impl PaperKey {
    pub(crate) fn new(canonical: String) -> Self {
        Self(canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PaperKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical item identifier, always bracketed (e.g. `[12]`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(String);

impl ItemKey {
    pub(crate) fn new(canonical: String) -> Self {
        Self(canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key without its surrounding brackets.
    pub fn label(&self) -> &str {
        let inner = self.0.strip_prefix('[').unwrap_or(&self.0);
        inner.strip_suffix(']').unwrap_or(inner)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
