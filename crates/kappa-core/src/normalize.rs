//! Identifier normalization.
//!
//! Paper identifiers become `https://doi.org/<doi>` URLs and item tokens
//! become bracketed strings such as `[12]`. Both normalizers are idempotent:
//! feeding a canonical key back in returns it unchanged.

use serde::{Deserialize, Serialize};

use crate::domain::{CellValue, InvalidPaperId, ItemKey, PaperKey};

/// Marker that starts every DOI (`10.<registrant>/<suffix>`).
pub const DOI_PREFIX_MARKER: &str = "10.";

/// Resolver prefix used for canonical paper keys.
pub const DOI_RESOLVER: &str = "https://doi.org/";

/// How paper identifiers without a resolver URL are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoiPolicy {
    /// Keep everything from the first `10.` onward and prefix the resolver.
    /// Identifiers without `10.` are rejected.
    #[default]
    Extract,
    /// Trim, then prefix the resolver unless the value already starts with
    /// `http`. Only blank identifiers are rejected.
    Wrap,
}

/// Canonicalize a raw paper identifier under `policy`.
pub fn normalize_paper_id(raw: &str, policy: DoiPolicy) -> Result<PaperKey, InvalidPaperId> {
    let trimmed = raw.trim();
    let canonical = match policy {
        DoiPolicy::Extract => trimmed
            .find(DOI_PREFIX_MARKER)
            .map(|start| format!("{DOI_RESOLVER}{}", &trimmed[start..])),
        DoiPolicy::Wrap if trimmed.is_empty() => None,
        DoiPolicy::Wrap if trimmed.starts_with("http") => Some(trimmed.to_string()),
        DoiPolicy::Wrap => Some(format!("{DOI_RESOLVER}{trimmed}")),
    };

    canonical.map(PaperKey::new).ok_or_else(|| InvalidPaperId {
        raw: raw.to_string(),
    })
}

/// Canonicalize one citation token.
///
/// Numbers are rendered as integers with the fraction truncated; NaN becomes
/// the literal `nan`. Returns `None` when nothing is left after trimming or
/// the cell is missing.
pub fn normalize_item_id(raw: &CellValue) -> Option<ItemKey> {
    match raw {
        CellValue::Missing => None,
        CellValue::Number(n) if n.is_nan() => normalize_item_token("nan"),
        CellValue::Number(n) => normalize_item_token(&(n.trunc() as i64).to_string()),
        CellValue::Text(s) => normalize_item_token(s),
    }
}

/// Text form of [`normalize_item_id`].
pub fn normalize_item_token(raw: &str) -> Option<ItemKey> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut key = String::with_capacity(trimmed.len() + 2);
    if !trimmed.starts_with('[') {
        key.push('[');
    }
    key.push_str(trimmed);
    if !trimmed.ends_with(']') {
        key.push(']');
    }
    Some(ItemKey::new(key))
}
