//! Citation cell splitting.
//!
//! Raters are asked to separate citation numbers with commas or semicolons,
//! but free text also arrives as `3 5`, `3-5` or `[3][5]`. Delimiters are
//! tried in a fixed order and the first one present wins; that order must not
//! change or scores stop being reproducible across reruns.

use once_cell::sync::Lazy;
use regex::Regex;

static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit regex"));

/// Delimiters in precedence order.
pub const CITATION_DELIMITERS: [char; 4] = [',', ';', ' ', '-'];

/// Expand one citation cell into raw tokens.
///
/// Parts are trimmed but may be empty (`"12,"` yields `["12", ""]`); the
/// item normalizer drops those. Only the winning delimiter is applied, so
/// `"12, 14; 7"` yields `["12", "14; 7"]`.
pub fn split_citation_cell(raw: &str) -> Vec<String> {
    if !DIGIT_RUN_RE.is_match(raw) {
        return Vec::new();
    }

    if let Some(delimiter) = CITATION_DELIMITERS.iter().find(|d| raw.contains(**d)) {
        return raw
            .split(*delimiter)
            .map(|part| part.trim().to_string())
            .collect();
    }

    let runs: Vec<&str> = DIGIT_RUN_RE.find_iter(raw).map(|m| m.as_str()).collect();
    if runs.len() > 1 {
        return runs
            .into_iter()
            .filter(|run| *run != "0")
            .map(str::to_string)
            .collect();
    }

    vec![raw.trim().to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_digits_yields_nothing() {
        assert!(split_citation_cell("see appendix").is_empty());
        assert!(split_citation_cell("").is_empty());
    }

    #[test]
    fn comma_wins_over_semicolon() {
        assert_eq!(split_citation_cell("12, 14; 7"), vec!["12", "14; 7"]);
    }

    #[test]
    fn semicolon_then_space_then_hyphen() {
        assert_eq!(split_citation_cell("3;4"), vec!["3", "4"]);
        assert_eq!(split_citation_cell("3 4-5"), vec!["3", "4-5"]);
        assert_eq!(split_citation_cell("3-5"), vec!["3", "5"]);
    }

    #[test]
    fn digit_runs_fallback_discards_zero() {
        assert_eq!(split_citation_cell("[3][5]"), vec!["3", "5"]);
        assert_eq!(split_citation_cell("12.0"), vec!["12"]);
        assert_eq!(split_citation_cell("ref0/7"), vec!["7"]);
    }

    #[test]
    fn single_token_is_trimmed_original() {
        assert_eq!(split_citation_cell("[12]"), vec!["[12]"]);
        assert_eq!(split_citation_cell("\t42\t"), vec!["42"]);
    }

    #[test]
    fn empty_parts_are_kept_for_the_normalizer() {
        assert_eq!(split_citation_cell("12,"), vec!["12", ""]);
    }
}
