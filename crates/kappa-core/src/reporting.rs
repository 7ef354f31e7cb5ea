//! Report writers for batch results.
//!
//! - `kappa_scores.csv`: flat rows, one per scored paper
//! - `kappa_results.json`: rows plus statistics, histogram and the config used
//! - a Markdown summary for issue comments

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AgreementConfig;
use crate::domain::Result;
use crate::summary::{BatchSummary, Histogram, ScoreStats, ScoredRow};

pub const SCHEMA_VERSION: &str = "1.0";

/// Column header of the flat score file.
pub const CSV_HEADER: [&str; 5] = [
    "issue_id",
    "submissions",
    "available submissions",
    "paper doi",
    "kappa",
];

/// JSON artifact for a scored batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchArtifact {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub config: AgreementConfig,
    pub stats: Option<ScoreStats>,
    pub histogram: Histogram,
    pub rows: Vec<ScoredRow>,
}

impl BatchArtifact {
    pub fn new(config: &AgreementConfig, summary: &BatchSummary, now: DateTime<Utc>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: now,
            config: config.clone(),
            stats: summary.stats(),
            histogram: summary.histogram(config.histogram_bins),
            rows: summary.rows().to_vec(),
        }
    }
}

/// Write scored rows as CSV to any writer.
pub fn write_scores_csv<W: Write>(writer: W, rows: &[ScoredRow]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for row in rows {
        csv.write_record([
            row.task_id.clone(),
            row.submissions.to_string(),
            row.available_submissions.to_string(),
            row.paper.to_string(),
            row.kappa.to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write scored rows to a CSV file.
pub fn write_scores_csv_file(path: &Path, rows: &[ScoredRow]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_scores_csv(file, rows)
}

/// Write the JSON artifact in pretty format.
pub fn write_batch_json(path: &Path, artifact: &BatchArtifact) -> Result<()> {
    let content = serde_json::to_string_pretty(artifact)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Render a Markdown summary of the batch.
pub fn render_summary_md(artifact: &BatchArtifact) -> String {
    let mut out = String::new();
    out.push_str("# Agreement Summary\n\n");

    match &artifact.stats {
        Some(stats) => out.push_str(&format!(
            "- tasks scored: {}\n- papers scored: {}\n- mean kappa: {:.2}\n- min kappa: {:.2}\n- max kappa: {:.2}\n\n",
            stats.tasks, stats.count, stats.mean, stats.min, stats.max
        )),
        None => out.push_str("No papers could be scored.\n\n"),
    }

    out.push_str("## Distribution\n");
    for bin in &artifact.histogram.bins {
        out.push_str(&format!(
            "- [{:.2}, {:.2}): {}\n",
            bin.lower, bin.upper, bin.count
        ));
    }

    if !artifact.rows.is_empty() {
        out.push_str("\n## Scores\n");
        out.push_str("| task | submissions | available | paper | kappa |\n");
        out.push_str("|---|---|---|---|---|\n");
        for row in &artifact.rows {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {:.2} |\n",
                row.task_id, row.submissions, row.available_submissions, row.paper, row.kappa
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize_paper_id, DoiPolicy};
    use serde_json::json;

    fn sample_summary() -> BatchSummary {
        let mut summary = BatchSummary::new();
        summary.push(ScoredRow {
            task_id: "197".to_string(),
            submissions: 3,
            available_submissions: 2,
            paper: normalize_paper_id("10.1/x", DoiPolicy::Extract).unwrap(),
            kappa: -0.2,
        });
        summary
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .expect("parse RFC3339")
            .with_timezone(&Utc)
    }

    #[test]
    fn csv_has_header_and_rows() {
        let mut buf = Vec::new();
        write_scores_csv(&mut buf, sample_summary().rows()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "issue_id,submissions,available submissions,paper doi,kappa\n197,3,2,https://doi.org/10.1/x,-0.2\n"
        );
    }

    #[test]
    fn artifact_schema_has_expected_keys() {
        let config = AgreementConfig {
            histogram_bins: 4,
            ..AgreementConfig::default()
        };
        let artifact = BatchArtifact::new(&config, &sample_summary(), fixed_now());
        let raw = serde_json::to_value(&artifact).expect("serialize artifact");
        let obj = raw.as_object().expect("artifact object");
        for key in ["schema_version", "generated_at", "config", "stats", "histogram", "rows"] {
            assert!(obj.contains_key(key), "missing key: {key}");
        }
        assert_eq!(raw["rows"][0]["paper"], json!("https://doi.org/10.1/x"));
        assert_eq!(raw["config"]["doi_policy"], json!("extract"));
        assert_eq!(raw["histogram"]["bins"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn markdown_render_is_stable() {
        let config = AgreementConfig {
            histogram_bins: 2,
            ..AgreementConfig::default()
        };
        let artifact = BatchArtifact::new(&config, &sample_summary(), fixed_now());
        let expected = "# Agreement Summary\n\n- tasks scored: 1\n- papers scored: 1\n- mean kappa: -0.20\n- min kappa: -0.20\n- max kappa: -0.20\n\n## Distribution\n- [-1.00, 0.00): 1\n- [0.00, 1.00): 0\n\n## Scores\n| task | submissions | available | paper | kappa |\n|---|---|---|---|---|\n| 197 | 3 | 2 | https://doi.org/10.1/x | -0.20 |\n";
        assert_eq!(render_summary_md(&artifact), expected);
    }

    #[test]
    fn empty_batch_renders_notice() {
        let artifact = BatchArtifact::new(
            &AgreementConfig::default(),
            &BatchSummary::new(),
            fixed_now(),
        );
        assert!(render_summary_md(&artifact).contains("No papers could be scored."));
    }
}
