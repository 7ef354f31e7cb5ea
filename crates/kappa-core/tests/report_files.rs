use kappa_core::{
    render_summary_md, write_batch_json, write_scores_csv_file, AgreementConfig, BatchArtifact,
    Engine, RaterSubmission, TaskInput,
};
use tempfile::tempdir;

fn scored_batch() -> (AgreementConfig, kappa_core::BatchSummary) {
    let config = AgreementConfig::default();
    let engine = Engine::new(config.clone()).unwrap();
    let tasks = vec![TaskInput::new(
        "197",
        vec![
            RaterSubmission::from_pairs("alice", [("10.1/x", "1, 2, 3")]),
            RaterSubmission::from_pairs("bob", [("10.1/x", "1, 2")]),
            RaterSubmission::unreadable("carol", "parse error"),
        ],
    )];
    (config, engine.process_batch(&tasks))
}

#[test]
fn csv_file_matches_flat_layout() {
    let (_, summary) = scored_batch();
    let dir = tempdir().unwrap();
    let path = dir.path().join("kappa_scores.csv");

    write_scores_csv_file(&path, summary.rows()).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "issue_id,submissions,available submissions,paper doi,kappa",
            "197,3,2,https://doi.org/10.1/x,-0.2",
        ]
    );
}

#[test]
fn json_artifact_roundtrips() {
    let (config, summary) = scored_batch();
    let dir = tempdir().unwrap();
    let path = dir.path().join("kappa_results.json");
    let artifact = BatchArtifact::new(&config, &summary, chrono::Utc::now());

    write_batch_json(&path, &artifact).unwrap();

    let back: BatchArtifact =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(back.schema_version, artifact.schema_version);
    assert_eq!(back.config, artifact.config);
    assert_eq!(back.rows.len(), 1);
    assert_eq!(back.rows[0].paper, artifact.rows[0].paper);
    assert!((back.rows[0].kappa - artifact.rows[0].kappa).abs() < 1e-12);
    assert_eq!(back.histogram.total(), 1);
    assert!(render_summary_md(&back).contains("| 197 | 3 | 2 | https://doi.org/10.1/x | -0.20 |"));
}
