//! End-to-end benchmark flow over on-disk fixtures.

use doccraft::aggregate;
use doccraft::backends::PlainTextParser;
use doccraft::benchmark::{BenchmarkRunner, CancelFlag};
use doccraft::core::{BenchmarkConfig, Pipeline};
use doccraft::dataset::{load_documents, GroundTruthSet};
use doccraft::metrics;
use doccraft::output::ResultsFile;
use std::path::PathBuf;
use std::sync::Arc;

const GROUND_TRUTH: &str = r#"{
    "invoice-001": [
        {"question_id": "q1", "question": "What is the invoice number?", "answers": ["12345"]},
        {"question_id": "q2", "question": "What is the total due?", "answers": ["$99.00", "99.00"]}
    ]
}"#;

const INVOICE_TEXT: &str = "Invoice No. 12345 dated March 3, 2021\nTotal due: $99.00\n";

fn write_fixtures(dir: &std::path::Path) -> (PathBuf, PathBuf) {
    let documents = dir.join("documents");
    std::fs::create_dir(&documents).unwrap();
    std::fs::write(documents.join("invoice-001.txt"), INVOICE_TEXT).unwrap();
    std::fs::write(documents.join("stray.txt"), "not annotated").unwrap();

    let ground_truth = dir.join("ground_truth.json");
    std::fs::write(&ground_truth, GROUND_TRUTH).unwrap();
    (ground_truth, documents)
}

#[tokio::test]
async fn benchmark_scores_and_persists_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let (gt_path, doc_dir) = write_fixtures(dir.path());

    let ground_truth = GroundTruthSet::load(&gt_path, false).unwrap();
    let documents = load_documents(&doc_dir).unwrap();
    assert_eq!(documents.len(), 2);

    let config = BenchmarkConfig::default();
    let metric_config = config.metrics.clone();
    let mut runner = BenchmarkRunner::new(config).unwrap();
    runner
        .add_pipeline(Pipeline::new(Arc::new(PlainTextParser)))
        .unwrap();

    let run = runner
        .run(documents, &ground_truth, &CancelFlag::new())
        .await
        .unwrap();

    // One record per question, the unannotated document skipped.
    assert_eq!(run.records.len(), 2);
    assert_eq!(run.skipped_documents, vec!["stray"]);
    assert!(run.records.iter().all(|r| r.is_success()));

    let scores = metrics::score_run(&ground_truth, &run.records, &metric_config);
    assert_eq!(scores.len(), 2);

    // The invoice number is embedded in context: exact match fails but the
    // ANLS token-window alignment finds it.
    let invoice_score = scores.iter().find(|s| s.question_id == "q1").unwrap();
    assert_eq!(
        invoice_score.metrics[metrics::METRIC_EXACT].as_f64(),
        Some(0.0)
    );
    assert!(invoice_score.metrics[metrics::METRIC_ANLS].as_f64().unwrap() > 0.9);

    let summaries = aggregate::aggregate(&run, &scores);
    let summary = &summaries["plain-text"];
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.success_rate, 1.0);

    // Persist, reload, and re-derive: the stored summary must reproduce.
    let results_path = dir.path().join("results.json");
    let file = ResultsFile::build(
        run.records,
        scores,
        summaries.clone(),
        run.skipped_documents,
    );
    file.save(&results_path).unwrap();

    let loaded = ResultsFile::load(&results_path).unwrap();
    let rederived = loaded.reaggregate();
    assert_eq!(
        serde_json::to_string(&rederived).unwrap(),
        serde_json::to_string(&summaries).unwrap()
    );
}

#[tokio::test]
async fn empty_document_is_failed_not_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let documents_dir = dir.path().join("documents");
    std::fs::create_dir(&documents_dir).unwrap();
    std::fs::write(documents_dir.join("invoice-001.txt"), "").unwrap();

    let ground_truth = GroundTruthSet::from_json_str(GROUND_TRUTH, false).unwrap();
    let documents = load_documents(&documents_dir).unwrap();

    let mut runner = BenchmarkRunner::new(BenchmarkConfig::default()).unwrap();
    runner
        .add_pipeline(Pipeline::new(Arc::new(PlainTextParser)))
        .unwrap();

    let run = runner
        .run(documents, &ground_truth, &CancelFlag::new())
        .await
        .unwrap();

    assert!(run.skipped_documents.is_empty());
    assert_eq!(run.records.len(), 2);
    assert!(run.records.iter().all(|r| !r.is_success()));

    let summaries = aggregate::aggregate(&run, &[]);
    let summary = &summaries["plain-text"];
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.success_rate, 0.0);
}

#[tokio::test]
async fn max_questions_caps_records_per_document() {
    let dir = tempfile::tempdir().unwrap();
    let (gt_path, doc_dir) = write_fixtures(dir.path());

    let ground_truth = GroundTruthSet::load(&gt_path, false).unwrap();
    let documents = load_documents(&doc_dir).unwrap();

    let mut config = BenchmarkConfig::default();
    config.benchmark.max_questions = Some(1);
    let mut runner = BenchmarkRunner::new(config).unwrap();
    runner
        .add_pipeline(Pipeline::new(Arc::new(PlainTextParser)))
        .unwrap();

    let run = runner
        .run(documents, &ground_truth, &CancelFlag::new())
        .await
        .unwrap();
    assert_eq!(run.records.len(), 1);
    assert_eq!(run.records[0].question_id, "q1");
}
