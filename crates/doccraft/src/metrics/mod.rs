//! Metric engine: pure scoring functions over prediction records.
//!
//! Every metric is a pure function of (prediction, ground truth); batch
//! scoring parallelizes over records with rayon. All values obey the
//! [0,1]-or-`NotComputable` invariant enforced by
//! [`crate::types::MetricValue`].

pub mod anls;
pub mod map;
pub mod text;

use crate::core::config::MetricConfig;
use crate::dataset::GroundTruthSet;
use crate::types::{GroundTruthEntry, MetricScore, PredictionRecord};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

pub use anls::anls;
pub use map::average_precision;
pub use text::{exact_match, normalized_match};

pub const METRIC_EXACT: &str = "exact_match";
pub const METRIC_NORMALIZED: &str = "normalized_match";
pub const METRIC_ANLS: &str = "anls";
pub const METRIC_MAP: &str = "map";

/// Every metric the engine computes, in report order.
pub const METRIC_NAMES: &[&str] = &[METRIC_EXACT, METRIC_NORMALIZED, METRIC_ANLS, METRIC_MAP];

/// Score one prediction record against its ground-truth entry.
pub fn score_record(
    entry: &GroundTruthEntry,
    record: &PredictionRecord,
    config: &MetricConfig,
) -> MetricScore {
    let mut metrics = BTreeMap::new();
    metrics.insert(
        METRIC_EXACT.to_string(),
        exact_match(&record.answers, &entry.answers),
    );
    metrics.insert(
        METRIC_NORMALIZED.to_string(),
        normalized_match(&record.answers, &entry.answers),
    );
    metrics.insert(
        METRIC_ANLS.to_string(),
        anls(&record.answers, &entry.answers, config.anls_threshold),
    );
    metrics.insert(
        METRIC_MAP.to_string(),
        average_precision(&record.evidence, &entry.answers),
    );

    MetricScore {
        document_id: record.document_id.clone(),
        question_id: record.question_id.clone(),
        parser_key: record.parser_key.clone(),
        metrics,
    }
}

/// Score every successful record in a run.
///
/// Failed records and records without a matching ground-truth entry are
/// skipped. Output is sorted by (document id, question id, parser key) so
/// repeated scoring of the same run is byte-identical.
pub fn score_run(
    ground_truth: &GroundTruthSet,
    records: &[PredictionRecord],
    config: &MetricConfig,
) -> Vec<MetricScore> {
    let mut scores: Vec<MetricScore> = records
        .par_iter()
        .filter(|record| record.is_success())
        .filter_map(|record| {
            let entry = ground_truth
                .questions_for(&record.document_id)?
                .iter()
                .find(|e| e.question_id == record.question_id)?;
            Some(score_record(entry, record, config))
        })
        .collect();

    scores.sort_by(|a, b| {
        (&a.document_id, &a.question_id, &a.parser_key)
            .cmp(&(&b.document_id, &b.question_id, &b.parser_key))
    });
    debug!(records = records.len(), scored = scores.len(), "scored run");
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EvidenceSpan, ExtractionFailure, FailureKind};
    use std::time::Duration;

    fn entry() -> GroundTruthEntry {
        GroundTruthEntry {
            document_id: "invoice-001".to_string(),
            question_id: "q1".to_string(),
            question: "What is the invoice number?".to_string(),
            answers: vec!["12345".to_string()],
            evidence_page: None,
        }
    }

    fn record(answers: &[&str]) -> PredictionRecord {
        PredictionRecord {
            document_id: "invoice-001".to_string(),
            question_id: "q1".to_string(),
            parser_key: "plain-text".to_string(),
            answers: answers.iter().map(|s| s.to_string()).collect(),
            evidence: vec![EvidenceSpan {
                text: "Invoice No. 12345".to_string(),
                score: 0.9,
            }],
            elapsed: Duration::from_millis(10),
            error: None,
        }
    }

    #[test]
    fn test_score_record_computes_all_metrics() {
        let score = score_record(
            &entry(),
            &record(&["Invoice No. 12345 dated March 3, 2021"]),
            &MetricConfig::default(),
        );

        assert_eq!(score.metrics.len(), METRIC_NAMES.len());
        assert_eq!(score.metrics[METRIC_EXACT].as_f64(), Some(0.0));
        assert!(score.metrics[METRIC_ANLS].as_f64().unwrap() > 0.9);
        assert_eq!(score.metrics[METRIC_MAP].as_f64(), Some(1.0));
    }

    #[test]
    fn test_score_run_skips_failed_and_unmatched() {
        let gt = GroundTruthSet::from_json_str(
            r#"{"invoice-001": [{"question_id": "q1", "question": "n?", "answers": ["12345"]}]}"#,
            false,
        )
        .unwrap();

        let mut failed = record(&["12345"]);
        failed.error = Some(ExtractionFailure::new(
            FailureKind::Timeout,
            None,
            "timed out",
        ));

        let mut unmatched = record(&["12345"]);
        unmatched.question_id = "q9".to_string();

        let scores = score_run(
            &gt,
            &[record(&["12345"]), failed, unmatched],
            &MetricConfig::default(),
        );
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].metrics[METRIC_EXACT].as_f64(), Some(1.0));
    }

    #[test]
    fn test_score_run_is_deterministic() {
        let gt = GroundTruthSet::from_json_str(
            r#"{"invoice-001": [{"question_id": "q1", "question": "n?", "answers": ["12345"]}]}"#,
            false,
        )
        .unwrap();
        let records = vec![record(&["12345"]), {
            let mut r = record(&["12345"]);
            r.parser_key = "alt".to_string();
            r
        }];

        let first = score_run(&gt, &records, &MetricConfig::default());
        let second = score_run(&gt, &records, &MetricConfig::default());
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first[0].parser_key, "alt");
    }
}
