//! Result aggregation and parser comparison.
//!
//! Summaries are pure folds over the record and score sets: aggregating the
//! same run twice yields byte-identical output. Means are accumulated
//! left-to-right over a stable (document id, question id) order so floating
//! point summation order never varies between runs.

use crate::benchmark::BenchmarkRun;
use crate::types::{BenchmarkSummary, MetricScore, MetricStats, PredictionRecord};
use std::collections::BTreeMap;

fn stats_for(values: &[f64]) -> MetricStats {
    if values.is_empty() {
        return MetricStats {
            mean: 0.0,
            median: 0.0,
            scored: 0,
        };
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    MetricStats {
        mean,
        median,
        scored: values.len(),
    }
}

/// Summarize one parser's records and scores.
pub fn summarize(
    parser_key: &str,
    records: &[&PredictionRecord],
    scores: &[&MetricScore],
    skipped: usize,
) -> BenchmarkSummary {
    let mut records: Vec<&PredictionRecord> = records.to_vec();
    records.sort_by(|a, b| (&a.document_id, &a.question_id).cmp(&(&b.document_id, &b.question_id)));
    let mut scores: Vec<&MetricScore> = scores.to_vec();
    scores.sort_by(|a, b| (&a.document_id, &a.question_id).cmp(&(&b.document_id, &b.question_id)));

    let processed = records.iter().filter(|r| r.is_success()).count();
    let failed = records.len() - processed;
    let success_rate = if records.is_empty() {
        0.0
    } else {
        processed as f64 / records.len() as f64
    };
    let mean_elapsed_ms = if records.is_empty() {
        0.0
    } else {
        records
            .iter()
            .map(|r| r.elapsed.as_secs_f64() * 1000.0)
            .sum::<f64>()
            / records.len() as f64
    };

    let mut per_metric: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for score in &scores {
        for (name, value) in &score.metrics {
            let values = per_metric.entry(name.clone()).or_default();
            if let Some(v) = value.as_f64() {
                values.push(v);
            }
        }
    }
    let metrics = per_metric
        .into_iter()
        .map(|(name, values)| (name, stats_for(&values)))
        .collect();

    BenchmarkSummary {
        parser_key: parser_key.to_string(),
        metrics,
        processed,
        failed,
        skipped,
        success_rate,
        mean_elapsed_ms,
    }
}

/// Summarize stored records and scores, grouped by parser key.
pub fn aggregate_records(
    records: &[PredictionRecord],
    scores: &[MetricScore],
    skipped: usize,
) -> BTreeMap<String, BenchmarkSummary> {
    let mut records_by_parser: BTreeMap<&str, Vec<&PredictionRecord>> = BTreeMap::new();
    for record in records {
        records_by_parser
            .entry(record.parser_key.as_str())
            .or_default()
            .push(record);
    }

    let mut scores_by_parser: BTreeMap<&str, Vec<&MetricScore>> = BTreeMap::new();
    for score in scores {
        scores_by_parser
            .entry(score.parser_key.as_str())
            .or_default()
            .push(score);
    }

    records_by_parser
        .into_iter()
        .map(|(key, parser_records)| {
            let parser_scores = scores_by_parser.get(key).map(Vec::as_slice).unwrap_or(&[]);
            (
                key.to_string(),
                summarize(key, &parser_records, parser_scores, skipped),
            )
        })
        .collect()
}

/// Summarize a benchmark run.
pub fn aggregate(run: &BenchmarkRun, scores: &[MetricScore]) -> BTreeMap<String, BenchmarkSummary> {
    aggregate_records(&run.records, scores, run.skipped_documents.len())
}

/// Rank summaries for comparison.
///
/// Order: primary metric mean descending, then mean elapsed ascending
/// (faster wins a quality tie), then parser key ascending.
pub fn compare(
    summaries: &BTreeMap<String, BenchmarkSummary>,
    primary_metric: &str,
) -> Vec<BenchmarkSummary> {
    let primary = |summary: &BenchmarkSummary| -> f64 {
        summary
            .metrics
            .get(primary_metric)
            .filter(|stats| stats.scored > 0)
            .map(|stats| stats.mean)
            .unwrap_or(-1.0)
    };

    let mut ranked: Vec<BenchmarkSummary> = summaries.values().cloned().collect();
    ranked.sort_by(|a, b| {
        primary(b)
            .total_cmp(&primary(a))
            .then(a.mean_elapsed_ms.total_cmp(&b.mean_elapsed_ms))
            .then(a.parser_key.cmp(&b.parser_key))
    });
    ranked
}
