//! Mean average precision over ranked evidence.

use crate::metrics::text::normalize_full;
use crate::types::{EvidenceSpan, MetricValue};

/// Whether an evidence segment supports any ground-truth answer.
///
/// Relevance is containment after full normalization, so "Invoice No.
/// 12345" is relevant to the answer "12345".
fn is_relevant(evidence: &str, truths: &[String]) -> bool {
    let evidence = normalize_full(evidence);
    if evidence.is_empty() {
        return false;
    }
    truths
        .iter()
        .map(|t| normalize_full(t))
        .any(|t| !t.is_empty() && evidence.contains(&t))
}

/// Average precision of the evidence ranking against the ground-truth
/// answers.
///
/// The evidence list is scored in its given order (descending relevance
/// score). `NotComputable` on an empty evidence list; 0.0 when nothing
/// relevant was retrieved.
pub fn average_precision(evidence: &[EvidenceSpan], truths: &[String]) -> MetricValue {
    if evidence.is_empty() {
        return MetricValue::NotComputable;
    }

    let mut relevant = 0usize;
    let mut precision_sum = 0.0f64;
    for (rank, span) in evidence.iter().enumerate() {
        if is_relevant(&span.text, truths) {
            relevant += 1;
            precision_sum += relevant as f64 / (rank + 1) as f64;
        }
    }

    if relevant == 0 {
        return MetricValue::score(0.0);
    }
    MetricValue::score(precision_sum / relevant as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(texts: &[&str]) -> Vec<EvidenceSpan> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| EvidenceSpan {
                text: text.to_string(),
                score: 1.0 - i as f64 * 0.1,
            })
            .collect()
    }

    fn truths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_relevant_first_scores_one() {
        let value = average_precision(
            &evidence(&["Invoice No. 12345", "unrelated footer"]),
            &truths(&["12345"]),
        );
        assert_eq!(value, MetricValue::Available(1.0));
    }

    #[test]
    fn test_relevant_second_scores_half() {
        let value = average_precision(
            &evidence(&["unrelated header", "Invoice No. 12345"]),
            &truths(&["12345"]),
        );
        assert_eq!(value, MetricValue::Available(0.5));
    }

    #[test]
    fn test_mixed_ranking() {
        // Relevant at ranks 1 and 3: (1/1 + 2/3) / 2 = 5/6.
        let value = average_precision(
            &evidence(&["total is 12345", "noise", "amount 12345 due"]),
            &truths(&["12345"]),
        )
        .as_f64()
        .unwrap();
        assert!((value - 5.0 / 6.0).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn test_nothing_relevant_scores_zero() {
        let value = average_precision(&evidence(&["alpha", "beta"]), &truths(&["12345"]));
        assert_eq!(value, MetricValue::Available(0.0));
    }

    #[test]
    fn test_empty_evidence_not_computable() {
        assert_eq!(
            average_precision(&[], &truths(&["12345"])),
            MetricValue::NotComputable
        );
    }

    #[test]
    fn test_relevance_is_normalized_containment() {
        let value = average_precision(&evidence(&["CAFÉ opens at nine"]), &truths(&["cafe"]));
        assert_eq!(value, MetricValue::Available(1.0));
    }
}
