//! Average Normalized Levenshtein Similarity.
//!
//! Per (candidate, truth) pair the score is the better of whole-string
//! similarity and the best token-window alignment at the truth's token
//! length. The window pass is what lets a candidate that embeds the answer
//! in extra context ("Invoice No. 12345 dated ...") still score near 1.0
//! against "12345". Similarities below the threshold are clamped to 0, per
//! the usual ANLS definition.

use crate::metrics::text::normalize_light;
use crate::types::MetricValue;
use strsim::normalized_levenshtein;

fn pair_similarity(candidate: &str, truth: &str) -> f64 {
    let mut best = normalized_levenshtein(candidate, truth);

    let truth_len = truth.split_whitespace().count();
    if truth_len > 0 {
        let tokens: Vec<&str> = candidate.split_whitespace().collect();
        for window in tokens.windows(truth_len) {
            let aligned = window.join(" ");
            best = best.max(normalized_levenshtein(&aligned, truth));
        }
    }

    best
}

/// ANLS between candidate answers and ground-truth answers.
///
/// Takes the best pair score across both lists. `NotComputable` when both
/// sides normalize to nothing; a one-sided blank scores 0.
pub fn anls(candidates: &[String], truths: &[String], threshold: f64) -> MetricValue {
    let candidates: Vec<String> = candidates
        .iter()
        .map(|c| normalize_light(c))
        .filter(|c| !c.is_empty())
        .collect();
    let truths: Vec<String> = truths
        .iter()
        .map(|t| normalize_light(t))
        .filter(|t| !t.is_empty())
        .collect();

    if candidates.is_empty() && truths.is_empty() {
        return MetricValue::NotComputable;
    }
    if candidates.is_empty() || truths.is_empty() {
        return MetricValue::score(0.0);
    }

    let mut best = 0.0f64;
    for candidate in &candidates {
        for truth in &truths {
            best = best.max(pair_similarity(candidate, truth));
        }
    }

    if best < threshold {
        best = 0.0;
    }
    MetricValue::score(best)
}
