//! Text normalization and equality metrics.

use crate::types::MetricValue;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase and collapse runs of whitespace to single spaces.
pub fn normalize_light(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Aggressive normalization: lowercase, strip diacritics (NFD then drop
/// combining marks), drop punctuation, collapse whitespace.
pub fn normalize_full(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    normalize_light(&stripped)
}

fn equality_metric(
    candidates: &[String],
    truths: &[String],
    normalize: fn(&str) -> String,
) -> MetricValue {
    let truths: Vec<String> = truths
        .iter()
        .map(|t| normalize(t))
        .filter(|t| !t.is_empty())
        .collect();
    if truths.is_empty() {
        return MetricValue::NotComputable;
    }

    let hit = candidates
        .iter()
        .map(|c| normalize(c))
        .any(|c| !c.is_empty() && truths.contains(&c));
    MetricValue::score(if hit { 1.0 } else { 0.0 })
}

/// Case- and whitespace-insensitive equality between any candidate and any
/// ground-truth answer.
pub fn exact_match(candidates: &[String], truths: &[String]) -> MetricValue {
    equality_metric(candidates, truths, normalize_light)
}

/// Equality after full normalization (punctuation and diacritics stripped).
/// Anything exact-matching also matches here.
pub fn normalized_match(candidates: &[String], truths: &[String]) -> MetricValue {
    equality_metric(candidates, truths, normalize_full)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_match_ignores_case_and_whitespace() {
        let truths = strings(&["paris", "PARIS "]);
        assert_eq!(
            exact_match(&strings(&["Paris"]), &truths),
            MetricValue::Available(1.0)
        );
    }

    #[test]
    fn test_exact_match_fails_on_extra_context() {
        let value = exact_match(
            &strings(&["Invoice No. 12345 dated March 3, 2021"]),
            &strings(&["12345"]),
        );
        assert_eq!(value, MetricValue::Available(0.0));
    }

    #[test]
    fn test_exact_match_no_truths_not_computable() {
        assert_eq!(
            exact_match(&strings(&["anything"]), &strings(&["", "  "])),
            MetricValue::NotComputable
        );
    }

    #[test]
    fn test_normalized_match_strips_punctuation_and_diacritics() {
        assert_eq!(
            normalized_match(&strings(&["café, naturally!"]), &strings(&["cafe naturally"])),
            MetricValue::Available(1.0)
        );
    }

    #[test]
    fn test_normalized_match_inherits_exact_hit() {
        let candidates = strings(&["Paris"]);
        let truths = strings(&["paris"]);
        assert_eq!(exact_match(&candidates, &truths), MetricValue::Available(1.0));
        assert_eq!(
            normalized_match(&candidates, &truths),
            MetricValue::Available(1.0)
        );
    }

    #[test]
    fn test_normalize_full() {
        assert_eq!(normalize_full("  Héllo,   Wörld! "), "hello world");
        assert_eq!(normalize_full("A.B.C."), "a b c");
    }
}
