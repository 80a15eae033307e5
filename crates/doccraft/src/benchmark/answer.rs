//! Answer selection strategies.
//!
//! Parsers extract text; they do not answer questions. An
//! [`AnswerSelector`] turns extracted text into candidate answers and
//! ranked evidence for one question, so stronger strategies (a QA model, a
//! layout-aware ranker) can be plugged in without touching the runner.

use crate::metrics::text::normalize_full;
use crate::types::{EvidenceSpan, ParserResult};

/// Candidate answers plus ranked evidence for one question.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Most relevant segments first.
    pub answers: Vec<String>,
    /// All scored segments, ordered by descending score.
    pub evidence: Vec<EvidenceSpan>,
}

/// Strategy for picking answers out of extracted text.
pub trait AnswerSelector: Send + Sync {
    fn select(&self, question: &str, result: &ParserResult) -> Selection;
}

/// How many top segments become candidate answers.
const MAX_ANSWERS: usize = 5;
/// Weight on the question-word overlap ratio.
const OVERLAP_WEIGHT: f64 = 0.6;
/// Boost for digit-bearing segments; document QA answers are dominated by
/// numbers, dates, and amounts.
const DIGIT_BOOST: f64 = 1.2;

/// Keyword-overlap answer selector.
///
/// Segments the extracted text into sentences (falling back to lines, then
/// the whole text), scores each segment by overlap with the question's
/// content words, and boosts segments containing digits. Deliberately
/// simple: it is a floor for evidence quality, not a QA system.
#[derive(Debug, Default)]
pub struct KeywordAnswerSelector;

impl KeywordAnswerSelector {
    fn segments(text: &str) -> Vec<String> {
        let sentences: Vec<String> = text
            .split(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if sentences.len() > 1 {
            return sentences;
        }

        let lines: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if lines.len() > 1 {
            return lines;
        }

        let whole = text.trim();
        if whole.is_empty() {
            vec![]
        } else {
            vec![whole.to_string()]
        }
    }

    fn score_segment(segment: &str, question_words: &[String]) -> f64 {
        let normalized = normalize_full(segment);
        let segment_words: Vec<&str> = normalized.split_whitespace().collect();

        let mut score = if question_words.is_empty() {
            0.0
        } else {
            let overlap = question_words
                .iter()
                .filter(|w| segment_words.contains(&w.as_str()))
                .count();
            overlap as f64 / question_words.len() as f64 * OVERLAP_WEIGHT
        };

        if segment.chars().any(|c| c.is_ascii_digit()) {
            score *= DIGIT_BOOST;
        }

        score.clamp(0.0, 1.0)
    }
}

impl AnswerSelector for KeywordAnswerSelector {
    fn select(&self, question: &str, result: &ParserResult) -> Selection {
        let question_words: Vec<String> = normalize_full(question)
            .split_whitespace()
            .filter(|w| w.len() > 2)
            .map(str::to_string)
            .collect();

        let mut scored: Vec<(usize, String, f64)> = Self::segments(&result.text())
            .into_iter()
            .enumerate()
            .map(|(i, segment)| {
                let score = Self::score_segment(&segment, &question_words);
                (i, segment, score)
            })
            .collect();

        // Descending score, document order on ties, for deterministic output.
        scored.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));

        let answers = scored
            .iter()
            .take(MAX_ANSWERS)
            .map(|(_, segment, _)| segment.clone())
            .collect();
        let evidence = scored
            .into_iter()
            .map(|(_, text, score)| EvidenceSpan { text, score })
            .collect();

        Selection { answers, evidence }
    }
}
