//! Core data model shared across the pipeline, benchmark runner, metric
//! engine, and aggregator.
//!
//! Documents and ground-truth entries are loaded once per run and treated as
//! immutable inputs. `ParserResult`, `PredictionRecord`, and `MetricScore`
//! are write-once per unit of work; `BenchmarkSummary` is a pure derived
//! view, recomputable at any time from the full record set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// A document under benchmark: raw bytes plus identity.
///
/// Immutable once loaded. The identifier is the filename stem, which is also
/// how documents are matched to ground-truth entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Dataset identifier (filename stem).
    pub id: String,
    /// Source path the bytes were read from.
    pub path: PathBuf,
    /// Raw content (image or PDF bytes).
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Page count, when known up front.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

impl Document {
    /// Create a document from raw bytes.
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            bytes,
            page_count: None,
        }
    }
}

/// Region of a page a text span was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One extracted text fragment, with optional position and confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<BoundingRegion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl TextSpan {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            region: None,
            confidence: None,
        }
    }
}

/// Pipeline stage names, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Preprocess,
    Parse,
    Postprocess,
}

/// Classified failure kinds, matching the error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    BackendUnavailable,
    Extraction,
    Timeout,
}

/// Structured error captured inside a [`ParserResult`] or
/// [`PredictionRecord`] instead of being propagated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionFailure {
    pub kind: FailureKind,
    /// Which pipeline stage failed, when attributable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineStage>,
    pub message: String,
}

impl ExtractionFailure {
    pub fn new(kind: FailureKind, stage: Option<PipelineStage>, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage,
            message: message.into(),
        }
    }
}

/// Output of one pipeline run over one document.
///
/// Always produced, even on failure: the error is carried in-band so batch
/// runs never abort on a single bad unit, and partial work (spans extracted
/// before a later stage failed) is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserResult {
    pub spans: Vec<TextSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ExtractionFailure>,
    /// Wall-clock extraction time.
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

impl ParserResult {
    /// Successful result from spans.
    pub fn from_spans(spans: Vec<TextSpan>) -> Self {
        Self {
            spans,
            error: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Failed result, keeping any partial spans.
    pub fn from_failure(failure: ExtractionFailure, partial: Vec<TextSpan>) -> Self {
        Self {
            spans: partial,
            error: Some(failure),
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Full extracted text, spans joined by newlines.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One question with its acceptable answers for a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruthEntry {
    pub document_id: String,
    pub question_id: String,
    pub question: String,
    /// Acceptable answer strings; any of these counts as correct.
    pub answers: Vec<String>,
    /// Page the answer evidence appears on, when annotated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_page: Option<u32>,
}

/// Ranked evidence segment supporting an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceSpan {
    pub text: String,
    /// Relevance score in [0,1]; the evidence list is ordered by this,
    /// descending.
    pub score: f64,
}

/// Prediction for one (document, question, parser) triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub document_id: String,
    pub question_id: String,
    pub parser_key: String,
    /// Candidate answers, most relevant first.
    pub answers: Vec<String>,
    /// Evidence segments ordered by descending relevance.
    pub evidence: Vec<EvidenceSpan>,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
    /// Present when the producing unit failed; failed records are excluded
    /// from scoring but still accounted for in the summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ExtractionFailure>,
}

impl PredictionRecord {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A metric value: a score in [0,1], or an explicit "not computable"
/// sentinel.
///
/// The invariant is enforced at construction: values are clamped to [0,1]
/// and NaN becomes `NotComputable` — callers never observe a negative value
/// or a NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum MetricValue {
    Available(f64),
    NotComputable,
}

impl MetricValue {
    /// Build a metric value, enforcing the [0,1]-or-sentinel invariant.
    pub fn score(value: f64) -> Self {
        if value.is_nan() {
            MetricValue::NotComputable
        } else {
            MetricValue::Available(value.clamp(0.0, 1.0))
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Available(v) => Some(*v),
            MetricValue::NotComputable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, MetricValue::Available(_))
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) => MetricValue::score(v),
            None => MetricValue::NotComputable,
        }
    }
}

impl From<MetricValue> for Option<f64> {
    fn from(value: MetricValue) -> Self {
        value.as_f64()
    }
}

/// Per-record metric scores, keyed by metric name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricScore {
    pub document_id: String,
    pub question_id: String,
    pub parser_key: String,
    pub metrics: BTreeMap<String, MetricValue>,
}

/// Mean/median statistics for one metric across a parser's records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    pub median: f64,
    /// How many records had an available value for this metric.
    pub scored: usize,
}

/// Aggregated view of one parser's benchmark run.
///
/// Recomputed from the stored records on demand; never mutated
/// incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub parser_key: String,
    pub metrics: BTreeMap<String, MetricStats>,
    /// Records produced without error.
    pub processed: usize,
    /// Records whose unit failed (extraction error, timeout, ...).
    pub failed: usize,
    /// Documents excluded because no ground truth matched them.
    pub skipped: usize,
    /// processed / (processed + failed); 0.0 when nothing ran.
    pub success_rate: f64,
    /// Mean extraction wall-clock time in milliseconds.
    pub mean_elapsed_ms: f64,
}

pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64() * 1000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let ms = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(ms.max(0.0) / 1000.0))
    }
}
