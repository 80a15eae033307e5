//! Run configuration types.
//!
//! Configuration deserializes from JSON with defaults for every field, so a
//! partial config file (or none at all) yields a usable run. `validate`
//! catches contradictory values before any work starts.

use crate::{DocCraftError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Per-parser extraction configuration.
///
/// `options` carries backend-specific keys; parsers reject unknown keys in
/// `validate_config` rather than silently ignoring them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Language hint for OCR backends (e.g. `"eng"`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Minimum span confidence; spans below it are dropped by backends that
    /// report confidence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,
    /// Backend-specific options.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, serde_json::Value>,
}

impl ParserConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(threshold) = self.confidence_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(DocCraftError::configuration(format!(
                    "confidence_threshold must be within [0.0, 1.0], got {threshold}"
                )));
            }
        }
        Ok(())
    }
}

/// Metric engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    /// Similarity cutoff for the ANLS family: similarities at or below this
    /// score 0.
    pub anls_threshold: f64,
    /// Metric used to rank parsers in comparisons.
    pub primary_metric: String,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            anls_threshold: 0.5,
            primary_metric: crate::metrics::METRIC_ANLS.to_string(),
        }
    }
}

impl MetricConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.anls_threshold) {
            return Err(DocCraftError::configuration(format!(
                "anls_threshold must be within [0.0, 1.0), got {}",
                self.anls_threshold
            )));
        }
        if !crate::metrics::METRIC_NAMES.contains(&self.primary_metric.as_str()) {
            return Err(DocCraftError::configuration(format!(
                "unknown primary_metric '{}' (known: [{}])",
                self.primary_metric,
                crate::metrics::METRIC_NAMES.join(", ")
            )));
        }
        Ok(())
    }
}

fn default_item_timeout_secs() -> f64 {
    120.0
}

fn default_max_concurrent() -> usize {
    num_cpus::get().max(1)
}

/// Benchmark runner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkOptions {
    /// Cap on questions per document; `None` means all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_questions: Option<usize>,
    /// Cap on documents per run; `None` means all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_documents: Option<usize>,
    /// Wall-clock budget per (document, parser) unit, in seconds.
    pub item_timeout_secs: f64,
    /// Worker pool size.
    pub max_concurrent: usize,
    /// Abort the run on the first unit failure instead of recording it.
    pub strict: bool,
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self {
            max_questions: None,
            max_documents: None,
            item_timeout_secs: default_item_timeout_secs(),
            max_concurrent: default_max_concurrent(),
            strict: false,
        }
    }
}

impl BenchmarkOptions {
    pub fn item_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.item_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.item_timeout_secs <= 0.0 {
            return Err(DocCraftError::configuration(format!(
                "item_timeout_secs must be positive, got {}",
                self.item_timeout_secs
            )));
        }
        if self.max_concurrent == 0 {
            return Err(DocCraftError::configuration(
                "max_concurrent must be at least 1",
            ));
        }
        if self.max_questions == Some(0) {
            return Err(DocCraftError::configuration(
                "max_questions of 0 would score nothing; omit it to run all questions",
            ));
        }
        if self.max_documents == Some(0) {
            return Err(DocCraftError::configuration(
                "max_documents of 0 would score nothing; omit it to run all documents",
            ));
        }
        Ok(())
    }
}

/// Top-level configuration for a benchmark run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub benchmark: BenchmarkOptions,
    pub metrics: MetricConfig,
    /// Per-parser overrides, keyed by registry key.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parsers: BTreeMap<String, ParserConfig>,
}

impl BenchmarkConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| {
            DocCraftError::configuration_with_source(
                format!("failed to parse config file '{}'", path.display()),
                e,
            )
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration for a parser, falling back to defaults.
    pub fn parser_config(&self, key: &str) -> ParserConfig {
        self.parsers.get(key).cloned().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        self.benchmark.validate()?;
        self.metrics.validate()?;
        for (key, parser) in &self.parsers {
            parser.validate().map_err(|e| {
                DocCraftError::configuration(format!("parser '{key}': {e}"))
            })?;
        }
        Ok(())
    }
}
