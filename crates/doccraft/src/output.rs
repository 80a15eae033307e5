//! Results file persistence.
//!
//! A results file stores, per parser, the raw prediction records, their
//! metric scores, and the derived summary. Records and scores are the
//! source of truth: `evaluate` re-aggregates them rather than trusting the
//! stored summary. The schema evolves additively; the version field is
//! checked on read so a newer file fails loudly instead of decoding
//! half-empty.

use crate::aggregate;
use crate::types::{BenchmarkSummary, MetricScore, PredictionRecord};
use crate::{DocCraftError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Current results schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Everything stored for one parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserResults {
    pub records: Vec<PredictionRecord>,
    pub scores: Vec<MetricScore>,
    pub summary: BenchmarkSummary,
}

/// On-disk benchmark results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    pub schema_version: u32,
    /// Documents that were skipped for lacking ground truth.
    #[serde(default)]
    pub skipped_documents: Vec<String>,
    pub parsers: BTreeMap<String, ParserResults>,
}

impl ResultsFile {
    /// Assemble a results file from a run's records, scores, and summaries.
    pub fn build(
        records: Vec<PredictionRecord>,
        scores: Vec<MetricScore>,
        summaries: BTreeMap<String, BenchmarkSummary>,
        skipped_documents: Vec<String>,
    ) -> Self {
        let mut parsers: BTreeMap<String, ParserResults> = BTreeMap::new();
        for (key, summary) in summaries {
            parsers.insert(
                key,
                ParserResults {
                    records: vec![],
                    scores: vec![],
                    summary,
                },
            );
        }
        for record in records {
            if let Some(entry) = parsers.get_mut(&record.parser_key) {
                entry.records.push(record);
            }
        }
        for score in scores {
            if let Some(entry) = parsers.get_mut(&score.parser_key) {
                entry.scores.push(score);
            }
        }

        Self {
            schema_version: SCHEMA_VERSION,
            skipped_documents,
            parsers,
        }
    }

    /// Write the file as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), parsers = self.parsers.len(), "wrote results file");
        Ok(())
    }

    /// Read and version-check a results file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let file: Self = serde_json::from_str(&contents).map_err(|e| {
            DocCraftError::Serialization {
                message: format!("failed to parse results file '{}'", path.display()),
                source: Some(Box::new(e)),
            }
        })?;

        if file.schema_version == 0 || file.schema_version > SCHEMA_VERSION {
            return Err(DocCraftError::validation(format!(
                "results file '{}' has schema version {}, this build reads up to {}",
                path.display(),
                file.schema_version,
                SCHEMA_VERSION
            )));
        }
        Ok(file)
    }

    /// Re-derive summaries from the stored records and scores.
    pub fn reaggregate(&self) -> BTreeMap<String, BenchmarkSummary> {
        let records: Vec<PredictionRecord> = self
            .parsers
            .values()
            .flat_map(|p| p.records.iter().cloned())
            .collect();
        let scores: Vec<MetricScore> = self
            .parsers
            .values()
            .flat_map(|p| p.scores.iter().cloned())
            .collect();
        aggregate::aggregate_records(&records, &scores, self.skipped_documents.len())
    }
}
