//! Benchmark runner: drives pipelines over a document set.
//!
//! The unit of work is a (document, parser) pair: one pipeline invocation
//! per unit, then one [`PredictionRecord`] per ground-truth question of that
//! document. Units run on a bounded worker pool; a unit failure is recorded
//! on its records and never aborts the batch unless strict mode is on.

use crate::benchmark::answer::{AnswerSelector, KeywordAnswerSelector};
use crate::core::config::BenchmarkConfig;
use crate::core::pipeline::Pipeline;
use crate::dataset::GroundTruthSet;
use crate::plugins::registry::canonical_key;
use crate::types::{
    Document, ExtractionFailure, FailureKind, ParserResult, PredictionRecord,
};
use crate::{DocCraftError, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Shared cancellation flag.
///
/// Cancelling stops dispatch of not-yet-started units; in-flight units
/// finish (or time out) and their records are kept.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Everything a benchmark run produced.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkRun {
    /// One record per (document, question, parser) triple that ran.
    pub records: Vec<PredictionRecord>,
    /// Documents excluded because no ground truth matched them. Skipped is
    /// not failed; these never count against a parser.
    pub skipped_documents: Vec<String>,
}

/// Runs registered pipelines over a document set against ground truth.
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
    pipelines: BTreeMap<String, Arc<Pipeline>>,
    selector: Arc<dyn AnswerSelector>,
}

impl BenchmarkRunner {
    /// Create a runner with the default keyword answer selector.
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pipelines: BTreeMap::new(),
            selector: Arc::new(KeywordAnswerSelector),
        })
    }

    /// Swap in a different answer selection strategy.
    pub fn with_selector(mut self, selector: Arc<dyn AnswerSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Add a pipeline, keyed by the canonical form of its parser's name.
    pub fn add_pipeline(&mut self, pipeline: Pipeline) -> Result<()> {
        let key = canonical_key(pipeline.parser_name());
        if self.pipelines.contains_key(&key) {
            return Err(DocCraftError::DuplicateParser(key));
        }
        self.pipelines.insert(key, Arc::new(pipeline));
        Ok(())
    }

    /// Registered pipeline keys, sorted.
    pub fn parser_keys(&self) -> Vec<String> {
        self.pipelines.keys().cloned().collect()
    }

    /// Run every pipeline over every document with ground truth.
    ///
    /// Setup problems (no pipelines, no documents matching ground truth)
    /// are fatal. Per-unit problems are recorded in-band, unless
    /// `strict` is set, in which case the first failed unit aborts the run.
    pub async fn run(
        &self,
        documents: Vec<Document>,
        ground_truth: &GroundTruthSet,
        cancel: &CancelFlag,
    ) -> Result<BenchmarkRun> {
        if self.pipelines.is_empty() {
            return Err(DocCraftError::configuration(
                "no parsers registered for this run",
            ));
        }

        let mut skipped_documents = Vec::new();
        let mut selected: Vec<Arc<Document>> = Vec::new();
        for document in documents {
            if ground_truth.questions_for(&document.id).is_some() {
                selected.push(Arc::new(document));
            } else {
                debug!(document = %document.id, "no ground truth, skipping");
                skipped_documents.push(document.id);
            }
        }
        if let Some(cap) = self.config.benchmark.max_documents {
            selected.truncate(cap);
        }
        if selected.is_empty() {
            return Err(DocCraftError::validation(
                "no documents match the ground-truth set",
            ));
        }

        let total_units = selected.len() * self.pipelines.len();
        let processed = Arc::new(AtomicUsize::new(0));
        let semaphore = Arc::new(Semaphore::new(self.config.benchmark.max_concurrent));
        let timeout = self.config.benchmark.item_timeout();
        info!(
            documents = selected.len(),
            parsers = self.pipelines.len(),
            units = total_units,
            concurrency = self.config.benchmark.max_concurrent,
            "starting benchmark run"
        );

        let mut join_set: JoinSet<Option<(Arc<Document>, String, ParserResult)>> = JoinSet::new();
        'dispatch: for document in &selected {
            for (key, pipeline) in &self.pipelines {
                if cancel.is_cancelled() {
                    warn!("cancellation requested, stopping dispatch");
                    break 'dispatch;
                }

                let document = Arc::clone(document);
                let key = key.clone();
                let pipeline = Arc::clone(pipeline);
                let parser_config = self.config.parser_config(&key);
                let semaphore = Arc::clone(&semaphore);
                let cancel = cancel.clone();
                let processed = Arc::clone(&processed);

                join_set.spawn(async move {
                    // Semaphore closes only on drop, so acquire cannot fail
                    // while the task is running.
                    let _permit = semaphore.acquire_owned().await.ok()?;
                    if cancel.is_cancelled() {
                        return None;
                    }

                    let result =
                        match tokio::time::timeout(timeout, pipeline.run(&document, &parser_config))
                            .await
                        {
                            Ok(result) => result,
                            Err(_) => {
                                let secs = timeout.as_secs_f64();
                                let mut result = ParserResult::from_failure(
                                    ExtractionFailure::new(
                                        FailureKind::Timeout,
                                        None,
                                        format!("unit exceeded its {secs:.1}s budget"),
                                    ),
                                    vec![],
                                );
                                result.elapsed = timeout;
                                result
                            }
                        };

                    let done = processed.fetch_add(1, Ordering::AcqRel) + 1;
                    debug!(unit = done, total = total_units, parser = %key, document = %document.id, "unit finished");
                    Some((document, key, result))
                });
            }
        }

        let mut records = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            let unit = match joined {
                Ok(Some(unit)) => unit,
                Ok(None) => continue,
                Err(e) => return Err(DocCraftError::Other(format!("worker task failed: {e}"))),
            };
            let (document, key, result) = unit;

            if self.config.benchmark.strict {
                if let Some(error) = &result.error {
                    return Err(DocCraftError::extraction(format!(
                        "strict mode: parser '{key}' failed on document '{}': {}",
                        document.id, error.message
                    )));
                }
            }

            self.record_unit(ground_truth, &document, &key, &result, &mut records);
        }

        records.sort_by(|a, b| {
            (&a.document_id, &a.question_id, &a.parser_key)
                .cmp(&(&b.document_id, &b.question_id, &b.parser_key))
        });
        info!(
            records = records.len(),
            skipped = skipped_documents.len(),
            "benchmark run complete"
        );
        Ok(BenchmarkRun {
            records,
            skipped_documents,
        })
    }

    fn record_unit(
        &self,
        ground_truth: &GroundTruthSet,
        document: &Document,
        parser_key: &str,
        result: &ParserResult,
        records: &mut Vec<PredictionRecord>,
    ) {
        let Some(questions) = ground_truth.questions_for(&document.id) else {
            return;
        };
        let cap = self
            .config
            .benchmark
            .max_questions
            .unwrap_or(questions.len());

        for entry in questions.iter().take(cap) {
            let record = if result.is_success() {
                let selection = self.selector.select(&entry.question, result);
                PredictionRecord {
                    document_id: document.id.clone(),
                    question_id: entry.question_id.clone(),
                    parser_key: parser_key.to_string(),
                    answers: selection.answers,
                    evidence: selection.evidence,
                    elapsed: result.elapsed,
                    error: None,
                }
            } else {
                PredictionRecord {
                    document_id: document.id.clone(),
                    question_id: entry.question_id.clone(),
                    parser_key: parser_key.to_string(),
                    answers: vec![],
                    evidence: vec![],
                    elapsed: result.elapsed,
                    error: result.error.clone(),
                }
            };
            records.push(record);
        }
    }
}
