//! Extraction pipeline: preprocess, parse, postprocess.
//!
//! A pipeline binds a parser backend to optional pre- and post-processing
//! stages and runs them in order. Stage failures are captured inside the
//! returned [`ParserResult`] with the failing stage attributed, so batch
//! callers never see a pipeline `Err` for a bad document. Partial work is
//! preserved: a postprocessing failure keeps the spans extracted by the
//! parser.

use crate::core::config::ParserConfig;
use crate::plugins::{DocumentParser, PostProcessor, Preprocessor};
use crate::types::{Document, ExtractionFailure, FailureKind, ParserResult, PipelineStage};
use crate::DocCraftError;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Classify an error into the failure taxonomy recorded on results.
pub(crate) fn failure_kind(error: &DocCraftError) -> FailureKind {
    match error {
        DocCraftError::Configuration { .. } | DocCraftError::Validation { .. } => {
            FailureKind::Configuration
        }
        DocCraftError::BackendUnavailable { .. } => FailureKind::BackendUnavailable,
        DocCraftError::Timeout(_) => FailureKind::Timeout,
        _ => FailureKind::Extraction,
    }
}

/// A composed extraction pipeline for one parser backend.
pub struct Pipeline {
    parser: Arc<dyn DocumentParser>,
    preprocessor: Option<Arc<dyn Preprocessor>>,
    postprocessor: Option<Arc<dyn PostProcessor>>,
}

impl Pipeline {
    /// Pipeline with only a parse stage.
    pub fn new(parser: Arc<dyn DocumentParser>) -> Self {
        Self {
            parser,
            preprocessor: None,
            postprocessor: None,
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: Arc<dyn Preprocessor>) -> Self {
        self.preprocessor = Some(preprocessor);
        self
    }

    pub fn with_postprocessor(mut self, postprocessor: Arc<dyn PostProcessor>) -> Self {
        self.postprocessor = Some(postprocessor);
        self
    }

    /// Key of the parser this pipeline wraps.
    pub fn parser_name(&self) -> &str {
        self.parser.name()
    }

    /// Run the pipeline over one document.
    ///
    /// Always returns a result; failures are recorded in-band with the
    /// failing stage. Stages after a failed stage do not run, except that a
    /// postprocessing failure still returns the parser's spans.
    pub async fn run(&self, document: &Document, config: &ParserConfig) -> ParserResult {
        let started = Instant::now();
        let mut result = self.run_stages(document, config).await;
        result.elapsed = started.elapsed();
        if let Some(error) = &result.error {
            warn!(
                parser = %self.parser.name(),
                document = %document.id,
                stage = ?error.stage,
                "pipeline failed: {}",
                error.message
            );
        } else {
            debug!(
                parser = %self.parser.name(),
                document = %document.id,
                spans = result.spans.len(),
                elapsed_ms = result.elapsed.as_millis() as u64,
                "pipeline completed"
            );
        }
        result
    }

    async fn run_stages(&self, document: &Document, config: &ParserConfig) -> ParserResult {
        if let Err(e) = config.validate().and_then(|_| self.parser.validate_config(config)) {
            return ParserResult::from_failure(
                ExtractionFailure::new(failure_kind(&e), None, e.to_string()),
                vec![],
            );
        }

        let preprocessed;
        let input = match &self.preprocessor {
            Some(preprocessor) => match preprocessor.transform(document).await {
                Ok(doc) => {
                    preprocessed = doc;
                    &preprocessed
                }
                Err(e) => {
                    return ParserResult::from_failure(
                        ExtractionFailure::new(
                            failure_kind(&e),
                            Some(PipelineStage::Preprocess),
                            e.to_string(),
                        ),
                        vec![],
                    );
                }
            },
            None => document,
        };

        let mut result = match self.parser.extract(input, config).await {
            Ok(result) => result,
            Err(e) => {
                return ParserResult::from_failure(
                    ExtractionFailure::new(
                        failure_kind(&e),
                        Some(PipelineStage::Parse),
                        e.to_string(),
                    ),
                    vec![],
                );
            }
        };

        // A parser may itself record an in-band failure; later stages are
        // skipped but its partial spans survive.
        if result.error.is_some() {
            return result;
        }

        if let Some(postprocessor) = &self.postprocessor {
            if let Err(e) = postprocessor.format(&mut result).await {
                result.error = Some(ExtractionFailure::new(
                    failure_kind(&e),
                    Some(PipelineStage::Postprocess),
                    e.to_string(),
                ));
            }
        }

        result
    }
}
