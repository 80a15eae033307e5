//! DocCraft: a benchmark framework for document understanding backends.
//!
//! Heterogeneous parsers — OCR engines, PDF text extractors, vision-language
//! models — plug in behind one [`plugins::DocumentParser`] contract and are
//! scored uniformly against question-answering ground truth.
//!
//! # Architecture
//!
//! - [`plugins`] — the parser/preprocessor/postprocessor capability traits
//!   and the key-normalized [`plugins::ParserRegistry`]
//! - [`core`] — run configuration and the preprocess/parse/postprocess
//!   [`core::Pipeline`], which captures stage failures in-band
//! - [`dataset`] — ground-truth loading and document discovery
//! - [`benchmark`] — the concurrent [`benchmark::BenchmarkRunner`] and the
//!   pluggable [`benchmark::AnswerSelector`]
//! - [`metrics`] — pure scoring functions (exact match, normalized match,
//!   ANLS, mean average precision)
//! - [`aggregate`] — deterministic summaries and parser comparison
//! - [`output`] — the versioned results file
//! - [`backends`] — built-in parsers
//!
//! # Example
//!
//! ```rust,no_run
//! use doccraft::backends::PlainTextParser;
//! use doccraft::benchmark::{BenchmarkRunner, CancelFlag};
//! use doccraft::core::{BenchmarkConfig, Pipeline};
//! use doccraft::dataset::{load_documents, GroundTruthSet};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> doccraft::Result<()> {
//! let ground_truth = GroundTruthSet::load(Path::new("ground_truth.json"), false)?;
//! let documents = load_documents(Path::new("documents/"))?;
//!
//! let mut runner = BenchmarkRunner::new(BenchmarkConfig::default())?;
//! runner.add_pipeline(Pipeline::new(Arc::new(PlainTextParser)))?;
//!
//! let run = runner.run(documents, &ground_truth, &CancelFlag::new()).await?;
//! let scores = doccraft::metrics::score_run(&ground_truth, &run.records, &Default::default());
//! let summaries = doccraft::aggregate::aggregate(&run, &scores);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod aggregate;
pub mod backends;
pub mod benchmark;
pub mod core;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod output;
pub mod plugins;
pub mod types;

pub use error::{DocCraftError, Result};
pub use types::{
    BenchmarkSummary, Document, MetricScore, MetricValue, ParserResult, PredictionRecord,
};
