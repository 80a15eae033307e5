//! Core pipeline composition and configuration.

pub mod config;
pub mod pipeline;

pub use config::{BenchmarkConfig, BenchmarkOptions, MetricConfig, ParserConfig};
pub use pipeline::Pipeline;
