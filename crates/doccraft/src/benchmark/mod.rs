//! Benchmark execution: answer selection and the concurrent runner.

pub mod answer;
pub mod runner;

pub use answer::{AnswerSelector, KeywordAnswerSelector, Selection};
pub use runner::{BenchmarkRun, BenchmarkRunner, CancelFlag};
