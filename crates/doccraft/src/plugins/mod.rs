//! Plugin system for parser backends and pipeline stages.
//!
//! Three capabilities plug into the pipeline:
//!
//! - [`DocumentParser`]: turns a document into text spans (OCR engines, PDF
//!   text extractors, vision-language models)
//! - [`Preprocessor`]: transforms a document before parsing
//! - [`PostProcessor`]: normalizes parser output after parsing
//!
//! All of them implement the base [`Plugin`] trait for identity and
//! lifecycle. Parsers are resolved by key through a [`ParserRegistry`].

pub mod parser;
pub mod postprocessor;
pub mod preprocessor;
pub mod registry;
pub mod traits;

pub use parser::DocumentParser;
pub use postprocessor::PostProcessor;
pub use preprocessor::Preprocessor;
pub use registry::{get_parser_registry, ParserRegistry, RegistryMode, PARSER_REGISTRY};
pub use traits::Plugin;
