//! Postprocessor capability trait.

use crate::plugins::Plugin;
use crate::types::ParserResult;
use crate::Result;
use async_trait::async_trait;

/// Trait for parser-output postprocessors (whitespace normalization, table
/// flattening, span merging, ...).
///
/// Postprocessors mutate the parser result in place. Pipelines treat a
/// missing postprocessor as the identity stage, and a postprocessor failure
/// never discards the raw extraction text already produced.
#[async_trait]
pub trait PostProcessor: Plugin {
    /// Normalize or enrich the parser result in place.
    async fn format(&self, result: &mut ParserResult) -> Result<()>;
}
