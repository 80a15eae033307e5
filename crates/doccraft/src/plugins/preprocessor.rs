//! Preprocessor capability trait.

use crate::plugins::Plugin;
use crate::types::Document;
use crate::Result;
use async_trait::async_trait;

/// Trait for document preprocessors (deskew, binarize, resample, ...).
///
/// A preprocessor maps a document to a transformed document before parsing.
/// Pipelines treat a missing preprocessor as the identity stage, so
/// implementations only exist where a real transformation happens.
#[async_trait]
pub trait Preprocessor: Plugin {
    /// Produce a transformed copy of the document.
    async fn transform(&self, document: &Document) -> Result<Document>;
}
