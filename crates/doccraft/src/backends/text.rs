//! Plain text backend.

use crate::core::config::ParserConfig;
use crate::plugins::{DocumentParser, Plugin};
use crate::types::{Document, ParserResult, TextSpan};
use crate::{DocCraftError, Result};
use async_trait::async_trait;

/// Parser for documents that are already text.
///
/// Decodes the document bytes as UTF-8 (lossily) and emits one span per
/// non-empty line. It gives the benchmark a dependency-free end-to-end
/// path; OCR and vision-language backends register through the same
/// contract.
#[derive(Debug, Default)]
pub struct PlainTextParser;

impl Plugin for PlainTextParser {
    fn name(&self) -> &str {
        "plain-text"
    }

    fn description(&self) -> &str {
        "Reads document bytes as UTF-8 text, one span per line"
    }
}

#[async_trait]
impl DocumentParser for PlainTextParser {
    async fn extract(&self, document: &Document, _config: &ParserConfig) -> Result<ParserResult> {
        if document.bytes.is_empty() {
            return Err(DocCraftError::validation(format!(
                "document '{}' is empty",
                document.id
            )));
        }

        let text = String::from_utf8_lossy(&document.bytes);
        let spans = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(TextSpan::new)
            .collect();
        Ok(ParserResult::from_spans(spans))
    }
}
