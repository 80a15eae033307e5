//! Document parser capability trait.
//!
//! A parser is any backend — traditional OCR engine, PDF text extractor, or
//! vision-language model — that can turn a document into text spans. All
//! backends expose the same contract so pipelines and the benchmark runner
//! can treat them interchangeably.

use crate::core::config::ParserConfig;
use crate::plugins::Plugin;
use crate::types::{Document, ParserResult};
use crate::{DocCraftError, Result};
use async_trait::async_trait;

/// Trait for document parser backends.
///
/// # Contract
///
/// - `extract` is handed a readable, non-empty document; it may fail with
///   `Extraction` or `BackendUnavailable`, which the pipeline captures
///   inside the [`ParserResult`] rather than letting batch runs abort.
/// - Unrecognized backend options must be rejected, not silently ignored:
///   [`DocumentParser::validate_config`] checks the configuration's option
///   map against [`DocumentParser::supported_options`] and runs before any
///   work starts.
///
/// # Thread safety
///
/// Parsers are shared as `Arc<dyn DocumentParser>` across worker tasks and
/// must be `Send + Sync`. A backend holding an exclusive hardware resource
/// (a single GPU, a subprocess) serializes access internally and bounds its
/// pending queue rather than queueing unboundedly.
#[async_trait]
pub trait DocumentParser: Plugin {
    /// Extract text from a document.
    async fn extract(&self, document: &Document, config: &ParserConfig) -> Result<ParserResult>;

    /// Backend-specific option keys this parser understands.
    fn supported_options(&self) -> &[&str] {
        &[]
    }

    /// Validate a configuration against this parser.
    ///
    /// The default implementation rejects any option key not listed in
    /// [`DocumentParser::supported_options`].
    fn validate_config(&self, config: &ParserConfig) -> Result<()> {
        let supported = self.supported_options();
        for key in config.options.keys() {
            if !supported.contains(&key.as_str()) {
                return Err(DocCraftError::configuration(format!(
                    "parser '{}' does not recognize option '{}' (supported: [{}])",
                    self.name(),
                    key,
                    supported.join(", "),
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for dyn DocumentParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentParser")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TextSpan;

    struct EchoParser;

    impl Plugin for EchoParser {
        fn name(&self) -> &str {
            "echo"
        }
    }

    #[async_trait]
    impl DocumentParser for EchoParser {
        async fn extract(&self, document: &Document, _config: &ParserConfig) -> Result<ParserResult> {
            let text = String::from_utf8_lossy(&document.bytes).into_owned();
            Ok(ParserResult::from_spans(vec![TextSpan::new(text)]))
        }

        fn supported_options(&self) -> &[&str] {
            &["trim"]
        }
    }

    #[tokio::test]
    async fn test_extract_returns_spans() {
        let doc = Document::new("d1", "d1.txt", b"hello".to_vec());
        let result = EchoParser.extract(&doc, &ParserConfig::default()).await.unwrap();
        assert_eq!(result.text(), "hello");
    }

    #[test]
    fn test_validate_config_accepts_supported_option() {
        let mut config = ParserConfig::default();
        config
            .options
            .insert("trim".to_string(), serde_json::json!(true));
        assert!(EchoParser.validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_config_rejects_unknown_option() {
        let mut config = ParserConfig::default();
        config
            .options
            .insert("dpi".to_string(), serde_json::json!(300));
        let err = EchoParser.validate_config(&config).unwrap_err();
        assert!(matches!(err, DocCraftError::Configuration { .. }));
        assert!(err.to_string().contains("dpi"));
    }
}
