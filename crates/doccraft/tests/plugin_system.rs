//! Registry and pipeline behavior through the public API.

use async_trait::async_trait;
use doccraft::core::{ParserConfig, Pipeline};
use doccraft::plugins::{
    DocumentParser, ParserRegistry, Plugin, Preprocessor, RegistryMode,
};
use doccraft::types::{Document, ParserResult, PipelineStage, TextSpan};
use doccraft::{DocCraftError, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

struct CountingParser {
    name: &'static str,
    calls: Arc<AtomicUsize>,
}

impl CountingParser {
    fn new(name: &'static str) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Arc::new(Self {
                name,
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }
}

impl Plugin for CountingParser {
    fn name(&self) -> &str {
        self.name
    }
}

#[async_trait]
impl DocumentParser for CountingParser {
    async fn extract(&self, document: &Document, _: &ParserConfig) -> Result<ParserResult> {
        self.calls.fetch_add(1, Ordering::AcqRel);
        let text = String::from_utf8_lossy(&document.bytes).into_owned();
        Ok(ParserResult::from_spans(vec![TextSpan::new(text)]))
    }
}

struct BrokenPreprocessor;

impl Plugin for BrokenPreprocessor {
    fn name(&self) -> &str {
        "broken-pre"
    }
}

#[async_trait]
impl Preprocessor for BrokenPreprocessor {
    async fn transform(&self, _: &Document) -> Result<Document> {
        Err(DocCraftError::extraction("deskew blew up"))
    }
}

struct ShutdownTracker {
    flag: Arc<AtomicBool>,
}

impl Plugin for ShutdownTracker {
    fn name(&self) -> &str {
        "tracked"
    }

    fn shutdown(&self) -> Result<()> {
        self.flag.store(true, Ordering::Release);
        Ok(())
    }
}

#[async_trait]
impl DocumentParser for ShutdownTracker {
    async fn extract(&self, _: &Document, _: &ParserConfig) -> Result<ParserResult> {
        Ok(ParserResult::from_spans(vec![]))
    }
}

#[tokio::test]
async fn registry_round_trip_through_pipeline() {
    let mut registry = ParserRegistry::new();
    let (parser, calls) = CountingParser::new("counting");
    registry.register(parser).unwrap();

    let resolved = registry.get("Counting").unwrap();
    let pipeline = Pipeline::new(resolved);
    let document = Document::new("d1", "d1.txt", b"hello".to_vec());
    let result = pipeline.run(&document, &ParserConfig::default()).await;

    assert_eq!(result.text(), "hello");
    assert_eq!(calls.load(Ordering::Acquire), 1);
}

#[test]
fn strict_registry_preserves_first_registration() {
    let mut registry = ParserRegistry::new();
    let (first, _) = CountingParser::new("dup");
    let (second, _) = CountingParser::new("dup");

    registry.register(first).unwrap();
    assert!(matches!(
        registry.register(second),
        Err(DocCraftError::DuplicateParser(_))
    ));
    assert_eq!(registry.list(), vec!["dup"]);
}

#[test]
fn lenient_registry_shuts_down_displaced_parser() {
    let mut registry = ParserRegistry::with_mode(RegistryMode::Lenient);
    let displaced = Arc::new(AtomicBool::new(false));
    registry
        .register(Arc::new(ShutdownTracker {
            flag: Arc::clone(&displaced),
        }))
        .unwrap();

    registry
        .register(Arc::new(ShutdownTracker {
            flag: Arc::new(AtomicBool::new(false)),
        }))
        .unwrap();

    assert!(displaced.load(Ordering::Acquire));
    assert_eq!(registry.list(), vec!["tracked"]);
}

#[tokio::test]
async fn failed_preprocess_short_circuits_parse() {
    let (parser, calls) = CountingParser::new("counting");
    let pipeline = Pipeline::new(parser).with_preprocessor(Arc::new(BrokenPreprocessor));

    let document = Document::new("d1", "d1.txt", b"hello".to_vec());
    let result = pipeline.run(&document, &ParserConfig::default()).await;

    let error = result.error.expect("preprocess failure must be recorded");
    assert_eq!(error.stage, Some(PipelineStage::Preprocess));
    assert_eq!(calls.load(Ordering::Acquire), 0, "parse stage must not run");
}
