//! Ground-truth and document loading.
//!
//! Ground truth is a JSON map of document id to a list of question entries.
//! Entries are validated individually: a malformed entry is skipped with a
//! warning (and counted) rather than failing the whole file, unless strict
//! mode is on. Documents are discovered by directory scan and matched to
//! ground truth by filename stem.

use crate::types::{Document, GroundTruthEntry};
use crate::{DocCraftError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// File extensions the benchmark will pick up when scanning a document
/// directory.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif", "webp", "pdf", "txt",
];

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    question_id: Option<String>,
    question: String,
    answers: Vec<String>,
    #[serde(default)]
    evidence_page: Option<u32>,
}

/// Ground-truth entries grouped by document id.
#[derive(Debug, Clone, Default)]
pub struct GroundTruthSet {
    by_document: BTreeMap<String, Vec<GroundTruthEntry>>,
    /// Entries dropped during load because they failed validation.
    pub malformed: usize,
}

impl GroundTruthSet {
    /// Load ground truth from a JSON file.
    pub fn load(path: &Path, strict: bool) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents, strict).map_err(|e| match e {
            DocCraftError::Validation { message, source } => DocCraftError::Validation {
                message: format!("{}: {message}", path.display()),
                source,
            },
            other => other,
        })
    }

    /// Parse ground truth from a JSON string.
    ///
    /// A malformed entry (undecodable, blank question, or no non-blank
    /// answers) is skipped and counted; with `strict` it is fatal instead.
    pub fn from_json_str(json: &str, strict: bool) -> Result<Self> {
        let raw: BTreeMap<String, Vec<serde_json::Value>> =
            serde_json::from_str(json).map_err(|e| {
                DocCraftError::validation_with_source("ground truth is not a map of document id to question list", e)
            })?;

        let mut set = Self::default();

        for (document_id, values) in raw {
            let mut entries = Vec::with_capacity(values.len());
            for (index, value) in values.into_iter().enumerate() {
                match Self::decode_entry(&document_id, index, value) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => {
                        if strict {
                            return Err(e);
                        }
                        warn!(document = %document_id, entry = index, "skipping malformed ground-truth entry: {e}");
                        set.malformed += 1;
                    }
                }
            }
            if !entries.is_empty() {
                set.by_document.insert(document_id, entries);
            }
        }

        debug!(
            documents = set.by_document.len(),
            questions = set.question_count(),
            malformed = set.malformed,
            "loaded ground truth"
        );
        Ok(set)
    }

    fn decode_entry(
        document_id: &str,
        index: usize,
        value: serde_json::Value,
    ) -> Result<GroundTruthEntry> {
        let raw: RawEntry = serde_json::from_value(value).map_err(|e| {
            DocCraftError::validation_with_source(
                format!("document '{document_id}' entry {index} is malformed"),
                e,
            )
        })?;

        if raw.question.trim().is_empty() {
            return Err(DocCraftError::validation(format!(
                "document '{document_id}' entry {index} has an empty question"
            )));
        }

        let answers: Vec<String> = raw
            .answers
            .into_iter()
            .filter(|a| !a.trim().is_empty())
            .collect();
        if answers.is_empty() {
            return Err(DocCraftError::validation(format!(
                "document '{document_id}' entry {index} has no non-empty answers"
            )));
        }

        Ok(GroundTruthEntry {
            document_id: document_id.to_string(),
            question_id: raw
                .question_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("q{}", index + 1)),
            question: raw.question,
            answers,
            evidence_page: raw.evidence_page,
        })
    }

    /// Questions annotated for a document, if any.
    pub fn questions_for(&self, document_id: &str) -> Option<&[GroundTruthEntry]> {
        self.by_document.get(document_id).map(Vec::as_slice)
    }

    /// Document ids with at least one question, sorted.
    pub fn document_ids(&self) -> Vec<&str> {
        self.by_document.keys().map(String::as_str).collect()
    }

    /// Total question count across documents.
    pub fn question_count(&self) -> usize {
        self.by_document.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_document.is_empty()
    }
}

/// Scan a directory for benchmarkable documents.
///
/// Files with a supported extension are loaded into memory; everything else
/// is ignored. The document id is the filename stem. Results are sorted by
/// id so runs are deterministic.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>> {
    if !dir.is_dir() {
        return Err(DocCraftError::validation(format!(
            "document path '{}' is not a directory",
            dir.display()
        )));
    }

    let mut documents = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        let supported = extension
            .as_deref()
            .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e));
        if !supported {
            debug!(path = %path.display(), "ignoring file with unsupported extension");
            continue;
        }

        let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        let bytes = std::fs::read(&path)?;
        documents.push(Document::new(id, path, bytes));
    }

    documents.sort_by(|a, b| a.id.cmp(&b.id));
    debug!(count = documents.len(), dir = %dir.display(), "discovered documents");
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const VALID: &str = r#"{
        "invoice-001": [
            {"question_id": "q7", "question": "What is the invoice number?", "answers": ["12345"]},
            {"question": "What is the total?", "answers": ["$99.00", "99.00"], "evidence_page": 1}
        ],
        "report-002": [
            {"question": "Who is the author?", "answers": ["Jane Doe"]}
        ]
    }"#;

    #[test]
    fn test_loads_and_groups_by_document() {
        let set = GroundTruthSet::from_json_str(VALID, false).unwrap();
        assert_eq!(set.document_ids(), vec!["invoice-001", "report-002"]);
        assert_eq!(set.question_count(), 3);
        assert_eq!(set.malformed, 0);

        let questions = set.questions_for("invoice-001").unwrap();
        assert_eq!(questions[0].question_id, "q7");
        // Missing question ids get positional fallbacks.
        assert_eq!(questions[1].question_id, "q2");
        assert_eq!(questions[1].evidence_page, Some(1));
    }

    #[test]
    fn test_malformed_entry_skipped_and_counted() {
        let json = r#"{
            "doc": [
                {"question": "ok?", "answers": ["yes"]},
                {"question": "", "answers": ["blank question"]},
                {"question": "no answers?", "answers": []},
                {"answers": ["missing question field"]}
            ]
        }"#;
        let set = GroundTruthSet::from_json_str(json, false).unwrap();
        assert_eq!(set.question_count(), 1);
        assert_eq!(set.malformed, 3);
    }

    #[test]
    fn test_malformed_entry_fatal_in_strict_mode() {
        let json = r#"{"doc": [{"question": "", "answers": ["x"]}]}"#;
        let err = GroundTruthSet::from_json_str(json, true).unwrap_err();
        assert!(matches!(err, DocCraftError::Validation { .. }));
    }

    #[test]
    fn test_blank_answers_filtered() {
        let json = r#"{"doc": [{"question": "q?", "answers": ["  ", "real"]}]}"#;
        let set = GroundTruthSet::from_json_str(json, false).unwrap();
        assert_eq!(set.questions_for("doc").unwrap()[0].answers, vec!["real"]);
    }

    #[test]
    fn test_non_map_root_is_fatal() {
        let err = GroundTruthSet::from_json_str("[1, 2, 3]", false).unwrap_err();
        assert!(matches!(err, DocCraftError::Validation { .. }));
    }

    #[test]
    fn test_load_documents_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.png", "notes.md", "c.PDF"] {
            let mut file = std::fs::File::create(dir.path().join(name)).unwrap();
            file.write_all(b"content").unwrap();
        }

        let documents = load_documents(dir.path()).unwrap();
        let ids: Vec<_> = documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(documents[0].bytes, b"content");
    }

    #[test]
    fn test_load_documents_rejects_non_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(load_documents(file.path()).is_err());
    }
}
