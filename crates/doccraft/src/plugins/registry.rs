//! Parser registration and discovery.
//!
//! The registry maps canonical keys to parser backends so pipelines and the
//! benchmark runner can resolve backends by name. Keys are canonicalized
//! (trimmed, lowercased) at registration and lookup, so `"Tesseract-OCR"`
//! and `"tesseract-ocr "` resolve to the same backend.

use crate::plugins::DocumentParser;
use crate::{DocCraftError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Validate a parser name before registration.
///
/// Names cannot be empty and cannot contain whitespace; by convention they
/// are lowercase kebab-case (`"tesseract-ocr"`, `"plain-text"`).
fn validate_parser_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DocCraftError::Validation {
            message: "Parser name cannot be empty".to_string(),
            source: None,
        });
    }

    if name.contains(char::is_whitespace) {
        return Err(DocCraftError::Validation {
            message: format!("Parser name '{}' cannot contain whitespace", name),
            source: None,
        });
    }

    Ok(())
}

/// Canonical form of a registry key: trimmed and lowercased.
pub fn canonical_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// What to do when a registration collides with an existing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryMode {
    /// Duplicate keys are an error.
    #[default]
    Strict,
    /// A duplicate key replaces the existing parser, shutting the displaced
    /// one down.
    Lenient,
}

/// Registry for document parser backends.
///
/// # Thread safety
///
/// A registry instance is `&mut`-based; concurrent access goes through the
/// global singleton's `RwLock` (see [`get_parser_registry`]). Tests build
/// private instances with [`ParserRegistry::new`].
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn DocumentParser>>,
    mode: RegistryMode,
}

impl ParserRegistry {
    /// Create an empty registry in [`RegistryMode::Strict`].
    pub fn new() -> Self {
        Self::with_mode(RegistryMode::Strict)
    }

    /// Create an empty registry with an explicit collision mode.
    pub fn with_mode(mode: RegistryMode) -> Self {
        Self {
            parsers: HashMap::new(),
            mode,
        }
    }

    /// Register a parser under the canonical form of its name.
    ///
    /// The parser's `initialize` hook runs before it becomes visible;
    /// registration fails if initialization fails. In strict mode a key
    /// collision is a [`DocCraftError::DuplicateParser`] error; in lenient
    /// mode the displaced parser is shut down and replaced.
    pub fn register(&mut self, parser: Arc<dyn DocumentParser>) -> Result<()> {
        let name = parser.name().to_string();
        validate_parser_name(&name)?;
        let key = canonical_key(&name);

        if self.parsers.contains_key(&key) {
            match self.mode {
                RegistryMode::Strict => return Err(DocCraftError::DuplicateParser(key)),
                RegistryMode::Lenient => {
                    debug!(parser = %key, "replacing registered parser");
                }
            }
        }

        parser.initialize()?;

        if let Some(displaced) = self.parsers.insert(key, parser) {
            displaced.shutdown()?;
        }

        Ok(())
    }

    /// Look up a parser by name (canonicalized).
    ///
    /// The error for an unknown key lists every registered key, sorted, so
    /// callers can surface actionable messages.
    pub fn get(&self, name: &str) -> Result<Arc<dyn DocumentParser>> {
        let key = canonical_key(name);
        self.parsers
            .get(&key)
            .cloned()
            .ok_or_else(|| DocCraftError::ParserNotFound {
                requested: key,
                available: self.list(),
            })
    }

    /// Whether a parser is registered under this name.
    pub fn contains(&self, name: &str) -> bool {
        self.parsers.contains_key(&canonical_key(name))
    }

    /// All registered keys, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.parsers.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of registered parsers.
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Remove a parser, calling its `shutdown` hook. Removing an unknown
    /// key is a no-op.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        if let Some(parser) = self.parsers.remove(&canonical_key(name)) {
            parser.shutdown()?;
        }
        Ok(())
    }

    /// Shut down every parser and clear the registry.
    pub fn shutdown_all(&mut self) -> Result<()> {
        for key in self.list() {
            self.remove(&key)?;
        }
        Ok(())
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global parser registry singleton.
pub static PARSER_REGISTRY: Lazy<Arc<RwLock<ParserRegistry>>> =
    Lazy::new(|| Arc::new(RwLock::new(ParserRegistry::new())));

/// Get the global parser registry.
pub fn get_parser_registry() -> Arc<RwLock<ParserRegistry>> {
    PARSER_REGISTRY.clone()
}
