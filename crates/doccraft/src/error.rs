//! Error types for DocCraft.
//!
//! All fallible operations in the library return [`Result`]. The error
//! taxonomy mirrors the benchmark lifecycle:
//!
//! - Setup-time errors (`Configuration`, `Validation` in strict mode, bad
//!   paths, registry lookups) are fatal and surface to the caller before any
//!   work starts.
//! - Per-unit errors (`Extraction`, `Timeout`, `BackendUnavailable`) never
//!   cross the pipeline boundary: the pipeline captures them inside the
//!   [`crate::types::ParserResult`] so a batch run survives individual
//!   failures.
//! - `Io` wraps `std::io::Error` and always bubbles up unchanged; these are
//!   real system problems the user needs to see.
use thiserror::Error;

/// Result type alias using [`DocCraftError`].
pub type Result<T> = std::result::Result<T, DocCraftError>;

/// Main error type for all DocCraft operations.
#[derive(Debug, Error)]
pub enum DocCraftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad or unknown options. Fails fast before any work starts.
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A backend's dependency or model is missing. Recorded per parser; the
    /// run skips that parser and continues with the others.
    #[error("Backend '{backend}' unavailable: {message}")]
    BackendUnavailable { backend: String, message: String },

    /// Per-document extraction failure. Recorded in the parser result, never
    /// aborts the run.
    #[error("Extraction error: {message}")]
    Extraction {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A unit of work exceeded its configured timeout.
    #[error("Timed out after {0:.1}s")]
    Timeout(f64),

    /// Malformed ground truth or document mapping. Skipped or fatal
    /// depending on strict mode.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Registry lookup for an explicitly requested parser failed.
    #[error("Parser '{requested}' not found; available parsers: [{}]", available.join(", "))]
    ParserNotFound {
        requested: String,
        available: Vec<String>,
    },

    /// Duplicate key registration in a strict-mode registry.
    #[error("Parser '{0}' is already registered")]
    DuplicateParser(String),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("{0}")]
    Other(String),
}

impl DocCraftError {
    /// Create a `Configuration` error.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a `Configuration` error with source.
    pub fn configuration_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an `Extraction` error.
    pub fn extraction<S: Into<String>>(message: S) -> Self {
        Self::Extraction {
            message: message.into(),
            source: None,
        }
    }

    /// Create an `Extraction` error with source.
    pub fn extraction_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Extraction {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a `Validation` error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Create a `Validation` error with source.
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a `Serialization` error.
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        Self::Serialization {
            message: message.into(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for DocCraftError {
    fn from(err: serde_json::Error) -> Self {
        DocCraftError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}
