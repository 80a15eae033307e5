//! Base plugin trait definition.
//!
//! Every pipeline capability (parser, preprocessor, postprocessor)
//! implements [`Plugin`], which provides identification and lifecycle
//! management. Backend-specific resources (model weights, subprocess
//! handles) are acquired in `initialize` — or lazily on first use behind
//! interior mutability — and released deterministically in `shutdown`,
//! which the registry invokes when a plugin is removed or overridden.

use crate::Result;

/// Base trait that all plugins must implement.
///
/// Plugins are stored as `Arc<dyn Trait>` and called concurrently, so they
/// must be `Send + Sync`; lifecycle methods take `&self` and use interior
/// mutability for any mutable state.
pub trait Plugin: Send + Sync {
    /// Unique identifier, lowercase kebab-case (e.g. `"tesseract-ocr"`).
    fn name(&self) -> &str;

    /// Semantic version string.
    fn version(&self) -> String {
        "1.0.0".to_string()
    }

    /// Acquire resources. Called once at registration; registration fails
    /// if this errors.
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Release resources. Called when the plugin is unregistered, replaced,
    /// or the owning registry shuts down.
    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    /// Optional human-readable description for logs.
    fn description(&self) -> &str {
        ""
    }
}
