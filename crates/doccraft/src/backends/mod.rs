//! Built-in parser backends.

pub mod text;

pub use text::PlainTextParser;
