//! XML and HTML parser for Tessera.
//!
//! # Scope
//!
//! This crate implements:
//! - **Scanner** ([XML 1.0](https://www.w3.org/TR/xml/))
//!   - Start and end tags with lenient attribute syntax
//!   - Comments, CDATA sections, processing instructions and DOCTYPE
//!     declarations with an internal subset
//!   - Entity and character references
//!   - Namespace resolution with scoped prefix maps
//!   - HTML void and raw text elements
//!
//! - **DOM builder**: [`DomHandler`] turns scanner events into a
//!   [`tessera_dom::Document`], and [`DomParser`] wires the two together.
//!
//! Diagnostics have three levels ([`ErrorLevel`]). Warnings and errors are
//! reported and parsing continues; fatal errors stop it with a
//! [`ParseError`].
//!
//! # Not Implemented
//!
//! - DTD validation and external entity loading
//! - The HTML tree construction algorithm (implied elements, foster
//!   parenting, adoption agency)

/// Builds a document from scanner events.
pub mod dom_handler;
/// The parser entry point.
pub mod dom_parser;
/// XML and HTML entity tables.
pub mod entities;
/// Diagnostic levels and the parse error.
pub mod error;
/// XML grammar productions used while scanning.
pub mod grammar;
/// The scanner event interface.
pub mod handler;
/// Parser options and diagnostic routing.
pub mod options;
/// The markup scanner.
pub mod scanner;

pub use dom_handler::DomHandler;
pub use dom_parser::DomParser;
pub use entities::EntityMap;
pub use error::{BoxError, ErrorLevel, ParseError};
pub use handler::{AttributeToken, ContentHandler, ElementAttributes};
pub use options::{
    CombinedCallback, DiagnosticCallback, LineEndingNormalizer, OnError, ParserOptions,
    normalize_line_endings,
};
pub use scanner::{Scanner, ScannerConfig, StartTagState};
