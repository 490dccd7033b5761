//! Markup scanner.
//!
//! A forgiving single-pass scanner for [XML 1.0](https://www.w3.org/TR/xml/)
//! and tag-soup HTML. It finds `<` delimiters with substring search, runs a
//! small state machine over start tags, resolves namespaces from a stack of
//! open elements and reports everything to a
//! [`ContentHandler`](crate::ContentHandler).
//!
//! Problems inside a single tag are recovered from by emitting the `<` as
//! text and continuing after it; fatal problems and handler errors stop the
//! scan.

/// Entity and character reference decoding.
pub mod character_reference;
/// Scanner state, main loop, end tags and end of input.
pub mod core;
/// Locator, diagnostics and text emission helpers.
pub mod helpers;
/// `<!...>` and `<?...?>` constructs.
pub mod markup_declaration;
/// The start tag state machine and namespace resolution.
pub mod start_tag;

pub use self::core::{Scanner, ScannerConfig};
pub use start_tag::StartTagState;
