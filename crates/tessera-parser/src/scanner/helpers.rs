//! Helper functions for the scanner.
//!
//! - Source positions (line index and locator updates)
//! - Diagnostics routed to the handler
//! - Text emission

use std::rc::Rc;

use tessera_dom::{NamespaceMap, SourceLocation};

use super::core::{Interrupt, Scanner};
use crate::error::ParseError;
use crate::handler::ContentHandler;

// =============================================================================
// Source Positions
// =============================================================================

/// Byte offsets where each line of the source starts.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    /// Index the line starts of `source`. `\r\n`, `\r` and `\n` each end a
    /// line.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut starts = vec![0];
        for (i, &b) in bytes.iter().enumerate() {
            match b {
                b'\n' => starts.push(i + 1),
                b'\r' if bytes.get(i + 1) != Some(&b'\n') => starts.push(i + 1),
                _ => {}
            }
        }
        Self { starts }
    }

    /// 1-based line and column of the byte `offset`. Columns count
    /// characters.
    #[must_use]
    pub fn location(&self, source: &str, offset: usize) -> SourceLocation {
        let line = self.starts.partition_point(|&start| start <= offset).max(1);
        let line_start = self.starts[line - 1];
        let column = source
            .get(line_start..offset)
            .map_or(0, |prefix| prefix.chars().count());
        SourceLocation {
            line_number: line,
            column_number: column + 1,
        }
    }
}

impl<H: ContentHandler + ?Sized> Scanner<'_, H> {
    /// Tell the handler the next event starts at `offset`.
    pub(super) fn locate(&mut self, offset: usize) {
        if self.track_locations {
            let location = self.line_index.location(self.source, offset);
            self.handler.set_document_locator(location);
        }
    }

    pub(super) fn location(&self, offset: usize) -> Option<SourceLocation> {
        self.track_locations
            .then(|| self.line_index.location(self.source, offset))
    }
}

// =============================================================================
// Diagnostics
// =============================================================================

impl<H: ContentHandler + ?Sized> Scanner<'_, H> {
    pub(super) fn warning(&mut self, message: &str) -> Result<(), ParseError> {
        self.handler.warning(message)
    }

    pub(super) fn error(&mut self, message: &str) -> Result<(), ParseError> {
        self.handler.error(message)
    }

    /// Report a fatal error. The returned interrupt stops the scan even if
    /// the handler accepted the diagnostic.
    pub(super) fn fatal(&mut self, message: impl Into<String>) -> Interrupt {
        let message = message.into();
        let error = match self.handler.fatal_error(&message) {
            Err(error) => error,
            Ok(()) => ParseError::new(message, None),
        };
        Interrupt::Abort(error)
    }
}

pub(super) fn syntax(message: impl Into<String>) -> Interrupt {
    Interrupt::Syntax(message.into())
}

// =============================================================================
// Text and Scope Helpers
// =============================================================================

impl<H: ContentHandler + ?Sized> Scanner<'_, H> {
    /// Report `source[start..end]` as character data and move past it.
    pub(super) fn append_text(&mut self, end: usize) -> Result<(), ParseError> {
        if end > self.start {
            let source = self.source;
            let text = self.decode_references(&source[self.start..end])?;
            self.locate(self.start);
            self.handler.characters(&text)?;
            self.start = end;
        }
        Ok(())
    }

    /// Namespace bindings in scope for the next start tag.
    pub(super) fn current_namespaces(&self) -> Rc<NamespaceMap> {
        self.stack.last().map_or_else(
            || Rc::clone(&self.base_namespaces),
            |frame| Rc::clone(&frame.namespaces),
        )
    }

    /// ASCII-lowercased source. Byte offsets match the original.
    pub(super) fn lowered(&mut self) -> &str {
        let source = self.source;
        self.lowered
            .get_or_insert_with(|| source.to_ascii_lowercase())
    }
}
