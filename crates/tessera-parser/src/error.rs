//! Diagnostic levels and the error that aborts a parse.

use std::error::Error;

use strum_macros::{Display, EnumString, IntoStaticStr};
use tessera_dom::{DomException, SourceLocation};
use thiserror::Error;

/// A boxed error raised by a user callback.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Severity of a parse diagnostic.
///
/// Warnings and errors are reported and parsing continues; a fatal error
/// always stops the parse with a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ErrorLevel {
    /// Recoverable oddity in the input.
    #[strum(serialize = "warning")]
    Warning,
    /// Recoverable violation of well-formedness.
    #[strum(serialize = "error")]
    Error,
    /// Unrecoverable violation; parsing stops.
    #[strum(serialize = "fatalError")]
    FatalError,
}

/// The error returned when a parse is aborted.
///
/// Raised by fatal diagnostics, by an error callback that refuses to
/// continue, and by DOM operations that fail while building the tree.
#[derive(Debug, Error)]
#[error("{message}{}", locator_suffix(.locator))]
pub struct ParseError {
    /// Human readable description.
    pub message: String,
    /// Position in the source where the problem was detected, when tracked.
    pub locator: Option<SourceLocation>,
    /// The underlying cause, if any.
    #[source]
    pub source: Option<BoxError>,
}

impl ParseError {
    /// A parse error with no underlying cause.
    pub fn new(message: impl Into<String>, locator: Option<SourceLocation>) -> Self {
        Self {
            message: message.into(),
            locator,
            source: None,
        }
    }

    /// Attach a source position if the error does not carry one yet.
    #[must_use]
    pub fn with_locator(mut self, locator: Option<SourceLocation>) -> Self {
        if self.locator.is_none() {
            self.locator = locator;
        }
        self
    }

    /// Wrap an error raised by a diagnostic callback.
    pub(crate) fn from_callback(error: BoxError, locator: Option<SourceLocation>) -> Self {
        Self {
            message: error.to_string(),
            locator,
            source: Some(error),
        }
    }
}

impl From<DomException> for ParseError {
    fn from(exception: DomException) -> Self {
        Self {
            message: format!("{}: {}", exception.name, exception.message),
            locator: None,
            source: Some(Box::new(exception)),
        }
    }
}

fn locator_suffix(locator: &Option<SourceLocation>) -> String {
    locator.map_or_else(String::new, |loc| {
        format!(" @#[line:{},col:{}]", loc.line_number, loc.column_number)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_dom::DomExceptionName;

    #[test]
    fn level_names() {
        assert_eq!(ErrorLevel::Warning.to_string(), "warning");
        assert_eq!(ErrorLevel::FatalError.to_string(), "fatalError");
        assert_eq!("error".parse::<ErrorLevel>().ok(), Some(ErrorLevel::Error));
    }

    #[test]
    fn display_includes_position() {
        let err = ParseError::new(
            "end tag name missing",
            Some(SourceLocation {
                line_number: 3,
                column_number: 7,
            }),
        );
        assert_eq!(err.to_string(), "end tag name missing @#[line:3,col:7]");
    }

    #[test]
    fn dom_exception_keeps_name_and_source() {
        let exception = DomException::new(DomExceptionName::NamespaceError, "bad prefix");
        let err = ParseError::from(exception);
        assert_eq!(err.message, "NamespaceError: bad prefix");
        assert!(err.source.is_some());
    }
}
