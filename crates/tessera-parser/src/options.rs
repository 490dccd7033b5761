//! Parser configuration and diagnostic routing.

use tessera_dom::{NamespaceMap, SourceLocation};
use tracing::{error, warn};

use crate::error::{BoxError, ErrorLevel, ParseError};

/// Callback receiving the diagnostics of one level.
///
/// Returning an error aborts the parse with that error as the cause.
pub type DiagnosticCallback =
    Box<dyn FnMut(&str, Option<SourceLocation>) -> Result<(), BoxError> + 'static>;

/// Callback receiving diagnostics of every level.
pub type CombinedCallback =
    Box<dyn FnMut(ErrorLevel, &str, Option<SourceLocation>) -> Result<(), BoxError> + 'static>;

/// Replaces line endings in the source before scanning.
pub type LineEndingNormalizer = Box<dyn Fn(&str) -> String + 'static>;

/// Where parse diagnostics go.
#[derive(Default)]
pub enum OnError {
    /// Log warnings and errors through `tracing`.
    #[default]
    Default,
    /// One callback per level; a missing one falls back to logging.
    PerLevel {
        /// Receives warnings.
        warning: Option<DiagnosticCallback>,
        /// Receives recoverable errors.
        error: Option<DiagnosticCallback>,
        /// Receives fatal errors before the parse stops.
        fatal_error: Option<DiagnosticCallback>,
    },
    /// A single callback for all levels.
    Combined(CombinedCallback),
}

impl std::fmt::Debug for OnError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::PerLevel { .. } => write!(f, "PerLevel"),
            Self::Combined(_) => write!(f, "Combined"),
        }
    }
}

impl OnError {
    /// Deliver one diagnostic.
    ///
    /// Fatal diagnostics always come back as `Err`; the other levels only
    /// when a callback rejects them.
    pub(crate) fn report(
        &mut self,
        level: ErrorLevel,
        message: &str,
        locator: Option<SourceLocation>,
    ) -> Result<(), ParseError> {
        let callback = match self {
            Self::Default => None,
            Self::PerLevel {
                warning,
                error,
                fatal_error,
            } => match level {
                ErrorLevel::Warning => warning.as_mut(),
                ErrorLevel::Error => error.as_mut(),
                ErrorLevel::FatalError => fatal_error.as_mut(),
            },
            Self::Combined(callback) => {
                callback(level, message, locator)
                    .map_err(|e| ParseError::from_callback(e, locator))?;
                return finish(level, message, locator);
            }
        };

        match callback {
            Some(callback) => {
                callback(message, locator).map_err(|e| ParseError::from_callback(e, locator))?;
            }
            None => log_diagnostic(level, message, locator),
        }
        finish(level, message, locator)
    }
}

fn finish(
    level: ErrorLevel,
    message: &str,
    locator: Option<SourceLocation>,
) -> Result<(), ParseError> {
    if level == ErrorLevel::FatalError {
        return Err(ParseError::new(message, locator));
    }
    Ok(())
}

fn log_diagnostic(level: ErrorLevel, message: &str, locator: Option<SourceLocation>) {
    let (line, column) = locator.map_or((0, 0), |l| (l.line_number, l.column_number));
    match level {
        ErrorLevel::Warning => warn!(target: "tessera_parser", line, column, "{message}"),
        ErrorLevel::Error => error!(target: "tessera_parser", line, column, "{message}"),
        // Returned to the caller, not logged.
        ErrorLevel::FatalError => {}
    }
}

/// Options for [`DomParser`](crate::DomParser).
pub struct ParserOptions {
    /// Record line and column numbers on created nodes.
    pub locator: bool,
    /// Diagnostic routing.
    pub on_error: OnError,
    /// Namespace bindings in scope before the first element.
    pub xmlns: NamespaceMap,
    /// Line ending normalization applied to the source. `None` uses
    /// [`normalize_line_endings`].
    pub normalize_line_endings: Option<LineEndingNormalizer>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            locator: true,
            on_error: OnError::Default,
            xmlns: NamespaceMap::new(),
            normalize_line_endings: None,
        }
    }
}

impl std::fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserOptions")
            .field("locator", &self.locator)
            .field("on_error", &self.on_error)
            .field("xmlns", &self.xmlns)
            .field(
                "normalize_line_endings",
                &self.normalize_line_endings.is_some(),
            )
            .finish()
    }
}

impl ParserOptions {
    /// Set whether nodes record their source location.
    #[must_use]
    pub fn with_locator(mut self, locator: bool) -> Self {
        self.locator = locator;
        self
    }

    /// Route diagnostics through `on_error`.
    #[must_use]
    pub fn with_on_error(mut self, on_error: OnError) -> Self {
        self.on_error = on_error;
        self
    }

    /// Seed namespace bindings, e.g. `"" => XHTML` for a default namespace.
    #[must_use]
    pub fn with_xmlns(mut self, xmlns: NamespaceMap) -> Self {
        self.xmlns = xmlns;
        self
    }

    /// Replace the default [`normalize_line_endings`].
    #[must_use]
    pub fn with_line_ending_normalizer(
        mut self,
        normalizer: impl Fn(&str) -> String + 'static,
    ) -> Self {
        self.normalize_line_endings = Some(Box::new(normalizer));
        self
    }

    pub(crate) fn normalize(&self, source: &str) -> String {
        self.normalize_line_endings
            .as_ref()
            .map_or_else(|| normalize_line_endings(source), |f| f(source))
    }
}

/// [§ 2.11 End-of-Line Handling](https://www.w3.org/TR/xml11/#sec-line-ends)
///
/// "the two-character sequence #xD #xA, the two-character sequence #xD #x85,
/// the single character #x85, the single character #x2028, any #xD character
/// that is not immediately followed by #xA or #x85" are translated to #xA.
#[must_use]
pub fn normalize_line_endings(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                let _ = chars.next_if(|&next| next == '\n' || next == '\u{0085}');
                out.push('\n');
            }
            '\u{0085}' | '\u{2028}' => out.push('\n'),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb"), "a\nb");
        assert_eq!(normalize_line_endings("a\rb"), "a\nb");
        assert_eq!(normalize_line_endings("a\r\u{85}b"), "a\nb");
        assert_eq!(normalize_line_endings("a\u{85}b\u{2028}c"), "a\nb\nc");
        assert_eq!(normalize_line_endings("a\r\r\nb"), "a\n\nb");
    }

    #[test]
    fn fatal_is_always_an_error() {
        let mut on_error = OnError::Default;
        assert!(on_error.report(ErrorLevel::Warning, "w", None).is_ok());
        assert!(on_error.report(ErrorLevel::Error, "e", None).is_ok());
        let err = on_error
            .report(ErrorLevel::FatalError, "boom", None)
            .unwrap_err();
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn combined_callback_sees_every_level() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut on_error = OnError::Combined(Box::new(move |level, message, _| {
            sink.borrow_mut().push(format!("{level}:{message}"));
            Ok(())
        }));
        on_error.report(ErrorLevel::Warning, "a", None).unwrap();
        on_error.report(ErrorLevel::Error, "b", None).unwrap();
        assert_eq!(*seen.borrow(), ["warning:a", "error:b"]);
    }

    #[test]
    fn rejecting_callback_aborts() {
        let mut on_error = OnError::PerLevel {
            warning: Some(Box::new(|message, _| Err(format!("rejected {message}").into()))),
            error: None,
            fatal_error: None,
        };
        let err = on_error.report(ErrorLevel::Warning, "w", None).unwrap_err();
        assert_eq!(err.message, "rejected w");
        assert!(err.source.is_some());
    }
}
