use std::collections::HashMap;
use std::rc::Rc;

use tessera_dom::NamespaceMap;
use tracing::trace;

use super::helpers::LineIndex;
use crate::entities::EntityMap;
use crate::error::ParseError;
use crate::grammar::{self, is_all_whitespace, is_whitespace};
use crate::handler::ContentHandler;

/// How a scan stopped before finishing a construct.
#[derive(Debug)]
pub(super) enum Interrupt {
    /// A malformed tag. The scanner reports it as an error, emits the `<` as
    /// text and resumes after it.
    Syntax(String),
    /// A fatal error or an error raised by the handler. The scan stops.
    Abort(ParseError),
}

impl From<ParseError> for Interrupt {
    fn from(error: ParseError) -> Self {
        Self::Abort(error)
    }
}

pub(super) type Step<T> = Result<T, Interrupt>;

/// An element whose end tag has not been seen yet.
#[derive(Debug)]
pub(super) struct OpenElement {
    pub(super) qname: String,
    pub(super) local_name: String,
    pub(super) uri: Option<String>,
    /// Bindings in scope for this element's content. Shared with the parent
    /// frame unless this element declared something.
    pub(super) namespaces: Rc<NamespaceMap>,
    /// Prefixes declared on this element, unmapped when it closes.
    pub(super) declared: Vec<String>,
}

/// What a scan needs besides the source and the handler.
#[derive(Debug, Clone)]
pub struct ScannerConfig<'a> {
    /// Scan as HTML: void elements, raw text elements, case-insensitive
    /// keywords and lenient attribute syntax.
    pub is_html: bool,
    /// Report source positions through
    /// [`ContentHandler::set_document_locator`].
    pub track_locations: bool,
    /// Bindings in scope before the first element.
    pub namespaces: NamespaceMap,
    /// Named references recognized in text and attribute values.
    pub entities: &'a EntityMap,
}

/// The markup scanner. See the [module docs](super).
pub struct Scanner<'a, H: ContentHandler + ?Sized> {
    pub(super) source: &'a str,
    pub(super) handler: &'a mut H,
    pub(super) entities: &'a EntityMap,
    pub(super) is_html: bool,
    pub(super) track_locations: bool,
    pub(super) line_index: LineIndex,
    /// Start of the input not yet reported.
    pub(super) start: usize,
    pub(super) stack: Vec<OpenElement>,
    pub(super) base_namespaces: Rc<NamespaceMap>,
    /// ASCII-lowercased copy of the source for HTML end tag searches.
    pub(super) lowered: Option<String>,
    /// Cached position of the last end tag per lowercased element name.
    pub(super) close_positions: HashMap<String, Option<usize>>,
    /// An element has been started at the top level.
    pub(super) seen_root: bool,
}

impl<'a, H: ContentHandler + ?Sized> Scanner<'a, H> {
    /// Create a scanner over `source`, which must already be line-ending
    /// normalized.
    pub fn new(source: &'a str, handler: &'a mut H, config: ScannerConfig<'a>) -> Self {
        Self {
            source,
            handler,
            entities: config.entities,
            is_html: config.is_html,
            track_locations: config.track_locations,
            line_index: LineIndex::new(source),
            start: 0,
            stack: Vec::new(),
            base_namespaces: Rc::new(config.namespaces),
            lowered: None,
            close_positions: HashMap::new(),
            seen_root: false,
        }
    }

    /// Scan the whole source, delivering events to the handler.
    pub fn run(mut self) -> Result<(), ParseError> {
        self.handler.start_document()?;
        if self.source.contains('\u{FFFD}') {
            self.warning("Unicode replacement character detected, source encoding issues?")?;
        }

        loop {
            let Some(offset) = self.source[self.start..].find('<') else {
                self.finish()?;
                break;
            };
            let tag_start = self.start + offset;

            let next = match self.scan_markup(tag_start) {
                Ok(end) => Some(end.min(self.source.len())),
                Err(Interrupt::Syntax(message)) => {
                    trace!(target: "tessera_parser", tag_start, "recovering from: {message}");
                    self.error(&format!("element parse error: {message}"))?;
                    None
                }
                Err(Interrupt::Abort(error)) => return Err(error),
            };

            match next {
                Some(end) if end > self.start => self.start = end,
                // Treat the `<` as text and look for the next one.
                _ => self.append_text(tag_start.max(self.start) + 1)?,
            }
        }

        self.handler.end_document()
    }

    /// Report the text before `tag_start`, then the construct starting there.
    /// Returns the offset just past the construct.
    fn scan_markup(&mut self, tag_start: usize) -> Step<usize> {
        if tag_start > self.start {
            if !self.is_html && self.stack.is_empty() {
                let stray: String = self.source[self.start..tag_start]
                    .chars()
                    .filter(|&c| !is_whitespace(c))
                    .collect();
                if !stray.is_empty() {
                    self.error(&format!(
                        "Unexpected content outside root element: '{stray}'"
                    ))?;
                }
            }
            self.append_text(tag_start)?;
        }

        match self.source[tag_start + 1..].chars().next() {
            Some('/') => self.scan_end_tag(tag_start),
            Some('?') => {
                self.locate(tag_start);
                self.scan_processing_instruction(tag_start)
            }
            Some('!') => {
                self.locate(tag_start);
                self.scan_markup_declaration(tag_start)
            }
            _ => {
                self.locate(tag_start);
                self.scan_element(tag_start)
            }
        }
    }

    /// [§ 3.1 ETag](https://www.w3.org/TR/xml/#NT-ETag): `'</' Name S? '>'`
    fn scan_end_tag(&mut self, tag_start: usize) -> Step<usize> {
        let source = self.source;
        let body_start = tag_start + 2;
        let close = source[body_start..].find('>').map(|i| body_start + i);
        let raw = &source[body_start..close.unwrap_or(source.len())];
        self.locate(tag_start);

        if raw.is_empty() {
            return Err(self.fatal("end tag name missing"));
        }
        let (Some(close), Some(name)) = (close, grammar::end_tag_name(raw)) else {
            return Err(self.fatal(format!(
                "end tag name contains invalid characters: \"{raw}\""
            )));
        };
        let Some(current) = self.stack.last() else {
            return Err(self.fatal(format!(
                "end tag \"{name}\" has no matching start tag"
            )));
        };

        if current.qname != name {
            if !current.qname.eq_ignore_ascii_case(name) {
                let message = format!(
                    "Opening and ending tag mismatch: \"{}\" != \"{raw}\"",
                    current.qname
                );
                return Err(self.fatal(message));
            }
            if !self.is_html {
                let message = format!(
                    "end tag \"{raw}\" only matches \"{}\" ignoring case",
                    current.qname
                );
                return Err(self.fatal(message));
            }
        }

        self.close_element()?;
        Ok(close + 1)
    }

    /// Pop the innermost open element and report its end.
    pub(super) fn close_element(&mut self) -> Result<(), ParseError> {
        let Some(frame) = self.stack.pop() else {
            return Ok(());
        };
        self.handler
            .end_element(frame.uri.as_deref(), &frame.local_name, &frame.qname)?;
        for prefix in &frame.declared {
            self.handler.end_prefix_mapping(prefix)?;
        }
        Ok(())
    }

    /// No `<` left in the input.
    fn finish(&mut self) -> Result<(), ParseError> {
        let source = self.source;

        if !self.stack.is_empty() {
            self.append_text(source.len())?;
            if !self.is_html {
                let names: Vec<String> =
                    self.stack.iter().map(|frame| frame.qname.clone()).collect();
                for name in &names {
                    self.warning(&format!("unclosed xml tag: {name}"))?;
                }
                self.error(&format!("unclosed xml tag(s): {}", names.join(", ")))?;
            }
            while !self.stack.is_empty() {
                self.close_element()?;
            }
            return Ok(());
        }

        let rest = &source[self.start..];
        if !is_all_whitespace(rest) {
            if self.seen_root {
                self.error("Extra content at the end of the document")?;
            } else {
                let text = self.decode_references(rest)?;
                self.locate(self.start);
                self.handler.document_text(&text)?;
            }
        }
        self.start = source.len();
        Ok(())
    }
}
