//! The parser entry point.

use tessera_dom::{Document, MimeType, namespace};
use tracing::debug;

use crate::dom_handler::DomHandler;
use crate::entities::{html_entities, xml_entities};
use crate::error::ParseError;
use crate::handler::ContentHandler;
use crate::options::ParserOptions;
use crate::scanner::{Scanner, ScannerConfig};

/// Parses markup strings into [`Document`]s.
///
/// # Example
///
/// ```
/// use tessera_parser::DomParser;
///
/// let mut parser = DomParser::default();
/// let doc = parser.parse_from_string("<root><child/></root>", "text/xml").unwrap();
/// assert_eq!(doc.child_element_count(doc.document_element().unwrap()), 1);
/// ```
#[derive(Debug, Default)]
pub struct DomParser {
    options: ParserOptions,
}

impl DomParser {
    /// A parser with the given options.
    #[must_use]
    pub const fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// The options this parser was created with.
    #[must_use]
    pub const fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse `source` as `mime_type`.
    ///
    /// `text/html` parses as HTML; `application/xhtml+xml` and
    /// `image/svg+xml` as XML in the XHTML and SVG namespaces; anything else
    /// as plain XML.
    pub fn parse_from_string(
        &mut self,
        source: &str,
        mime_type: &str,
    ) -> Result<Document, ParseError> {
        self.parse_with_mime(source, MimeType::from_str_lenient(mime_type))
    }

    /// Parse `source` as an already resolved [`MimeType`].
    pub fn parse_with_mime(
        &mut self,
        source: &str,
        mime_type: MimeType,
    ) -> Result<Document, ParseError> {
        let is_html = mime_type.is_html();

        let mut namespaces = self.options.xmlns.clone();
        if let Some(default_namespace) = mime_type.default_namespace()
            && !namespaces.contains_prefix("")
        {
            let _ = namespaces.insert("", default_namespace);
        }
        if !namespaces.contains_prefix("xml") {
            let _ = namespaces.insert("xml", namespace::XML);
        }

        let source = self.options.normalize(source);
        let track_locations = self.options.locator;
        let config = ScannerConfig {
            is_html,
            track_locations,
            namespaces,
            entities: if is_html { html_entities() } else { xml_entities() },
        };

        let mut handler = DomHandler::new(mime_type, &mut self.options.on_error, track_locations);
        Scanner::new(&source, &mut handler, config).run()?;

        if !is_html && handler.document().document_element().is_none() {
            handler.fatal_error("missing root element")?;
        }

        let doc = handler.into_document();
        debug!(
            target: "tessera_parser",
            content_type = %mime_type,
            nodes = doc.len(),
            "parsed document"
        );
        Ok(doc)
    }
}
