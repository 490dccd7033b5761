//! Builds a [`Document`] from scanner events.

use tessera_dom::{
    Document, DocumentTypeData, DomException, MimeType, NodeId, SourceLocation,
};

use crate::error::{ErrorLevel, ParseError};
use crate::grammar::is_all_whitespace;
use crate::handler::{ContentHandler, ElementAttributes};
use crate::options::OnError;

/// A [`ContentHandler`] that builds a DOM tree.
///
/// Keeps a cursor on the element new nodes are appended to; with no open
/// element they go to the document. Text at the document level is only
/// kept when it is whitespace.
pub struct DomHandler<'o> {
    mime_type: MimeType,
    doc: Document,
    current: Option<NodeId>,
    in_cdata: bool,
    locator: Option<SourceLocation>,
    track_locations: bool,
    on_error: &'o mut OnError,
}

impl<'o> DomHandler<'o> {
    /// A handler building a document of `mime_type`, reporting diagnostics
    /// to `on_error`.
    pub fn new(mime_type: MimeType, on_error: &'o mut OnError, track_locations: bool) -> Self {
        Self {
            mime_type,
            doc: Document::new(mime_type),
            current: None,
            in_cdata: false,
            locator: None,
            track_locations,
            on_error,
        }
    }

    /// The document built so far.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    /// Finish and take the document.
    #[must_use]
    pub fn into_document(self) -> Document {
        self.doc
    }

    fn dom_error(&self, exception: DomException) -> ParseError {
        ParseError::from(exception).with_locator(self.locator)
    }

    fn stamp(&mut self, id: NodeId) {
        if self.track_locations
            && let Some(location) = self.locator
        {
            self.doc.set_location(id, location);
        }
    }

    /// Append `node` to the current element, or to the document.
    fn append(&mut self, node: NodeId) -> Result<(), ParseError> {
        let parent = self.current.unwrap_or(NodeId::ROOT);
        self.stamp(node);
        let _ = self
            .doc
            .append_child(parent, node)
            .map_err(|e| self.dom_error(e))?;
        Ok(())
    }

    fn report(&mut self, level: ErrorLevel, message: &str) -> Result<(), ParseError> {
        self.on_error.report(level, message, self.locator)
    }
}

impl ContentHandler for DomHandler<'_> {
    fn set_document_locator(&mut self, location: SourceLocation) {
        self.locator = Some(location);
    }

    fn start_document(&mut self) -> Result<(), ParseError> {
        self.doc = Document::new(self.mime_type);
        self.current = None;
        self.in_cdata = false;
        Ok(())
    }

    fn start_element(
        &mut self,
        uri: Option<&str>,
        _local_name: &str,
        qname: &str,
        attributes: &ElementAttributes,
    ) -> Result<(), ParseError> {
        let element = self
            .doc
            .create_element_ns(uri, qname)
            .map_err(|e| self.dom_error(e))?;
        self.append(element)?;

        for token in attributes {
            let attr = self
                .doc
                .create_attribute_ns(token.uri.as_deref(), &token.qname)
                .and_then(|attr| self.doc.set_attr_value(attr, &token.value).map(|()| attr))
                .map_err(|e| self.dom_error(e))?;
            if self.track_locations
                && let Some(location) = token.location
            {
                self.doc.set_location(attr, location);
            }
            let _ = self
                .doc
                .set_attribute_node(element, attr)
                .map_err(|e| self.dom_error(e))?;
        }

        self.current = Some(element);
        Ok(())
    }

    fn end_element(
        &mut self,
        _uri: Option<&str>,
        _local_name: &str,
        _qname: &str,
    ) -> Result<(), ParseError> {
        self.current = self.current.and_then(|id| self.doc.parent_element(id));
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), ParseError> {
        if text.is_empty() || (self.current.is_none() && !is_all_whitespace(text)) {
            return Ok(());
        }
        // HTML documents have no CDATA sections; their content is text.
        let node = if self.in_cdata && !self.doc.is_html() {
            self.doc
                .create_cdata_section(text)
                .map_err(|e| self.dom_error(e))?
        } else {
            self.doc.create_text_node(text)
        };
        self.append(node)
    }

    fn document_text(&mut self, text: &str) -> Result<(), ParseError> {
        let node = self.doc.create_text_node(text);
        self.stamp(node);
        let _ = self
            .doc
            .append_child(NodeId::ROOT, node)
            .map_err(|e| self.dom_error(e))?;
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ParseError> {
        let node = self
            .doc
            .create_processing_instruction(target, data)
            .map_err(|e| self.dom_error(e))?;
        self.append(node)
    }

    fn comment(&mut self, text: &str) -> Result<(), ParseError> {
        let node = self.doc.create_comment(text);
        self.append(node)
    }

    fn start_cdata(&mut self) -> Result<(), ParseError> {
        self.in_cdata = true;
        Ok(())
    }

    fn end_cdata(&mut self) -> Result<(), ParseError> {
        self.in_cdata = false;
        Ok(())
    }

    fn start_dtd(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        internal_subset: Option<&str>,
    ) -> Result<(), ParseError> {
        let doctype = self.doc.create_document_type(DocumentTypeData {
            name: name.to_string(),
            public_id: public_id.unwrap_or_default().to_string(),
            system_id: system_id.unwrap_or_default().to_string(),
            internal_subset: internal_subset.unwrap_or_default().to_string(),
        });
        self.stamp(doctype);
        let _ = self
            .doc
            .append_child(NodeId::ROOT, doctype)
            .map_err(|e| self.dom_error(e))?;
        Ok(())
    }

    fn warning(&mut self, message: &str) -> Result<(), ParseError> {
        self.report(ErrorLevel::Warning, message)
    }

    fn error(&mut self, message: &str) -> Result<(), ParseError> {
        self.report(ErrorLevel::Error, message)
    }

    fn fatal_error(&mut self, message: &str) -> Result<(), ParseError> {
        self.report(ErrorLevel::FatalError, message)
    }
}
