//! The event interface between the scanner and whatever consumes it.
//!
//! The scanner reports markup as a stream of SAX-style events. Every method
//! returns `Result` so a consumer can stop the parse; diagnostic methods
//! receive the messages the scanner would otherwise only log.

use tessera_dom::SourceLocation;

use crate::error::ParseError;

/// One attribute of a start tag, with its namespace resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeToken {
    /// The name as written, e.g. `xlink:href`.
    pub qname: String,
    /// The value with whitespace normalized and references decoded.
    pub value: String,
    /// Part of the name after the colon.
    pub local_name: String,
    /// Part of the name before the colon, if any.
    pub prefix: Option<String>,
    /// Resolved namespace. Unprefixed attributes other than `xmlns` have none.
    pub uri: Option<String>,
    /// Position of the attribute in the source, when tracked.
    pub location: Option<SourceLocation>,
    pub(crate) offset: usize,
}

impl AttributeToken {
    pub(crate) fn new(qname: String, value: String, offset: usize) -> Self {
        Self {
            local_name: qname.clone(),
            qname,
            value,
            prefix: None,
            uri: None,
            location: None,
            offset,
        }
    }
}

/// The attributes of a start tag in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementAttributes {
    tokens: Vec<AttributeToken>,
}

impl ElementAttributes {
    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the tag has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The attribute at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AttributeToken> {
        self.tokens.get(index)
    }

    /// The attribute written as `qname`.
    #[must_use]
    pub fn get_by_qname(&self, qname: &str) -> Option<&AttributeToken> {
        self.tokens.iter().find(|t| t.qname == qname)
    }

    /// Iterate in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, AttributeToken> {
        self.tokens.iter()
    }

    pub(crate) fn contains(&self, qname: &str) -> bool {
        self.get_by_qname(qname).is_some()
    }

    pub(crate) fn push(&mut self, token: AttributeToken) {
        self.tokens.push(token);
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut [AttributeToken] {
        &mut self.tokens
    }
}

impl<'a> IntoIterator for &'a ElementAttributes {
    type Item = &'a AttributeToken;
    type IntoIter = std::slice::Iter<'a, AttributeToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Receiver of scanner events.
///
/// Only `characters`, `start_element` and `end_element` are required; the
/// remaining events default to doing nothing, and diagnostics default to
/// ignoring warnings and errors while turning fatal errors into a
/// [`ParseError`].
#[allow(unused_variables)]
pub trait ContentHandler {
    /// Position of the event about to be delivered. Only called when
    /// location tracking is enabled.
    fn set_document_locator(&mut self, location: SourceLocation) {}

    /// Called once before any other event.
    fn start_document(&mut self) -> Result<(), ParseError> {
        Ok(())
    }

    /// Called once after the last event.
    fn end_document(&mut self) -> Result<(), ParseError> {
        Ok(())
    }

    /// `prefix` (empty for the default namespace) is bound to `uri` for the
    /// element about to start.
    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> Result<(), ParseError> {
        Ok(())
    }

    /// The binding of `prefix` went out of scope.
    fn end_prefix_mapping(&mut self, prefix: &str) -> Result<(), ParseError> {
        Ok(())
    }

    /// A start tag.
    fn start_element(
        &mut self,
        uri: Option<&str>,
        local_name: &str,
        qname: &str,
        attributes: &ElementAttributes,
    ) -> Result<(), ParseError>;

    /// An end tag, or the implicit end of a self-closing or void element.
    fn end_element(
        &mut self,
        uri: Option<&str>,
        local_name: &str,
        qname: &str,
    ) -> Result<(), ParseError>;

    /// Character data with references decoded.
    fn characters(&mut self, text: &str) -> Result<(), ParseError>;

    /// Text left over at the end of the input when no element was seen.
    fn document_text(&mut self, text: &str) -> Result<(), ParseError> {
        Ok(())
    }

    /// `<?target data?>`
    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), ParseError> {
        Ok(())
    }

    /// `<!--text-->`
    fn comment(&mut self, text: &str) -> Result<(), ParseError> {
        Ok(())
    }

    /// The `characters` events that follow belong to a CDATA section.
    fn start_cdata(&mut self) -> Result<(), ParseError> {
        Ok(())
    }

    /// End of the CDATA section.
    fn end_cdata(&mut self) -> Result<(), ParseError> {
        Ok(())
    }

    /// A document type declaration. Identifiers are unquoted; the internal
    /// subset is the raw text between the brackets.
    fn start_dtd(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        internal_subset: Option<&str>,
    ) -> Result<(), ParseError> {
        Ok(())
    }

    /// End of the document type declaration.
    fn end_dtd(&mut self) -> Result<(), ParseError> {
        Ok(())
    }

    /// A recoverable oddity.
    fn warning(&mut self, message: &str) -> Result<(), ParseError> {
        Ok(())
    }

    /// A recoverable well-formedness error.
    fn error(&mut self, message: &str) -> Result<(), ParseError> {
        Ok(())
    }

    /// An unrecoverable error. The parse stops whatever this returns.
    fn fatal_error(&mut self, message: &str) -> Result<(), ParseError> {
        Err(ParseError::new(message, None))
    }
}
