//! [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
//!
//! The [`Document`] owns an arena of [`Node`]s. Every node reachable from
//! the document, and every node its factory methods create, lives in that
//! arena and is addressed by a [`NodeId`].

use std::hash::{BuildHasher, RandomState};
use std::sync::atomic::{AtomicU64, Ordering};

use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};

use crate::exception::{DomException, DomExceptionName};
use crate::name::is_valid_name;
use crate::namespace::{self, validate_and_extract};
use crate::node::{
    AttrData, DocumentTypeData, ElementData, Node, NodeId, NodeType, ProcessingInstructionData,
    QualifiedName, SourceLocation,
};

/// [§ 4.5](https://dom.spec.whatwg.org/#concept-document-content-type)
///
/// "Each document has an associated ... content type"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, IntoStaticStr)]
pub enum MimeType {
    /// `text/html`
    #[strum(serialize = "text/html")]
    Html,
    /// `text/xml`
    #[strum(serialize = "text/xml")]
    XmlText,
    /// `application/xml`
    #[strum(serialize = "application/xml")]
    XmlApplication,
    /// `application/xhtml+xml`
    #[strum(serialize = "application/xhtml+xml")]
    XhtmlApplication,
    /// `image/svg+xml`
    #[strum(serialize = "image/svg+xml")]
    SvgImage,
}

impl MimeType {
    /// Parse a mime type, falling back to `application/xml` for anything
    /// unrecognized.
    #[must_use]
    pub fn from_str_lenient(mime_type: &str) -> Self {
        mime_type.trim().parse().unwrap_or(Self::XmlApplication)
    }

    /// Only `text/html` is parsed and serialized with HTML rules.
    #[must_use]
    pub const fn is_html(self) -> bool {
        matches!(self, Self::Html)
    }

    /// The namespace unprefixed elements get when nothing else is declared.
    #[must_use]
    pub const fn default_namespace(self) -> Option<&'static str> {
        match self {
            Self::Html | Self::XhtmlApplication => Some(namespace::HTML),
            Self::SvgImage => Some(namespace::SVG),
            Self::XmlText | Self::XmlApplication => None,
        }
    }
}

/// "A document is said to be an XML document if its type is "xml";
/// otherwise an HTML document."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DocumentKind {
    /// `type` is `"html"`
    #[strum(serialize = "html")]
    Html,
    /// `type` is `"xml"`
    #[strum(serialize = "xml")]
    Xml,
}

static DOCUMENT_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Random per-document id, used to order nodes of different documents.
fn next_document_uid() -> u64 {
    let sequence = DOCUMENT_COUNTER.fetch_add(1, Ordering::Relaxed);
    RandomState::new().hash_one(sequence)
}

/// Arena-based document with O(1) node access.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// The Document node is always at index 0 ([`NodeId::ROOT`]). Nodes removed
/// from the tree stay allocated and can be re-inserted.
///
/// Slots are never reused, so a [`NodeId`] stays valid for the life of the
/// document. Memory grows with every node created, including removed
/// subtrees and discarded clones. [`Document::clone_document`] copies only
/// the nodes reachable from the root into a new arena.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    content_type: MimeType,
    version: u64,
    uid: u64,
}

impl Document {
    /// Create an empty document of the given content type.
    #[must_use]
    pub fn new(content_type: MimeType) -> Self {
        Self {
            nodes: vec![Node::new(NodeType::Document)],
            content_type,
            version: 0,
            uid: next_document_uid(),
        }
    }

    /// Get the document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The content type the document was created with.
    #[must_use]
    pub const fn content_type(&self) -> MimeType {
        self.content_type
    }

    /// `"html"` for `text/html` documents, `"xml"` otherwise.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        if self.content_type.is_html() {
            DocumentKind::Html
        } else {
            DocumentKind::Xml
        }
    }

    /// Returns true for HTML documents.
    #[must_use]
    pub const fn is_html(&self) -> bool {
        self.content_type.is_html()
    }

    /// The revision counter. It increases on every structural, attribute
    /// or character data mutation; live collections compare against it.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    pub(crate) const fn bump_version(&mut self) {
        self.version += 1;
    }

    pub(crate) const fn uid(&self) -> u64 {
        self.uid
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node, DomException> {
        self.get(id)
            .ok_or_else(|| DomException::not_found(format!("no node {} in this document", id.0)))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomException> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| DomException::not_found(format!("no node {} in this document", id.0)))
    }

    /// Number of allocated nodes, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the document node itself is allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub(crate) fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(node_type));
        id
    }

    /// Record where in the source a node came from.
    pub fn set_location(&mut self, id: NodeId, location: SourceLocation) {
        if let Some(node) = self.get_mut(id) {
            node.location = Some(location);
        }
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-parentelement)
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.as_element(p).is_some())
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-haschildnodes)
    #[must_use]
    pub fn has_child_nodes(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    /// [§ 4.2.6 Children](https://dom.spec.whatwg.org/#dom-parentnode-children)
    ///
    /// The element children of a node.
    #[must_use]
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.as_element(c).is_some())
            .collect()
    }

    /// [§ 4.2.6](https://dom.spec.whatwg.org/#dom-parentnode-firstelementchild)
    #[must_use]
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&c| self.as_element(c).is_some())
    }

    /// [§ 4.2.6](https://dom.spec.whatwg.org/#dom-parentnode-lastelementchild)
    #[must_use]
    pub fn last_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .iter()
            .rev()
            .copied()
            .find(|&c| self.as_element(c).is_some())
    }

    /// [§ 4.2.6](https://dom.spec.whatwg.org/#dom-parentnode-childelementcount)
    #[must_use]
    pub fn child_element_count(&self, id: NodeId) -> usize {
        self.children(id)
            .iter()
            .filter(|&&c| self.as_element(c).is_some())
            .count()
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// "An object A is called a descendant of an object B, if either A is a
    /// child of B or A is a child of an object C that is a descendant of B."
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// [§ 4.4 contains](https://dom.spec.whatwg.org/#dom-node-contains)
    ///
    /// "The contains(other) method steps are to return true if other is an
    /// inclusive descendant of this; otherwise false"
    #[must_use]
    pub fn contains(&self, id: NodeId, other: NodeId) -> bool {
        id == other || self.is_descendant_of(other, id)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            doc: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            doc: self,
            current: self.prev_sibling(id),
        }
    }

    /// Iterate over the descendants of a node in tree order, excluding the
    /// node itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            doc: self,
            root: id,
            next: self.first_child(id),
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    pub(crate) fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get attribute data if this node is an attribute.
    #[must_use]
    pub fn as_attr(&self, id: NodeId) -> Option<&AttrData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Attr(data) => Some(data),
            _ => None,
        })
    }

    pub(crate) fn as_attr_mut(&mut self, id: NodeId) -> Option<&mut AttrData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Attr(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-documentelement)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.first_element_child(NodeId::ROOT)
    }

    /// [§ 4.5](https://dom.spec.whatwg.org/#dom-document-doctype)
    ///
    /// "The doctype getter steps are to return the child of this that is a
    /// doctype; otherwise null."
    #[must_use]
    pub fn doctype(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&id| self.get(id).is_some_and(Node::is_doctype))
    }

    // =========================================================================
    // Factory methods
    // =========================================================================

    /// Whether elements created with `create_element` land in the HTML
    /// namespace.
    const fn creates_html_elements(&self) -> bool {
        matches!(
            self.content_type,
            MimeType::Html | MimeType::XhtmlApplication
        )
    }

    /// [§ 4.5 createElement](https://dom.spec.whatwg.org/#dom-document-createelement)
    pub fn create_element(&mut self, local_name: &str) -> Result<NodeId, DomException> {
        // STEP 1: "If localName is not a valid element name, then throw an
        //         "InvalidCharacterError" DOMException."
        if !is_valid_name(local_name) {
            return Err(DomException::invalid_character(format!(
                "invalid element name: \"{local_name}\""
            )));
        }
        // STEP 2: "If this is an HTML document, then set localName to localName
        //         in ASCII lowercase."
        let local_name = if self.is_html() {
            local_name.to_ascii_lowercase()
        } else {
            local_name.to_string()
        };
        // STEP 5: "Let namespace be the HTML namespace, if this is an HTML
        //         document or this's content type is "application/xhtml+xml";
        //         otherwise null."
        let namespace = self.creates_html_elements().then_some(namespace::HTML);
        let name = QualifiedName::new(namespace, None, &local_name);
        Ok(self.alloc(NodeType::Element(ElementData::new(name))))
    }

    /// [§ 4.5 createElementNS](https://dom.spec.whatwg.org/#dom-document-createelementns)
    pub fn create_element_ns(
        &mut self,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> Result<NodeId, DomException> {
        let name = validate_and_extract(namespace, qualified_name)?;
        Ok(self.alloc(NodeType::Element(ElementData::new(name))))
    }

    /// [§ 4.5 createAttribute](https://dom.spec.whatwg.org/#dom-document-createattribute)
    pub fn create_attribute(&mut self, local_name: &str) -> Result<NodeId, DomException> {
        if !is_valid_name(local_name) {
            return Err(DomException::invalid_character(format!(
                "invalid attribute name: \"{local_name}\""
            )));
        }
        let local_name = if self.is_html() {
            local_name.to_ascii_lowercase()
        } else {
            local_name.to_string()
        };
        Ok(self.alloc_attr(QualifiedName::new(None, None, &local_name), ""))
    }

    /// [§ 4.5 createAttributeNS](https://dom.spec.whatwg.org/#dom-document-createattributens)
    pub fn create_attribute_ns(
        &mut self,
        namespace: Option<&str>,
        qualified_name: &str,
    ) -> Result<NodeId, DomException> {
        let name = validate_and_extract(namespace, qualified_name)?;
        Ok(self.alloc_attr(name, ""))
    }

    pub(crate) fn alloc_attr(&mut self, name: QualifiedName, value: &str) -> NodeId {
        self.alloc(NodeType::Attr(AttrData {
            name,
            value: value.to_string(),
            owner_element: None,
            specified: true,
        }))
    }

    /// [§ 4.5 createTextNode](https://dom.spec.whatwg.org/#dom-document-createtextnode)
    pub fn create_text_node(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Text(data.to_string()))
    }

    /// [§ 4.5 createComment](https://dom.spec.whatwg.org/#dom-document-createcomment)
    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Comment(data.to_string()))
    }

    /// [§ 4.5 createCDATASection](https://dom.spec.whatwg.org/#dom-document-createcdatasection)
    pub fn create_cdata_section(&mut self, data: &str) -> Result<NodeId, DomException> {
        // STEP 1: "If this is an HTML document, then throw a "NotSupportedError"."
        if self.is_html() {
            return Err(DomException::new(
                DomExceptionName::NotSupportedError,
                "CDATA sections are not supported in HTML documents",
            ));
        }
        // STEP 2: "If data contains the string "]]>", then throw an "InvalidCharacterError"."
        if data.contains("]]>") {
            return Err(DomException::invalid_character(
                "CDATA section data must not contain \"]]>\"",
            ));
        }
        Ok(self.alloc(NodeType::CDataSection(data.to_string())))
    }

    /// [§ 4.5 createProcessingInstruction](https://dom.spec.whatwg.org/#dom-document-createprocessinginstruction)
    pub fn create_processing_instruction(
        &mut self,
        target: &str,
        data: &str,
    ) -> Result<NodeId, DomException> {
        if !is_valid_name(target) {
            return Err(DomException::invalid_character(format!(
                "invalid processing instruction target: \"{target}\""
            )));
        }
        if data.contains("?>") {
            return Err(DomException::invalid_character(
                "processing instruction data must not contain \"?>\"",
            ));
        }
        Ok(self.alloc(NodeType::ProcessingInstruction(ProcessingInstructionData {
            target: target.to_string(),
            data: data.to_string(),
        })))
    }

    /// [§ 4.5 createDocumentFragment](https://dom.spec.whatwg.org/#dom-document-createdocumentfragment)
    pub fn create_document_fragment(&mut self) -> NodeId {
        self.alloc(NodeType::DocumentFragment)
    }

    /// Allocate a doctype node in this document. Use
    /// [`DomImplementation::create_document_type`](crate::DomImplementation::create_document_type)
    /// to validate the name first.
    pub fn create_document_type(&mut self, doctype: DocumentTypeData) -> NodeId {
        self.alloc(NodeType::DocumentType(doctype))
    }

    /// [§ 4.5 getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
    ///
    /// "The getElementById(elementId) method steps are to return the first
    /// element, in tree order, within this's descendants, whose ID is elementId"
    #[must_use]
    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        let root = self.document_element()?;
        std::iter::once(root)
            .chain(self.descendants(root))
            .find(|&id| self.get_attribute(id, "id").as_deref() == Some(element_id))
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    doc: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.doc.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    doc: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.doc.prev_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct DescendantIterator<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.doc.first_child(id).or_else(|| {
            let mut current = id;
            loop {
                if current == self.root {
                    return None;
                }
                if let Some(sibling) = self.doc.next_sibling(current) {
                    return Some(sibling);
                }
                current = self.doc.parent(current)?;
            }
        });
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types() {
        assert_eq!(MimeType::from_str_lenient("text/html"), MimeType::Html);
        assert_eq!(
            MimeType::from_str_lenient("image/svg+xml"),
            MimeType::SvgImage
        );
        assert_eq!(
            MimeType::from_str_lenient("text/plain"),
            MimeType::XmlApplication
        );
        assert_eq!(MimeType::XhtmlApplication.to_string(), "application/xhtml+xml");
        assert_eq!(MimeType::SvgImage.default_namespace(), Some(namespace::SVG));
    }

    #[test]
    fn html_documents_lowercase_element_names() {
        let mut doc = Document::new(MimeType::Html);
        let div = doc.create_element("DIV").unwrap();
        let element = doc.as_element(div).unwrap();
        assert_eq!(element.tag_name(), "div");
        assert_eq!(element.name.namespace_uri.as_deref(), Some(namespace::HTML));
        assert_eq!(doc.kind().to_string(), "html");
    }

    #[test]
    fn xml_documents_keep_case_and_have_no_namespace() {
        let mut doc = Document::new(MimeType::XmlText);
        let el = doc.create_element("Item").unwrap();
        assert_eq!(doc.as_element(el).unwrap().tag_name(), "Item");
        assert_eq!(doc.get(el).unwrap().namespace_uri(), None);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut doc = Document::new(MimeType::XmlText);
        let err = doc.create_element("1x").unwrap_err();
        assert_eq!(err.name, DomExceptionName::InvalidCharacterError);
        let err = doc.create_processing_instruction("pi", "a?>b").unwrap_err();
        assert_eq!(err.name, DomExceptionName::InvalidCharacterError);
    }

    #[test]
    fn cdata_not_supported_in_html() {
        let mut doc = Document::new(MimeType::Html);
        let err = doc.create_cdata_section("x").unwrap_err();
        assert_eq!(err.name, DomExceptionName::NotSupportedError);
    }

    #[test]
    fn documents_get_distinct_uids() {
        let a = Document::new(MimeType::XmlText);
        let b = Document::new(MimeType::XmlText);
        assert_ne!(a.uid(), b.uid());
    }
}
