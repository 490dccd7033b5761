//! [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
//!
//! The node record stored in a [`Document`](crate::Document) arena. Every
//! node kind shares one base record ([`Node`]) and carries its kind-specific
//! fields in the [`NodeType`] payload.

use crate::namespace::NamespaceMap;

/// A type-safe index into a document's node arena.
///
/// "Each node has an associated node document..."
///
/// A `NodeId` is only meaningful together with the [`Document`](crate::Document)
/// that allocated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The document node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);
}

/// Position in the source markup a node was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line_number: usize,
    /// 1-based column number, counted in characters.
    pub column_number: usize,
}

/// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-nodetype) legacy node type codes.
pub mod node_type_code {
    /// `Node.ELEMENT_NODE`
    pub const ELEMENT_NODE: u16 = 1;
    /// `Node.ATTRIBUTE_NODE`
    pub const ATTRIBUTE_NODE: u16 = 2;
    /// `Node.TEXT_NODE`
    pub const TEXT_NODE: u16 = 3;
    /// `Node.CDATA_SECTION_NODE`
    pub const CDATA_SECTION_NODE: u16 = 4;
    /// `Node.PROCESSING_INSTRUCTION_NODE`
    pub const PROCESSING_INSTRUCTION_NODE: u16 = 7;
    /// `Node.COMMENT_NODE`
    pub const COMMENT_NODE: u16 = 8;
    /// `Node.DOCUMENT_NODE`
    pub const DOCUMENT_NODE: u16 = 9;
    /// `Node.DOCUMENT_TYPE_NODE`
    pub const DOCUMENT_TYPE_NODE: u16 = 10;
    /// `Node.DOCUMENT_FRAGMENT_NODE`
    pub const DOCUMENT_FRAGMENT_NODE: u16 = 11;
}

/// A namespace-qualified name shared by elements and attributes.
///
/// "Elements have an associated namespace, namespace prefix, local name"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    /// The namespace URI, if any.
    pub namespace_uri: Option<String>,
    /// The namespace prefix, if any. Never the empty string.
    pub prefix: Option<String>,
    /// The local name.
    pub local_name: String,
}

impl QualifiedName {
    /// Build a name from its parts.
    pub fn new(namespace_uri: Option<&str>, prefix: Option<&str>, local_name: &str) -> Self {
        Self {
            namespace_uri: namespace_uri.map(str::to_string),
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
            local_name: local_name.to_string(),
        }
    }

    /// "An element's qualified name is its local name if its namespace prefix
    /// is null; otherwise its namespace prefix, followed by ":", followed by
    /// its local name."
    #[must_use]
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// Element-specific data.
///
/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Namespace, prefix and local name.
    pub name: QualifiedName,
    /// "An element has an associated attribute list". Ids of `Attr` nodes in
    /// the same arena, in insertion order.
    pub attributes: Vec<NodeId>,
    /// Prefixes declared by this element's own `xmlns`/`xmlns:*` attributes.
    pub(crate) ns_map: NamespaceMap,
}

impl ElementData {
    pub(crate) fn new(name: QualifiedName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            ns_map: NamespaceMap::new(),
        }
    }

    /// The qualified name as written: `prefix:localName` or `localName`.
    #[must_use]
    pub fn tag_name(&self) -> String {
        self.name.qualified()
    }

    /// Namespace declarations made on this element.
    #[must_use]
    pub const fn namespace_declarations(&self) -> &NamespaceMap {
        &self.ns_map
    }
}

/// [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
#[derive(Debug, Clone)]
pub struct AttrData {
    /// Namespace, prefix and local name.
    pub name: QualifiedName,
    /// "Attributes have ... a value"
    pub value: String,
    /// "... and an element (null or an element)". A back-reference only; the
    /// owner's attribute list decides membership.
    pub owner_element: Option<NodeId>,
    /// Always true; kept for API shape.
    pub specified: bool,
}

/// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTypeData {
    /// "Doctypes have an associated name"
    pub name: String,
    /// "public ID" (unquoted, empty when absent)
    pub public_id: String,
    /// "system ID" (unquoted, empty when absent)
    pub system_id: String,
    /// Raw text between `[` and `]`, empty when absent.
    pub internal_subset: String,
}

/// [§ 4.13 Interface ProcessingInstruction](https://dom.spec.whatwg.org/#interface-processinginstruction)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstructionData {
    /// "ProcessingInstruction nodes have an associated target."
    pub target: String,
    /// The instruction content.
    pub data: String,
}

/// "Each node has an associated node type"
///
/// The closed set of node kinds. Shared behavior dispatches on this enum.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    DocumentType(DocumentTypeData),
    /// [§ 4.7 Interface DocumentFragment](https://dom.spec.whatwg.org/#interface-documentfragment)
    DocumentFragment,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.9.2 Interface Attr](https://dom.spec.whatwg.org/#interface-attr)
    Attr(AttrData),
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.12 Interface CDATASection](https://dom.spec.whatwg.org/#interface-cdatasection)
    CDataSection(String),
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
    /// [§ 4.13 Interface ProcessingInstruction](https://dom.spec.whatwg.org/#interface-processinginstruction)
    ProcessingInstruction(ProcessingInstructionData),
}

impl NodeType {
    /// The legacy numeric `nodeType` code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        use node_type_code::{
            ATTRIBUTE_NODE, CDATA_SECTION_NODE, COMMENT_NODE, DOCUMENT_FRAGMENT_NODE,
            DOCUMENT_NODE, DOCUMENT_TYPE_NODE, ELEMENT_NODE, PROCESSING_INSTRUCTION_NODE,
            TEXT_NODE,
        };
        match self {
            Self::Document => DOCUMENT_NODE,
            Self::DocumentType(_) => DOCUMENT_TYPE_NODE,
            Self::DocumentFragment => DOCUMENT_FRAGMENT_NODE,
            Self::Element(_) => ELEMENT_NODE,
            Self::Attr(_) => ATTRIBUTE_NODE,
            Self::Text(_) => TEXT_NODE,
            Self::CDataSection(_) => CDATA_SECTION_NODE,
            Self::Comment(_) => COMMENT_NODE,
            Self::ProcessingInstruction(_) => PROCESSING_INSTRUCTION_NODE,
        }
    }

    /// [§ 4.10 Interface CharacterData](https://dom.spec.whatwg.org/#interface-characterdata)
    /// data of Text, CDATASection, Comment and ProcessingInstruction nodes.
    #[must_use]
    pub fn character_data(&self) -> Option<&str> {
        match self {
            Self::Text(data) | Self::CDataSection(data) | Self::Comment(data) => Some(data),
            Self::ProcessingInstruction(pi) => Some(&pi.data),
            _ => None,
        }
    }

    pub(crate) fn character_data_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Text(data) | Self::CDataSection(data) | Self::Comment(data) => Some(data),
            Self::ProcessingInstruction(pi) => Some(&mut pi.data),
            _ => None,
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "An object that participates in a tree has a parent, which is either
/// null or an object, and has children, which is an ordered set of objects."
///
/// The children list and the sibling links are kept consistent by the
/// mutation methods on [`Document`](crate::Document).
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.2](https://dom.spec.whatwg.org/#concept-tree-parent)
    pub parent: Option<NodeId>,

    /// [§ 4.2](https://dom.spec.whatwg.org/#concept-tree-child)
    pub children: Vec<NodeId>,

    /// [§ 4.2](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.2](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,

    /// Where the node was found in the parsed source, if tracked.
    pub location: Option<SourceLocation>,
}

impl Node {
    pub(crate) const fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            location: None,
        }
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-nodename)
    #[must_use]
    pub fn node_name(&self) -> String {
        match &self.node_type {
            NodeType::Document => "#document".to_string(),
            NodeType::DocumentType(doctype) => doctype.name.clone(),
            NodeType::DocumentFragment => "#document-fragment".to_string(),
            NodeType::Element(element) => element.tag_name(),
            NodeType::Attr(attr) => attr.name.qualified(),
            NodeType::Text(_) => "#text".to_string(),
            NodeType::CDataSection(_) => "#cdata-section".to_string(),
            NodeType::Comment(_) => "#comment".to_string(),
            NodeType::ProcessingInstruction(pi) => pi.target.clone(),
        }
    }

    /// [§ 4.4](https://dom.spec.whatwg.org/#dom-node-nodevalue)
    ///
    /// Attr value, character data or PI data; `None` for other kinds.
    #[must_use]
    pub fn node_value(&self) -> Option<&str> {
        match &self.node_type {
            NodeType::Attr(attr) => Some(&attr.value),
            NodeType::Text(data) | NodeType::CDataSection(data) | NodeType::Comment(data) => {
                Some(data)
            }
            NodeType::ProcessingInstruction(pi) => Some(&pi.data),
            _ => None,
        }
    }

    /// The qualified name of an element or attribute.
    #[must_use]
    pub const fn qualified_name(&self) -> Option<&QualifiedName> {
        match &self.node_type {
            NodeType::Element(element) => Some(&element.name),
            NodeType::Attr(attr) => Some(&attr.name),
            _ => None,
        }
    }

    /// `localName`: only elements and attributes have one.
    #[must_use]
    pub fn local_name(&self) -> Option<&str> {
        self.qualified_name().map(|name| name.local_name.as_str())
    }

    /// `namespaceURI`
    #[must_use]
    pub fn namespace_uri(&self) -> Option<&str> {
        self.qualified_name()
            .and_then(|name| name.namespace_uri.as_deref())
    }

    /// `prefix`
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.qualified_name().and_then(|name| name.prefix.as_deref())
    }

    /// Returns true for element nodes.
    #[must_use]
    pub const fn is_element(&self) -> bool {
        matches!(self.node_type, NodeType::Element(_))
    }

    /// Returns true for Text nodes (not CDATA sections).
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.node_type, NodeType::Text(_))
    }

    /// Returns true for doctype nodes.
    #[must_use]
    pub const fn is_doctype(&self) -> bool {
        matches!(self.node_type, NodeType::DocumentType(_))
    }
}
