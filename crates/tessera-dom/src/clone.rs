//! [§ 4.4 cloneNode](https://dom.spec.whatwg.org/#dom-node-clonenode),
//! [importNode / adoptNode](https://dom.spec.whatwg.org/#dom-document-importnode)
//! and [isEqualNode](https://dom.spec.whatwg.org/#dom-node-isequalnode).
//!
//! A clone is first extracted into an owned [`Detached`] tree and then
//! materialized in the target arena, so cloning within a document and
//! importing from another use the same path.

use crate::exception::{DomException, DomExceptionName};
use crate::node::{AttrData, ElementData, NodeId, NodeType, SourceLocation};
use crate::Document;

/// An owned copy of a subtree, not yet allocated in any document.
#[derive(Debug, Clone)]
struct Detached {
    node_type: NodeType,
    location: Option<SourceLocation>,
    attributes: Vec<AttrData>,
    children: Vec<Detached>,
}

impl Document {
    /// [§ 4.4 clone a node](https://dom.spec.whatwg.org/#concept-node-clone)
    ///
    /// Attributes are always copied; children only when `deep`.
    fn extract(&self, id: NodeId, deep: bool) -> Result<Detached, DomException> {
        let node = self.node(id)?;
        let node_type = match &node.node_type {
            NodeType::Element(element) => {
                NodeType::Element(ElementData::new(element.name.clone()))
            }
            NodeType::Attr(attr) => NodeType::Attr(AttrData {
                owner_element: None,
                ..attr.clone()
            }),
            other => other.clone(),
        };
        let attributes = self
            .attribute_nodes(id)
            .iter()
            .filter_map(|&a| self.as_attr(a))
            .map(|attr| AttrData {
                owner_element: None,
                ..attr.clone()
            })
            .collect();
        let children = if deep {
            node.children
                .iter()
                .map(|&child| self.extract(child, true))
                .collect::<Result<_, _>>()?
        } else {
            Vec::new()
        };
        Ok(Detached {
            node_type,
            location: node.location,
            attributes,
            children,
        })
    }

    fn materialize(&mut self, detached: Detached) -> Result<NodeId, DomException> {
        let id = self.alloc(detached.node_type);
        if let Some(location) = detached.location {
            self.set_location(id, location);
        }
        for attr in detached.attributes {
            let attr_id = self.alloc(NodeType::Attr(attr));
            let _ = self.set_attribute_node(id, attr_id)?;
        }
        for child in detached.children {
            let child_id = self.materialize(child)?;
            let _ = self.append_child(id, child_id)?;
        }
        Ok(id)
    }

    /// [§ 4.4 cloneNode](https://dom.spec.whatwg.org/#dom-node-clonenode)
    ///
    /// Clone a node into this document, unattached. The document node itself
    /// is cloned with [`Document::clone_document`].
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> Result<NodeId, DomException> {
        if id == NodeId::ROOT {
            return Err(DomException::new(
                DomExceptionName::NotSupportedError,
                "clone the document node with clone_document",
            ));
        }
        let detached = self.extract(id, deep)?;
        self.materialize(detached)
    }

    /// [§ 4.4 cloneNode](https://dom.spec.whatwg.org/#dom-node-clonenode) on
    /// the document node: a new, independent document with the same content
    /// type and a fresh tie-break id.
    pub fn clone_document(&self, deep: bool) -> Result<Self, DomException> {
        let mut copy = Self::new(self.content_type());
        if deep {
            for &child in self.children(NodeId::ROOT) {
                let detached = self.extract(child, true)?;
                let id = copy.materialize(detached)?;
                let _ = copy.append_child(NodeId::ROOT, id)?;
            }
        }
        Ok(copy)
    }

    /// [§ 4.5 importNode](https://dom.spec.whatwg.org/#dom-document-importnode)
    ///
    /// "If node is a document or shadow root, then throw a "NotSupportedError"."
    pub fn import_node(
        &mut self,
        source: &Self,
        id: NodeId,
        deep: bool,
    ) -> Result<NodeId, DomException> {
        if id == NodeId::ROOT {
            return Err(DomException::new(
                DomExceptionName::NotSupportedError,
                "a document cannot be imported",
            ));
        }
        let detached = source.extract(id, deep)?;
        self.materialize(detached)
    }

    /// [§ 4.5 adoptNode](https://dom.spec.whatwg.org/#dom-document-adoptnode)
    /// within this document: detach `id` from its parent (or an attribute
    /// from its owner element) so it can be inserted elsewhere.
    pub fn adopt_node(&mut self, id: NodeId) -> Result<NodeId, DomException> {
        if id == NodeId::ROOT {
            return Err(DomException::new(
                DomExceptionName::NotSupportedError,
                "a document cannot be adopted",
            ));
        }
        if let Some(owner) = self.owner_element(id) {
            let _ = self.remove_attribute_node(owner, id)?;
        } else {
            self.remove(id);
        }
        Ok(id)
    }

    /// [§ 4.5 adoptNode](https://dom.spec.whatwg.org/#dom-document-adoptnode)
    /// from another document. Arenas are per document, so the subtree is
    /// moved by copying it here and removing it from `source`.
    pub fn adopt_node_from(&mut self, source: &mut Self, id: NodeId) -> Result<NodeId, DomException> {
        let adopted = self.import_node(source, id, true)?;
        let _ = source.adopt_node(id)?;
        Ok(adopted)
    }

    /// [§ 4.4 isEqualNode](https://dom.spec.whatwg.org/#dom-node-isequalnode)
    #[must_use]
    pub fn is_equal_node(&self, id: NodeId, other: NodeId) -> bool {
        nodes_equal(self, id, self, other)
    }

    /// [§ 4.4 isEqualNode](https://dom.spec.whatwg.org/#dom-node-isequalnode)
    /// against a node of another document.
    #[must_use]
    pub fn is_equal_node_in(&self, id: NodeId, other_doc: &Self, other: NodeId) -> bool {
        nodes_equal(self, id, other_doc, other)
    }
}

/// [§ 4.4 equals](https://dom.spec.whatwg.org/#concept-node-equals)
fn nodes_equal(da: &Document, a: NodeId, db: &Document, b: NodeId) -> bool {
    let (Some(na), Some(nb)) = (da.get(a), db.get(b)) else {
        return false;
    };
    let same_kind = match (&na.node_type, &nb.node_type) {
        (NodeType::Document, NodeType::Document)
        | (NodeType::DocumentFragment, NodeType::DocumentFragment) => true,
        (NodeType::DocumentType(x), NodeType::DocumentType(y)) => {
            x.name == y.name && x.public_id == y.public_id && x.system_id == y.system_id
        }
        (NodeType::Element(x), NodeType::Element(y)) => {
            x.name == y.name
                && x.attributes.len() == y.attributes.len()
                && x.attributes.iter().all(|&xa| {
                    y.attributes.iter().any(|&ya| nodes_equal(da, xa, db, ya))
                })
        }
        (NodeType::Attr(x), NodeType::Attr(y)) => x.name == y.name && x.value == y.value,
        (NodeType::ProcessingInstruction(x), NodeType::ProcessingInstruction(y)) => x == y,
        (NodeType::Text(x), NodeType::Text(y))
        | (NodeType::CDataSection(x), NodeType::CDataSection(y))
        | (NodeType::Comment(x), NodeType::Comment(y)) => x == y,
        _ => false,
    };
    same_kind
        && na.children.len() == nb.children.len()
        && na
            .children
            .iter()
            .zip(&nb.children)
            .all(|(&ca, &cb)| nodes_equal(da, ca, db, cb))
}
