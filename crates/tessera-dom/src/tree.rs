//! [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
//!
//! Child-list mutation with the pre-insertion validity checks, plus the
//! Node methods that are defined in terms of them (`textContent`,
//! `normalize`).

use crate::exception::DomException;
use crate::node::{NodeId, NodeType};
use crate::Document;

/// Coarse node kind used by the validity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Document,
    DocumentType,
    Fragment,
    Element,
    Attr,
    Text,
    Other,
}

impl Document {
    fn kind_of(&self, id: NodeId) -> Result<Kind, DomException> {
        Ok(match self.node(id)?.node_type {
            NodeType::Document => Kind::Document,
            NodeType::DocumentType(_) => Kind::DocumentType,
            NodeType::DocumentFragment => Kind::Fragment,
            NodeType::Element(_) => Kind::Element,
            NodeType::Attr(_) => Kind::Attr,
            NodeType::Text(_) => Kind::Text,
            NodeType::CDataSection(_) | NodeType::Comment(_) | NodeType::ProcessingInstruction(_) => {
                Kind::Other
            }
        })
    }

    /// [§ 4.2.3 ensure pre-insertion validity](https://dom.spec.whatwg.org/#concept-node-ensure-pre-insertion-validity)
    ///
    /// `child` is the reference child for an insertion, or the node being
    /// replaced when `replacing` is set.
    fn ensure_validity(
        &self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
        replacing: bool,
    ) -> Result<(), DomException> {
        // STEP 1: "If parent is not a Document, DocumentFragment, or Element
        //         node, then throw a "HierarchyRequestError" DOMException."
        let parent_kind = self.kind_of(parent)?;
        if !matches!(parent_kind, Kind::Document | Kind::Fragment | Kind::Element) {
            return Err(DomException::hierarchy(
                "parent must be a document, document fragment or element",
            ));
        }

        // STEP 2: "If node is a host-including inclusive ancestor of parent,
        //         then throw a "HierarchyRequestError" DOMException."
        if node == parent || self.is_descendant_of(parent, node) {
            return Err(DomException::hierarchy(
                "the new child is an ancestor of the parent",
            ));
        }

        // STEP 3: "If child is non-null and its parent is not parent, then
        //         throw a "NotFoundError" DOMException."
        if let Some(child) = child
            && self.parent(child) != Some(parent)
        {
            return Err(DomException::not_found("child is not a child of parent"));
        }

        // STEP 4: "If node is not a DocumentFragment, DocumentType, Element,
        //         or CharacterData node, then throw a "HierarchyRequestError"."
        let node_kind = self.kind_of(node)?;
        if matches!(node_kind, Kind::Document | Kind::Attr) {
            return Err(DomException::hierarchy(format!(
                "{} nodes cannot be inserted",
                self.node(node)?.node_name()
            )));
        }

        // STEP 5: "If ... node is a doctype and parent is not a document, then
        //         throw a "HierarchyRequestError"."
        // Text directly under a document is allowed: the parser keeps
        // whitespace outside the root element.
        if node_kind == Kind::DocumentType && parent_kind != Kind::Document {
            return Err(DomException::hierarchy(
                "a doctype can only be inserted into a document",
            ));
        }

        // STEP 6: "If parent is a document, and any of the statements below,
        //         switched on the interface node implements, are true, then
        //         throw a "HierarchyRequestError"."
        if parent_kind == Kind::Document {
            let excluded = if replacing { child } else { None };
            match node_kind {
                Kind::Fragment => {
                    let children = self.children(node);
                    let elements = children
                        .iter()
                        .filter(|&&c| self.kind_of(c).ok() == Some(Kind::Element))
                        .count();
                    let has_text = children
                        .iter()
                        .any(|&c| self.kind_of(c).ok() == Some(Kind::Text));
                    if elements > 1 || has_text {
                        return Err(DomException::hierarchy(
                            "a document can only contain one element and no text from a fragment",
                        ));
                    }
                    if elements == 1 {
                        self.ensure_element_fits(parent, child, excluded, replacing)?;
                    }
                }
                Kind::Element => self.ensure_element_fits(parent, child, excluded, replacing)?,
                Kind::DocumentType => {
                    if self.children(parent).iter().any(|&c| {
                        Some(c) != excluded && self.kind_of(c).ok() == Some(Kind::DocumentType)
                    }) {
                        return Err(DomException::hierarchy("the document already has a doctype"));
                    }
                    let element_before = match child {
                        Some(child) => self
                            .preceding_siblings(child)
                            .any(|c| self.kind_of(c).ok() == Some(Kind::Element)),
                        None => self
                            .children(parent)
                            .iter()
                            .any(|&c| self.kind_of(c).ok() == Some(Kind::Element)),
                    };
                    if element_before {
                        return Err(DomException::hierarchy(
                            "a doctype cannot follow the document element",
                        ));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The element (or single-element fragment) case of STEP 6.
    fn ensure_element_fits(
        &self,
        parent: NodeId,
        child: Option<NodeId>,
        excluded: Option<NodeId>,
        replacing: bool,
    ) -> Result<(), DomException> {
        if self
            .children(parent)
            .iter()
            .any(|&c| Some(c) != excluded && self.kind_of(c).ok() == Some(Kind::Element))
        {
            return Err(DomException::hierarchy(
                "the document already has a document element",
            ));
        }
        if let Some(child) = child {
            if !replacing && self.kind_of(child)? == Kind::DocumentType {
                return Err(DomException::hierarchy(
                    "the document element cannot precede the doctype",
                ));
            }
            let mut following = self.next_sibling(child);
            while let Some(sibling) = following {
                if self.kind_of(sibling)? == Kind::DocumentType {
                    return Err(DomException::hierarchy(
                        "the document element cannot precede the doctype",
                    ));
                }
                following = self.next_sibling(sibling);
            }
        }
        Ok(())
    }

    /// Unlink `id` from its parent, if any. Does not bump the version.
    fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        let Some(parent) = parent else {
            return;
        };
        if let Some(prev) = prev.and_then(|p| self.get_mut(p)) {
            prev.next_sibling = next;
        }
        if let Some(next) = next.and_then(|n| self.get_mut(n)) {
            next.prev_sibling = prev;
        }
        if let Some(parent) = self.get_mut(parent) {
            parent.children.retain(|&c| c != id);
        }
        if let Some(node) = self.get_mut(id) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
    }

    /// Splice an already-detached `node` into `parent` before `reference`
    /// (or at the end).
    fn link_before(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        let children = self.children(parent);
        let index = reference
            .and_then(|r| children.iter().position(|&c| c == r))
            .unwrap_or(children.len());
        let prev = index.checked_sub(1).map(|i| children[i]);
        let next = children.get(index).copied();

        if let Some(parent_node) = self.get_mut(parent) {
            parent_node.children.insert(index, node);
        }
        if let Some(prev) = prev.and_then(|p| self.get_mut(p)) {
            prev.next_sibling = Some(node);
        }
        if let Some(next) = next.and_then(|n| self.get_mut(n)) {
            next.prev_sibling = Some(node);
        }
        if let Some(node) = self.get_mut(node) {
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
    }

    /// [§ 4.2.3 insert](https://dom.spec.whatwg.org/#concept-node-insert)
    ///
    /// Fragments are replaced by their children; `node` is removed from its
    /// current parent first.
    fn insert_unchecked(&mut self, parent: NodeId, node: NodeId, reference: Option<NodeId>) {
        let nodes = if matches!(
            self.get(node).map(|n| &n.node_type),
            Some(NodeType::DocumentFragment)
        ) {
            self.children(node).to_vec()
        } else {
            vec![node]
        };
        for id in nodes {
            self.detach(id);
            self.link_before(parent, id, reference);
        }
        self.bump_version();
    }

    /// [§ 4.4 insertBefore](https://dom.spec.whatwg.org/#dom-node-insertbefore)
    ///
    /// Returns the inserted node.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Result<NodeId, DomException> {
        self.ensure_validity(parent, node, child, false)?;
        // "If referenceChild is node, then set referenceChild to node's next sibling."
        let reference = match child {
            Some(c) if c == node => self.next_sibling(node),
            other => other,
        };
        self.insert_unchecked(parent, node, reference);
        Ok(node)
    }

    /// [§ 4.4 appendChild](https://dom.spec.whatwg.org/#dom-node-appendchild)
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<NodeId, DomException> {
        self.insert_before(parent, node, None)
    }

    /// [§ 4.4 removeChild](https://dom.spec.whatwg.org/#dom-node-removechild)
    ///
    /// "If child's parent is not parent, then throw a "NotFoundError" DOMException."
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomException> {
        if self.parent(child) != Some(parent) {
            return Err(DomException::not_found("child is not a child of parent"));
        }
        self.detach(child);
        self.bump_version();
        Ok(child)
    }

    /// [§ 4.2.8 remove](https://dom.spec.whatwg.org/#dom-childnode-remove)
    ///
    /// Detach `id` from its parent; a no-op for parentless nodes.
    pub fn remove(&mut self, id: NodeId) {
        if self.parent(id).is_some() {
            self.detach(id);
            self.bump_version();
        }
    }

    /// [§ 4.4 replaceChild](https://dom.spec.whatwg.org/#dom-node-replacechild)
    ///
    /// Returns the replaced child.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: NodeId,
    ) -> Result<NodeId, DomException> {
        self.ensure_validity(parent, node, Some(child), true)?;
        if node == child {
            return Ok(child);
        }
        // "Let referenceChild be child's next sibling. If referenceChild is
        // node, then set referenceChild to node's next sibling."
        let mut reference = self.next_sibling(child);
        if reference == Some(node) {
            reference = self.next_sibling(node);
        }
        self.detach(child);
        self.insert_unchecked(parent, node, reference);
        Ok(child)
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// `None` for documents and doctypes; the concatenated Text and CDATA
    /// descendants for elements and fragments.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        let node = self.get(id)?;
        match &node.node_type {
            NodeType::Document | NodeType::DocumentType(_) => None,
            NodeType::Element(_) | NodeType::DocumentFragment => Some(
                self.descendants(id)
                    .filter_map(|d| match &self.get(d)?.node_type {
                        NodeType::Text(s) | NodeType::CDataSection(s) => Some(s.as_str()),
                        _ => None,
                    })
                    .collect(),
            ),
            NodeType::Attr(attr) => Some(attr.value.clone()),
            other => other.character_data().map(str::to_string),
        }
    }

    /// [§ 4.4 textContent setter](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// Elements and fragments have all children replaced by a single Text
    /// node (none for the empty string).
    pub fn set_text_content(&mut self, id: NodeId, value: &str) -> Result<(), DomException> {
        match self.node(id)?.node_type {
            NodeType::Document | NodeType::DocumentType(_) => Ok(()),
            NodeType::Element(_) | NodeType::DocumentFragment => {
                for child in self.children(id).to_vec() {
                    self.detach(child);
                }
                if !value.is_empty() {
                    let text = self.create_text_node(value);
                    self.link_before(id, text, None);
                }
                self.bump_version();
                Ok(())
            }
            NodeType::Attr(_) => self.set_attr_value(id, value),
            _ => self.set_data(id, value),
        }
    }

    /// [§ 4.4 nodeValue setter](https://dom.spec.whatwg.org/#dom-node-nodevalue)
    pub fn set_node_value(&mut self, id: NodeId, value: &str) -> Result<(), DomException> {
        match self.node(id)?.node_type {
            NodeType::Attr(_) => self.set_attr_value(id, value),
            NodeType::Text(_)
            | NodeType::CDataSection(_)
            | NodeType::Comment(_)
            | NodeType::ProcessingInstruction(_) => self.set_data(id, value),
            _ => Ok(()),
        }
    }

    /// [§ 4.4 normalize](https://dom.spec.whatwg.org/#dom-node-normalize)
    ///
    /// "The normalize() method steps are to run these steps for each
    /// descendant exclusive Text node node of this"
    pub fn normalize(&mut self, id: NodeId) {
        let texts: Vec<NodeId> = self
            .descendants(id)
            .filter(|&d| self.get(d).is_some_and(crate::Node::is_text))
            .collect();
        let mut changed = false;
        for text in texts {
            // Already merged into a previous sibling.
            if self.parent(text).is_none() {
                continue;
            }
            if self.as_text(text).is_some_and(str::is_empty) {
                self.detach(text);
                changed = true;
                continue;
            }
            while let Some(next) = self.next_sibling(text)
                && let Some(data) = self.as_text(next).map(str::to_string)
            {
                if let Some(target) = self
                    .get_mut(text)
                    .and_then(|n| n.node_type.character_data_mut())
                {
                    target.push_str(&data);
                }
                self.detach(next);
                changed = true;
            }
        }
        if changed {
            self.bump_version();
        }
    }

    /// [§ 4.4 isSameNode](https://dom.spec.whatwg.org/#dom-node-issamenode)
    #[must_use]
    pub fn is_same_node(&self, id: NodeId, other: Option<NodeId>) -> bool {
        other == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, MimeType};

    #[test]
    fn sibling_links_stay_consistent() {
        let mut doc = Document::new(MimeType::XmlText);
        let root = doc.create_element("r").unwrap();
        let _ = doc.append_child(doc.root(), root).unwrap();
        let a = doc.create_text_node("a");
        let b = doc.create_text_node("b");
        let c = doc.create_text_node("c");
        let _ = doc.append_child(root, a).unwrap();
        let _ = doc.append_child(root, c).unwrap();
        let _ = doc.insert_before(root, b, Some(c)).unwrap();

        assert_eq!(doc.children(root), &[a, b, c]);
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.prev_sibling(c), Some(b));

        let _ = doc.remove_child(root, b).unwrap();
        assert_eq!(doc.next_sibling(a), Some(c));
        assert_eq!(doc.prev_sibling(c), Some(a));
        assert_eq!(doc.parent(b), None);
    }

    #[test]
    fn normalize_merges_adjacent_text() {
        let mut doc = Document::new(MimeType::XmlText);
        let root = doc.create_element("r").unwrap();
        let _ = doc.append_child(doc.root(), root).unwrap();
        for data in ["a", "", "b", "c"] {
            let t = doc.create_text_node(data);
            let _ = doc.append_child(root, t).unwrap();
        }
        doc.normalize(root);
        assert_eq!(doc.children(root).len(), 1);
        assert_eq!(doc.text_content(root).as_deref(), Some("abc"));
    }

    #[test]
    fn removed_nodes_keep_their_slot() {
        let mut doc = Document::new(MimeType::XmlText);
        let root = doc.create_element("r").unwrap();
        let _ = doc.append_child(doc.root(), root).unwrap();
        let child = doc.create_element("c").unwrap();
        let _ = doc.append_child(root, child).unwrap();
        let allocated = doc.len();

        let _ = doc.remove_child(root, child).unwrap();
        assert_eq!(doc.len(), allocated);
        let _ = doc.append_child(root, child).unwrap();
        assert_eq!(doc.children(root), &[child]);

        let _ = doc.remove_child(root, child).unwrap();
        let compact = doc.clone_document(true).unwrap();
        assert_eq!(compact.len(), 2);
    }
}
