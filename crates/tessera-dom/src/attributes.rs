//! [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
//! attribute methods and the [§ 4.9.1 NamedNodeMap](https://dom.spec.whatwg.org/#interface-namednodemap)
//! view.
//!
//! Attributes in the XMLNS namespace are namespace declarations: adding,
//! changing or removing one updates the owner element's namespace map, so
//! later prefix lookups see the tree as it is now.

use std::collections::HashSet;

use crate::exception::{DomException, DomExceptionName};
use crate::name::is_valid_name;
use crate::namespace::{self, validate_and_extract};
use crate::node::{NodeId, QualifiedName};
use crate::Document;

/// The prefix an attribute declares, when it is a namespace declaration.
/// `xmlns` declares the default namespace (the empty prefix).
fn declared_prefix(name: &QualifiedName) -> Option<&str> {
    if name.namespace_uri.as_deref() != Some(namespace::XMLNS) {
        return None;
    }
    match name.prefix.as_deref() {
        Some("xmlns") => Some(&name.local_name),
        None if name.local_name == "xmlns" => Some(""),
        _ => None,
    }
}

impl Document {
    /// "If this is in the HTML namespace and its node document is an HTML
    /// document, then set qualifiedName to qualifiedName in ASCII lowercase."
    fn attribute_name_for(&self, element: NodeId, qualified_name: &str) -> String {
        let html_element = self
            .get(element)
            .and_then(crate::Node::namespace_uri)
            .is_some_and(|ns| ns == namespace::HTML);
        if self.is_html() && html_element {
            qualified_name.to_ascii_lowercase()
        } else {
            qualified_name.to_string()
        }
    }

    fn element_data(&self, element: NodeId) -> Result<&crate::ElementData, DomException> {
        self.as_element(element).ok_or_else(|| {
            DomException::new(
                DomExceptionName::InvalidNodeTypeError,
                format!("node {} is not an element", element.0),
            )
        })
    }

    /// The attribute node ids of `element` in order; empty for non-elements.
    #[must_use]
    pub fn attribute_nodes(&self, element: NodeId) -> &[NodeId] {
        self.as_element(element)
            .map_or(&[], |e| e.attributes.as_slice())
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-attributes)
    #[must_use]
    pub const fn attributes(&self, element: NodeId) -> NamedNodeMap<'_> {
        NamedNodeMap { doc: self, element }
    }

    /// [§ 4.9](https://dom.spec.whatwg.org/#dom-element-hasattributes)
    #[must_use]
    pub fn has_attributes(&self, element: NodeId) -> bool {
        !self.attribute_nodes(element).is_empty()
    }

    /// [§ 4.9 getAttributeNode](https://dom.spec.whatwg.org/#dom-element-getattributenode)
    ///
    /// "get an attribute by name": the first attribute whose qualified name
    /// is `qualified_name`.
    #[must_use]
    pub fn get_attribute_node(&self, element: NodeId, qualified_name: &str) -> Option<NodeId> {
        let name = self.attribute_name_for(element, qualified_name);
        self.attribute_nodes(element)
            .iter()
            .copied()
            .find(|&a| self.as_attr(a).is_some_and(|attr| attr.name.qualified() == name))
    }

    /// [§ 4.9 getAttributeNodeNS](https://dom.spec.whatwg.org/#dom-element-getattributenodens)
    #[must_use]
    pub fn get_attribute_node_ns(
        &self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<NodeId> {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        self.attribute_nodes(element).iter().copied().find(|&a| {
            self.as_attr(a).is_some_and(|attr| {
                attr.name.namespace_uri.as_deref() == namespace && attr.name.local_name == local_name
            })
        })
    }

    /// [§ 4.9 getAttribute](https://dom.spec.whatwg.org/#dom-element-getattribute)
    #[must_use]
    pub fn get_attribute(&self, element: NodeId, qualified_name: &str) -> Option<String> {
        self.get_attribute_node(element, qualified_name)
            .and_then(|a| self.as_attr(a))
            .map(|attr| attr.value.clone())
    }

    /// [§ 4.9 getAttributeNS](https://dom.spec.whatwg.org/#dom-element-getattributens)
    #[must_use]
    pub fn get_attribute_ns(
        &self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<String> {
        self.get_attribute_node_ns(element, namespace, local_name)
            .and_then(|a| self.as_attr(a))
            .map(|attr| attr.value.clone())
    }

    /// [§ 4.9 hasAttribute](https://dom.spec.whatwg.org/#dom-element-hasattribute)
    #[must_use]
    pub fn has_attribute(&self, element: NodeId, qualified_name: &str) -> bool {
        self.get_attribute_node(element, qualified_name).is_some()
    }

    /// [§ 4.9 hasAttributeNS](https://dom.spec.whatwg.org/#dom-element-hasattributens)
    #[must_use]
    pub fn has_attribute_ns(
        &self,
        element: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> bool {
        self.get_attribute_node_ns(element, namespace, local_name)
            .is_some()
    }

    /// [§ 4.9 getAttributeNames](https://dom.spec.whatwg.org/#dom-element-getattributenames)
    #[must_use]
    pub fn get_attribute_names(&self, element: NodeId) -> Vec<String> {
        self.attribute_nodes(element)
            .iter()
            .filter_map(|&a| self.as_attr(a))
            .map(|attr| attr.name.qualified())
            .collect()
    }

    /// [§ 4.9 setAttribute](https://dom.spec.whatwg.org/#dom-element-setattribute)
    pub fn set_attribute(
        &mut self,
        element: NodeId,
        qualified_name: &str,
        value: &str,
    ) -> Result<(), DomException> {
        let _ = self.element_data(element)?;
        // STEP 1: "If qualifiedName is not a valid attribute local name, then
        //         throw an "InvalidCharacterError" DOMException."
        if !is_valid_name(qualified_name) {
            return Err(DomException::invalid_character(format!(
                "invalid attribute name: \"{qualified_name}\""
            )));
        }
        let name = self.attribute_name_for(element, qualified_name);
        match self.get_attribute_node(element, &name) {
            Some(existing) => self.set_attr_value(existing, value),
            None => {
                let attr = self.alloc_attr(QualifiedName::new(None, None, &name), value);
                self.append_attribute(element, attr);
                Ok(())
            }
        }
    }

    /// [§ 4.9 setAttributeNS](https://dom.spec.whatwg.org/#dom-element-setattributens)
    pub fn set_attribute_ns(
        &mut self,
        element: NodeId,
        namespace: Option<&str>,
        qualified_name: &str,
        value: &str,
    ) -> Result<(), DomException> {
        let _ = self.element_data(element)?;
        let name = validate_and_extract(namespace, qualified_name)?;
        match self.get_attribute_node_ns(element, name.namespace_uri.as_deref(), &name.local_name) {
            Some(existing) => self.set_attr_value(existing, value),
            None => {
                let attr = self.alloc_attr(name, value);
                self.append_attribute(element, attr);
                Ok(())
            }
        }
    }

    /// [§ 4.9 removeAttribute](https://dom.spec.whatwg.org/#dom-element-removeattribute)
    pub fn remove_attribute(&mut self, element: NodeId, qualified_name: &str) {
        if let Some(attr) = self.get_attribute_node(element, qualified_name) {
            self.detach_attribute(element, attr);
        }
    }

    /// [§ 4.9 removeAttributeNS](https://dom.spec.whatwg.org/#dom-element-removeattributens)
    pub fn remove_attribute_ns(&mut self, element: NodeId, namespace: Option<&str>, local_name: &str) {
        if let Some(attr) = self.get_attribute_node_ns(element, namespace, local_name) {
            self.detach_attribute(element, attr);
        }
    }

    /// [§ 4.9 toggleAttribute](https://dom.spec.whatwg.org/#dom-element-toggleattribute)
    ///
    /// Returns whether the attribute is present afterwards.
    pub fn toggle_attribute(
        &mut self,
        element: NodeId,
        qualified_name: &str,
        force: Option<bool>,
    ) -> Result<bool, DomException> {
        match (self.has_attribute(element, qualified_name), force) {
            (true, Some(true)) | (false, Some(false)) => Ok(force == Some(true)),
            (true, _) => {
                self.remove_attribute(element, qualified_name);
                Ok(false)
            }
            (false, _) => {
                self.set_attribute(element, qualified_name, "")?;
                Ok(true)
            }
        }
    }

    /// [§ 4.9 setAttributeNode](https://dom.spec.whatwg.org/#dom-element-setattributenode)
    ///
    /// Returns the attribute `attr` replaced, if any.
    pub fn set_attribute_node(
        &mut self,
        element: NodeId,
        attr: NodeId,
    ) -> Result<Option<NodeId>, DomException> {
        let _ = self.element_data(element)?;
        let data = self.as_attr(attr).ok_or_else(|| {
            DomException::hierarchy(format!("node {} is not an attribute", attr.0))
        })?;

        // STEP 1: "If attr's element is neither null nor element, throw an
        //         "InUseAttributeError" DOMException."
        match data.owner_element {
            Some(owner) if owner == element => return Ok(Some(attr)),
            Some(_) => {
                return Err(DomException::new(
                    DomExceptionName::InUseAttributeError,
                    "attribute is in use by another element",
                ));
            }
            None => {}
        }

        // STEP 2: "Let oldAttr be the result of getting an attribute given
        //         attr's namespace, attr's local name, and element."
        let namespace_uri = data.name.namespace_uri.clone();
        let local_name = data.name.local_name.clone();
        let old = self.get_attribute_node_ns(element, namespace_uri.as_deref(), &local_name);

        match old {
            // STEP 4: "If oldAttr is non-null, then replace oldAttr with attr."
            Some(old) => {
                self.unregister_declaration(element, old);
                if let Some(e) = self.as_element_mut(element)
                    && let Some(slot) = e.attributes.iter_mut().find(|a| **a == old)
                {
                    *slot = attr;
                }
                if let Some(old_data) = self.as_attr_mut(old) {
                    old_data.owner_element = None;
                }
                self.adopt_attribute(element, attr);
            }
            // STEP 5: "Otherwise, append attr to element."
            None => self.append_attribute(element, attr),
        }
        Ok(old)
    }

    /// [§ 4.9 setAttributeNodeNS](https://dom.spec.whatwg.org/#dom-element-setattributenodens)
    pub fn set_attribute_node_ns(
        &mut self,
        element: NodeId,
        attr: NodeId,
    ) -> Result<Option<NodeId>, DomException> {
        self.set_attribute_node(element, attr)
    }

    /// [§ 4.9 removeAttributeNode](https://dom.spec.whatwg.org/#dom-element-removeattributenode)
    pub fn remove_attribute_node(
        &mut self,
        element: NodeId,
        attr: NodeId,
    ) -> Result<NodeId, DomException> {
        if !self.attribute_nodes(element).contains(&attr) {
            return Err(DomException::not_found(
                "attribute is not an attribute of this element",
            ));
        }
        self.detach_attribute(element, attr);
        Ok(attr)
    }

    /// [§ 4.9.2](https://dom.spec.whatwg.org/#dom-attr-value) value setter.
    pub fn set_attr_value(&mut self, attr: NodeId, value: &str) -> Result<(), DomException> {
        let data = self
            .as_attr_mut(attr)
            .ok_or_else(|| DomException::not_found(format!("node {} is not an attribute", attr.0)))?;
        data.value = value.to_string();
        let owner = data.owner_element;
        if let Some(owner) = owner {
            self.register_declaration(owner, attr);
        }
        self.bump_version();
        Ok(())
    }

    /// [§ 4.9.2](https://dom.spec.whatwg.org/#dom-attr-ownerelement)
    #[must_use]
    pub fn owner_element(&self, attr: NodeId) -> Option<NodeId> {
        self.as_attr(attr).and_then(|a| a.owner_element)
    }

    /// "To append an attribute attribute to an element element"
    fn append_attribute(&mut self, element: NodeId, attr: NodeId) {
        if let Some(e) = self.as_element_mut(element) {
            e.attributes.push(attr);
        }
        self.adopt_attribute(element, attr);
    }

    fn adopt_attribute(&mut self, element: NodeId, attr: NodeId) {
        if let Some(data) = self.as_attr_mut(attr) {
            data.owner_element = Some(element);
        }
        self.register_declaration(element, attr);
        self.bump_version();
    }

    /// "To remove an attribute attribute"
    fn detach_attribute(&mut self, element: NodeId, attr: NodeId) {
        self.unregister_declaration(element, attr);
        if let Some(e) = self.as_element_mut(element) {
            e.attributes.retain(|&a| a != attr);
        }
        if let Some(data) = self.as_attr_mut(attr) {
            data.owner_element = None;
        }
        self.bump_version();
    }

    fn register_declaration(&mut self, element: NodeId, attr: NodeId) {
        let Some(data) = self.as_attr(attr) else {
            return;
        };
        let Some(prefix) = declared_prefix(&data.name).map(str::to_string) else {
            return;
        };
        let uri = data.value.clone();
        if let Some(e) = self.as_element_mut(element) {
            let _ = e.ns_map.insert(prefix, uri);
        }
    }

    fn unregister_declaration(&mut self, element: NodeId, attr: NodeId) {
        let Some(prefix) = self
            .as_attr(attr)
            .and_then(|data| declared_prefix(&data.name))
            .map(str::to_string)
        else {
            return;
        };
        if let Some(e) = self.as_element_mut(element) {
            let _ = e.ns_map.remove(&prefix);
        }
    }

    /// The `id` attribute of an element.
    #[must_use]
    pub fn element_id(&self, element: NodeId) -> Option<String> {
        self.get_attribute(element, "id")
    }

    /// The class names of an element, as an ordered set.
    #[must_use]
    pub fn class_list(&self, element: NodeId) -> Vec<String> {
        let Some(class) = self.get_attribute(element, "class") else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        class
            .split_ascii_whitespace()
            .filter(|c| seen.insert(*c))
            .map(str::to_string)
            .collect()
    }
}

/// [§ 4.9.1 Interface NamedNodeMap](https://dom.spec.whatwg.org/#interface-namednodemap)
///
/// A read-only view over an element's attribute list. Mutate through the
/// element methods on [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct NamedNodeMap<'a> {
    doc: &'a Document,
    element: NodeId,
}

impl<'a> NamedNodeMap<'a> {
    /// "The length attribute's getter must return the attribute list's size."
    #[must_use]
    pub fn length(&self) -> usize {
        self.doc.attribute_nodes(self.element).len()
    }

    /// "return the indexth attribute in the attribute list"
    #[must_use]
    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.doc.attribute_nodes(self.element).get(index).copied()
    }

    /// [§ 4.9.1 getNamedItem](https://dom.spec.whatwg.org/#dom-namednodemap-getnameditem)
    #[must_use]
    pub fn get_named_item(&self, qualified_name: &str) -> Option<NodeId> {
        self.doc.get_attribute_node(self.element, qualified_name)
    }

    /// [§ 4.9.1 getNamedItemNS](https://dom.spec.whatwg.org/#dom-namednodemap-getnameditemns)
    #[must_use]
    pub fn get_named_item_ns(&self, namespace: Option<&str>, local_name: &str) -> Option<NodeId> {
        self.doc
            .get_attribute_node_ns(self.element, namespace, local_name)
    }

    /// Iterate attribute node ids in order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + 'a {
        self.doc.attribute_nodes(self.element).iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use crate::{namespace, Document, DomExceptionName, MimeType};

    #[test]
    fn xmlns_attributes_update_the_namespace_map() {
        let mut doc = Document::new(MimeType::XmlText);
        let root = doc.create_element("root").unwrap();
        let _ = doc.append_child(doc.root(), root).unwrap();
        doc.set_attribute_ns(root, Some(namespace::XMLNS), "xmlns:a", "urn:a")
            .unwrap();
        assert_eq!(doc.lookup_namespace_uri(root, Some("a")).as_deref(), Some("urn:a"));

        let attr = doc.get_attribute_node_ns(root, Some(namespace::XMLNS), "a").unwrap();
        doc.set_attr_value(attr, "urn:b").unwrap();
        assert_eq!(doc.lookup_namespace_uri(root, Some("a")).as_deref(), Some("urn:b"));

        doc.remove_attribute_ns(root, Some(namespace::XMLNS), "a");
        assert_eq!(doc.lookup_namespace_uri(root, Some("a")), None);
    }

    #[test]
    fn attribute_in_use_elsewhere() {
        let mut doc = Document::new(MimeType::XmlText);
        let a = doc.create_element("a").unwrap();
        let b = doc.create_element("b").unwrap();
        let attr = doc.create_attribute("x").unwrap();
        assert_eq!(doc.set_attribute_node(a, attr).unwrap(), None);
        let err = doc.set_attribute_node(b, attr).unwrap_err();
        assert_eq!(err.name, DomExceptionName::InUseAttributeError);
    }

    #[test]
    fn set_attribute_replaces_value_in_place() {
        let mut doc = Document::new(MimeType::XmlText);
        let a = doc.create_element("a").unwrap();
        doc.set_attribute(a, "x", "1").unwrap();
        doc.set_attribute(a, "y", "2").unwrap();
        doc.set_attribute(a, "x", "3").unwrap();
        assert_eq!(doc.get_attribute_names(a), vec!["x", "y"]);
        assert_eq!(doc.get_attribute(a, "x").as_deref(), Some("3"));
        assert_eq!(doc.attributes(a).length(), 2);
    }

    #[test]
    fn class_list_is_an_ordered_set() {
        let mut doc = Document::new(MimeType::XmlText);
        let a = doc.create_element("a").unwrap();
        doc.set_attribute(a, "class", " b a  b c").unwrap();
        assert_eq!(doc.class_list(a), vec!["b", "a", "c"]);
    }
}
