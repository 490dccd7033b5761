//! Namespaces: well-known URIs, per-element prefix maps, qualified name
//! validation and prefix/URI lookup.
//!
//! [§ 1.3 Namespaces](https://dom.spec.whatwg.org/#namespaces)

use crate::exception::DomException;
use crate::name::{is_valid_qname, split_qname};
use crate::node::{NodeId, NodeType, QualifiedName};
use crate::Document;

/// The HTML namespace.
pub const HTML: &str = "http://www.w3.org/1999/xhtml";
/// The SVG namespace.
pub const SVG: &str = "http://www.w3.org/2000/svg";
/// The MathML namespace.
pub const MATHML: &str = "http://www.w3.org/1998/Math/MathML";
/// The XML namespace, bound to the `xml` prefix.
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
/// The XMLNS namespace, used by namespace declaration attributes.
pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";

/// An insertion-ordered map from prefix to namespace URI.
///
/// The empty prefix is the default namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    entries: Vec<(String, String)>,
}

impl NamespaceMap {
    /// An empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The URI bound to `prefix`.
    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// Returns true when `prefix` has a binding in this map.
    #[must_use]
    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.entries.iter().any(|(p, _)| p == prefix)
    }

    /// Bind `prefix` to `uri`, returning the previous binding. An existing
    /// binding keeps its position.
    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Option<String> {
        let prefix = prefix.into();
        let uri = uri.into();
        if let Some(entry) = self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            return Some(std::mem::replace(&mut entry.1, uri));
        }
        self.entries.push((prefix, uri));
        None
    }

    /// Remove the binding for `prefix`.
    pub fn remove(&mut self, prefix: &str) -> Option<String> {
        let index = self.entries.iter().position(|(p, _)| p == prefix)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterate `(prefix, uri)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when there are no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Into<String>, U: Into<String>> FromIterator<(P, U)> for NamespaceMap {
    fn from_iter<T: IntoIterator<Item = (P, U)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (prefix, uri) in iter {
            let _ = map.insert(prefix, uri);
        }
        map
    }
}

/// [§ 1.3 validate and extract](https://dom.spec.whatwg.org/#validate-and-extract)
///
/// "To validate and extract a namespace and qualifiedName, run these steps"
pub fn validate_and_extract(
    namespace: Option<&str>,
    qualified_name: &str,
) -> Result<QualifiedName, DomException> {
    // STEP 1: "If namespace is the empty string, then set it to null."
    let namespace = namespace.filter(|ns| !ns.is_empty());

    // STEP 2: "Validate qualifiedName."
    if !is_valid_qname(qualified_name) {
        return Err(DomException::invalid_character(format!(
            "invalid qualified name: \"{qualified_name}\""
        )));
    }

    // STEP 3-5: split on the first ':'
    let (prefix, local_name) = split_qname(qualified_name);

    // STEP 6: "If prefix is non-null and namespace is null, then throw a "NamespaceError"."
    if prefix.is_some() && namespace.is_none() {
        return Err(DomException::namespace(format!(
            "prefix \"{}\" requires a namespace",
            prefix.unwrap_or_default()
        )));
    }
    // STEP 7: "If prefix is "xml" and namespace is not the XML namespace..."
    if prefix == Some("xml") && namespace != Some(XML) {
        return Err(DomException::namespace(
            "the xml prefix is bound to the XML namespace",
        ));
    }
    // STEP 8: "If either qualifiedName or prefix is "xmlns" and namespace is not the XMLNS namespace..."
    let is_xmlns_name = qualified_name == "xmlns" || prefix == Some("xmlns");
    if is_xmlns_name && namespace != Some(XMLNS) {
        return Err(DomException::namespace(
            "xmlns declarations must use the XMLNS namespace",
        ));
    }
    // STEP 9: "If namespace is the XMLNS namespace and neither qualifiedName nor prefix is "xmlns"..."
    if namespace == Some(XMLNS) && !is_xmlns_name {
        return Err(DomException::namespace(
            "the XMLNS namespace is reserved for xmlns declarations",
        ));
    }

    Ok(QualifiedName::new(namespace, prefix, local_name))
}

impl Document {
    /// The node namespace lookups continue from: the parent, or for an
    /// attribute its owner document.
    fn namespace_scope_parent(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        match node.node_type {
            NodeType::Attr(_) => (id != NodeId::ROOT).then_some(NodeId::ROOT),
            _ => node.parent,
        }
    }

    /// [§ 4.4 lookupNamespaceURI](https://dom.spec.whatwg.org/#dom-node-lookupnamespaceuri)
    ///
    /// Walks from `id` towards the root, consulting each element's own
    /// declarations. `None` or `Some("")` look up the default namespace.
    #[must_use]
    pub fn lookup_namespace_uri(&self, id: NodeId, prefix: Option<&str>) -> Option<String> {
        let prefix = prefix.unwrap_or("");
        let mut current = Some(id);
        while let Some(node_id) = current {
            if let Some(element) = self.as_element(node_id)
                && let Some(uri) = element.ns_map.get(prefix)
            {
                return Some(uri.to_string());
            }
            current = self.namespace_scope_parent(node_id);
        }
        None
    }

    /// [§ 4.4 lookupPrefix](https://dom.spec.whatwg.org/#dom-node-lookupprefix)
    ///
    /// The first prefix, nearest scope first, that is bound to `namespace`.
    /// The empty string means `namespace` is the default namespace there.
    #[must_use]
    pub fn lookup_prefix(&self, id: NodeId, namespace: Option<&str>) -> Option<String> {
        let namespace = namespace.filter(|ns| !ns.is_empty())?;
        let mut current = Some(id);
        while let Some(node_id) = current {
            if let Some(element) = self.as_element(node_id)
                && let Some((prefix, _)) = element.ns_map.iter().find(|(_, uri)| *uri == namespace)
            {
                return Some(prefix.to_string());
            }
            current = self.namespace_scope_parent(node_id);
        }
        None
    }

    /// [§ 4.4 isDefaultNamespace](https://dom.spec.whatwg.org/#dom-node-isdefaultnamespace)
    #[must_use]
    pub fn is_default_namespace(&self, id: NodeId, namespace: Option<&str>) -> bool {
        let namespace = namespace.filter(|ns| !ns.is_empty());
        self.lookup_namespace_uri(id, None).as_deref() == namespace
    }
}
