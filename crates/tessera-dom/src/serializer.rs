//! [DOM Parsing § 3.2 XMLSerializer](https://w3c.github.io/DOM-Parsing/#the-xmlserializer-interface)
//!
//! Namespace declarations are re-derived while walking: each element sees
//! the declarations emitted by its ancestors (`visible`), and a new
//! `xmlns`/`xmlns:p` attribute is written only when the element or one of
//! its attributes uses a binding that is not visible yet.

use crate::html::{is_raw_text_element, is_void_element};
use crate::namespace;
use crate::node::{NodeId, NodeType};
use crate::Document;

/// What a [`NodeFilter`] wants done with a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Leave the node (and its subtree) out.
    Skip,
    /// Write this text verbatim instead of the node.
    Text(String),
    /// Serialize this node. Usually the node that was passed in.
    Node(NodeId),
}

/// A callback consulted before every node, attributes included.
pub trait NodeFilter {
    /// Decide how `node` is serialized.
    fn filter(&mut self, doc: &Document, node: NodeId) -> FilterOutcome;
}

impl<F> NodeFilter for F
where
    F: FnMut(&Document, NodeId) -> FilterOutcome,
{
    fn filter(&mut self, doc: &Document, node: NodeId) -> FilterOutcome {
        self(doc, node)
    }
}

/// A namespace binding in scope during serialization. `prefix` is `None`
/// only for the seed binding of the serialized root.
#[derive(Debug, Clone)]
struct Binding {
    prefix: Option<String>,
    namespace: String,
}

/// Escape character data: `<`, `&` and `>`.
#[must_use]
pub fn escape_text(data: &str) -> String {
    let mut out = String::with_capacity(data.len());
    for c in data.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value so that re-parsing gives the same value:
/// markup characters, the quote and the whitespace characters that
/// attribute value normalization would otherwise replace.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
    out
}

/// Quote a doctype literal, preferring `"`.
fn quote_literal(value: &str) -> String {
    if value.contains('"') {
        format!("'{value}'")
    } else {
        format!("\"{value}\"")
    }
}

/// `needNamespaceDefine`: whether `namespace` bound to `prefix` must be
/// declared on the current element.
fn needs_declaration(prefix: &str, namespace: Option<&str>, visible: &[Binding]) -> bool {
    // Never declare an empty namespace.
    let Some(namespace) = namespace.filter(|ns| !ns.is_empty()) else {
        return false;
    };
    if (prefix == "xml" && namespace == namespace::XML) || namespace == namespace::XMLNS {
        return false;
    }
    visible
        .iter()
        .rev()
        .find(|b| b.prefix.as_deref() == Some(prefix))
        .is_none_or(|b| b.namespace != namespace)
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attribute(value));
    out.push('"');
}

/// [DOM Parsing § 3.2](https://w3c.github.io/DOM-Parsing/#the-xmlserializer-interface)
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlSerializer;

impl XmlSerializer {
    /// "produces an XML serialization of root"
    #[must_use]
    pub fn serialize_to_string(&self, doc: &Document, node: NodeId) -> String {
        self.serialize(doc, node, None)
    }

    /// Serialize with `filter` consulted for every node.
    #[must_use]
    pub fn serialize_with_filter(
        &self,
        doc: &Document,
        node: NodeId,
        filter: &mut dyn NodeFilter,
    ) -> String {
        self.serialize(doc, node, Some(filter))
    }

    fn serialize(&self, doc: &Document, node: NodeId, filter: Option<&mut dyn NodeFilter>) -> String {
        // A root in a namespace without a prefix for it gets a seed binding,
        // so it is written unprefixed.
        let reference = if node == NodeId::ROOT {
            doc.document_element().unwrap_or(node)
        } else {
            node
        };
        let mut visible = Vec::new();
        if let Some(reference_node) = doc.get(reference)
            && let Some(uri) = reference_node.namespace_uri()
            && reference_node.prefix().is_none()
            && doc.lookup_prefix(reference, Some(uri)).is_none()
        {
            visible.push(Binding {
                prefix: None,
                namespace: uri.to_string(),
            });
        }

        let mut writer = Writer {
            doc,
            filter,
            out: String::new(),
        };
        writer.write_node(node, doc.is_html(), visible);
        writer.out
    }
}

struct Writer<'a, 'f> {
    doc: &'a Document,
    filter: Option<&'f mut dyn NodeFilter>,
    out: String,
}

impl Writer<'_, '_> {
    fn write_node(&mut self, node: NodeId, html: bool, mut visible: Vec<Binding>) {
        let node = match self.filter.as_mut() {
            Some(filter) => match filter.filter(self.doc, node) {
                FilterOutcome::Skip => return,
                FilterOutcome::Text(text) => {
                    self.out.push_str(&text);
                    return;
                }
                FilterOutcome::Node(replacement) => replacement,
            },
            None => node,
        };
        let doc = self.doc;
        let Some(data) = doc.get(node) else {
            return;
        };

        match &data.node_type {
            NodeType::Document | NodeType::DocumentFragment => {
                for &child in &data.children {
                    self.write_node(child, html, visible.clone());
                }
            }
            NodeType::Element(element) => {
                let html = html || data.namespace_uri() == Some(namespace::HTML);
                let node_name = element.tag_name();
                let prefixed_name = Self::prefixed_name(doc, node, html, &visible, &node_name);

                self.out.push('<');
                self.out.push_str(&prefixed_name);

                for &attr in &element.attributes {
                    let Some(attr_data) = doc.as_attr(attr) else {
                        continue;
                    };
                    match attr_data.name.prefix.as_deref() {
                        Some("xmlns") => visible.push(Binding {
                            prefix: Some(attr_data.name.local_name.clone()),
                            namespace: attr_data.value.clone(),
                        }),
                        None if attr_data.name.local_name == "xmlns" => visible.push(Binding {
                            prefix: Some(String::new()),
                            namespace: attr_data.value.clone(),
                        }),
                        _ => {}
                    }
                }

                for &attr in &element.attributes {
                    let Some(attr_data) = doc.as_attr(attr) else {
                        continue;
                    };
                    let prefix = attr_data.name.prefix.clone().unwrap_or_default();
                    let uri = attr_data.name.namespace_uri.as_deref();
                    if needs_declaration(&prefix, uri, &visible)
                        && let Some(uri) = uri
                    {
                        let declaration = if prefix.is_empty() {
                            "xmlns".to_string()
                        } else {
                            format!("xmlns:{prefix}")
                        };
                        push_attribute(&mut self.out, &declaration, uri);
                        visible.push(Binding {
                            prefix: Some(prefix),
                            namespace: uri.to_string(),
                        });
                    }
                    self.write_node(attr, html, visible.clone());
                }

                let prefix = data.prefix().unwrap_or_default().to_string();
                if node_name == prefixed_name
                    && needs_declaration(&prefix, data.namespace_uri(), &visible)
                    && let Some(uri) = data.namespace_uri()
                {
                    let declaration = if prefix.is_empty() {
                        "xmlns".to_string()
                    } else {
                        format!("xmlns:{prefix}")
                    };
                    push_attribute(&mut self.out, &declaration, uri);
                    visible.push(Binding {
                        prefix: Some(prefix),
                        namespace: uri.to_string(),
                    });
                }

                // In HTML only void elements may close immediately.
                let mut self_closing = data.children.is_empty();
                if self_closing && html {
                    self_closing = is_void_element(&node_name);
                }
                if self_closing {
                    self.out.push_str("/>");
                    return;
                }
                self.out.push('>');
                let raw_text = html && is_raw_text_element(&node_name);
                for &child in &data.children {
                    match doc.data(child) {
                        Some(text) if raw_text && !text.is_empty() => self.out.push_str(text),
                        _ => self.write_node(child, html, visible.clone()),
                    }
                }
                self.out.push_str("</");
                self.out.push_str(&prefixed_name);
                self.out.push('>');
            }
            NodeType::Attr(attr) => {
                push_attribute(&mut self.out, &attr.name.qualified(), &attr.value);
            }
            NodeType::Text(text) => self.out.push_str(&escape_text(text)),
            NodeType::CDataSection(text) => {
                self.out.push_str("<![CDATA[");
                self.out.push_str(text);
                self.out.push_str("]]>");
            }
            NodeType::Comment(text) => {
                self.out.push_str("<!--");
                self.out.push_str(text);
                self.out.push_str("-->");
            }
            NodeType::DocumentType(doctype) => {
                self.out.push_str("<!DOCTYPE ");
                self.out.push_str(&doctype.name);
                if !doctype.public_id.is_empty() {
                    self.out.push_str(" PUBLIC ");
                    self.out.push_str(&quote_literal(&doctype.public_id));
                    if !doctype.system_id.is_empty() {
                        self.out.push(' ');
                        self.out.push_str(&quote_literal(&doctype.system_id));
                    }
                } else if !doctype.system_id.is_empty() {
                    self.out.push_str(" SYSTEM ");
                    self.out.push_str(&quote_literal(&doctype.system_id));
                }
                if !doctype.internal_subset.is_empty() {
                    self.out.push_str(" [");
                    self.out.push_str(&doctype.internal_subset);
                    self.out.push(']');
                }
                self.out.push('>');
            }
            NodeType::ProcessingInstruction(pi) => {
                self.out.push_str("<?");
                self.out.push_str(&pi.target);
                if !pi.data.is_empty() {
                    self.out.push(' ');
                    self.out.push_str(&pi.data);
                }
                self.out.push_str("?>");
            }
        }
    }

    /// The name an unprefixed namespaced XML element is written with: a
    /// visible prefix for its namespace, unless its namespace is already the
    /// default one in scope.
    fn prefixed_name(
        doc: &Document,
        node: NodeId,
        html: bool,
        visible: &[Binding],
        node_name: &str,
    ) -> String {
        let Some(data) = doc.get(node) else {
            return node_name.to_string();
        };
        let Some(uri) = data.namespace_uri() else {
            return node_name.to_string();
        };
        if html || data.prefix().is_some() {
            return node_name.to_string();
        }

        let own_default = doc
            .attribute_nodes(node)
            .iter()
            .filter_map(|&a| doc.as_attr(a))
            .find(|a| a.name.prefix.is_none() && a.name.local_name == "xmlns")
            .map(|a| a.value.as_str());
        let default_namespace = own_default.or_else(|| {
            visible
                .iter()
                .rev()
                .find(|b| b.prefix.as_deref() == Some("") && b.namespace == uri)
                .map(|b| b.namespace.as_str())
        });
        if default_namespace == Some(uri) {
            return node_name.to_string();
        }
        match visible.iter().rev().find(|b| b.namespace == uri) {
            Some(Binding {
                prefix: Some(prefix),
                ..
            }) if !prefix.is_empty() => format!("{prefix}:{node_name}"),
            _ => node_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, MimeType};

    #[test]
    fn escaping() {
        assert_eq!(escape_text("a<b>&c\""), "a&lt;b&gt;&amp;c\"");
        assert_eq!(escape_attribute("\"\t\n\r<"), "&quot;&#x9;&#xA;&#xD;&lt;");
    }

    #[test]
    fn declares_missing_namespaces() {
        let mut doc = Document::new(MimeType::XmlText);
        let root = doc.create_element_ns(Some("urn:a"), "root").unwrap();
        let _ = doc.append_child(doc.root(), root).unwrap();
        let child = doc.create_element_ns(Some("urn:b"), "b:child").unwrap();
        let _ = doc.append_child(root, child).unwrap();
        let out = XmlSerializer.serialize_to_string(&doc, doc.root());
        assert_eq!(out, r#"<root xmlns="urn:a"><b:child xmlns:b="urn:b"/></root>"#);
    }

    #[test]
    fn html_elements_do_not_self_close() {
        let mut doc = Document::new(MimeType::Html);
        let div = doc.create_element("div").unwrap();
        let _ = doc.append_child(doc.root(), div).unwrap();
        let br = doc.create_element("br").unwrap();
        let _ = doc.append_child(div, br).unwrap();
        assert_eq!(
            XmlSerializer.serialize_to_string(&doc, doc.root()),
            r#"<div xmlns="http://www.w3.org/1999/xhtml"><br/></div>"#
        );
    }

    #[test]
    fn filter_can_skip_and_substitute() {
        let mut doc = Document::new(MimeType::XmlText);
        let root = doc.create_element("r").unwrap();
        let _ = doc.append_child(doc.root(), root).unwrap();
        let secret = doc.create_element("secret").unwrap();
        let _ = doc.append_child(root, secret).unwrap();
        let note = doc.create_comment("note");
        let _ = doc.append_child(root, note).unwrap();

        let mut filter = |doc: &Document, id: NodeId| {
            let name = doc.get(id).map(crate::Node::node_name);
            match name.as_deref() {
                Some("secret") => FilterOutcome::Skip,
                Some("#comment") => FilterOutcome::Text("[comment]".to_string()),
                _ => FilterOutcome::Node(id),
            }
        };
        let out = XmlSerializer.serialize_with_filter(&doc, doc.root(), &mut filter);
        assert_eq!(out, "<r>[comment]</r>");
    }
}
