//! Tree and JSON views of a parsed document.

use owo_colors::OwoColorize;
use serde::Serialize;
use tessera_dom::{Document, NodeId, NodeType, SourceLocation};

/// Print the subtree at `id`, one node per line, indented by depth.
pub fn print_tree(doc: &Document, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    let Some(node) = doc.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => println!("{prefix}{}", "#document".bold()),
        NodeType::DocumentFragment => println!("{prefix}{}", "#document-fragment".bold()),
        NodeType::DocumentType(doctype) => {
            println!("{prefix}{}", format!("<!DOCTYPE {}>", doctype.name).dimmed());
        }
        NodeType::Element(element) => {
            let attrs: Vec<String> = element
                .attributes
                .iter()
                .filter_map(|&attr| doc.as_attr(attr))
                .map(|attr| format!("{}=\"{}\"", attr.name.qualified().yellow(), attr.value))
                .collect();
            let tag = element.tag_name();
            if attrs.is_empty() {
                print!("{prefix}<{}>", tag.cyan());
            } else {
                print!("{prefix}<{} {}>", tag.cyan(), attrs.join(" "));
            }
            match &element.name.namespace_uri {
                Some(namespace) => println!(" {}", namespace.dimmed()),
                None => println!(),
            }
        }
        NodeType::Attr(attr) => println!("{prefix}{}=\"{}\"", attr.name.qualified(), attr.value),
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n").replace(' ', "\u{00B7}");
            println!("{prefix}\"{}\"", display.green());
        }
        NodeType::CDataSection(data) => {
            println!("{prefix}{}", format!("<![CDATA[{data}]]>").green());
        }
        NodeType::Comment(data) => println!("{prefix}{}", format!("<!-- {data} -->").dimmed()),
        NodeType::ProcessingInstruction(pi) => {
            println!("{prefix}{}", format!("<?{} {}?>", pi.target, pi.data).magenta());
        }
    }
    for &child in doc.children(id) {
        print_tree(doc, child, indent + 1);
    }
}

/// JSON form of a node.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum JsonNode {
    Document {
        children: Vec<JsonNode>,
    },
    DocumentFragment {
        children: Vec<JsonNode>,
    },
    Doctype {
        name: String,
        #[serde(rename = "publicId", skip_serializing_if = "String::is_empty")]
        public_id: String,
        #[serde(rename = "systemId", skip_serializing_if = "String::is_empty")]
        system_id: String,
    },
    Element {
        #[serde(rename = "tagName")]
        tag_name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        attributes: Vec<JsonAttribute>,
        #[serde(skip_serializing_if = "Option::is_none")]
        location: Option<JsonLocation>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<JsonNode>,
    },
    Text {
        content: String,
    },
    CdataSection {
        content: String,
    },
    Comment {
        content: String,
    },
    ProcessingInstruction {
        target: String,
        data: String,
    },
}

/// An attribute in JSON output.
#[derive(Debug, Serialize)]
pub struct JsonAttribute {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub value: String,
}

/// A source position in JSON output.
#[derive(Debug, Serialize)]
pub struct JsonLocation {
    pub line: usize,
    pub column: usize,
}

impl From<SourceLocation> for JsonLocation {
    fn from(location: SourceLocation) -> Self {
        Self {
            line: location.line_number,
            column: location.column_number,
        }
    }
}

/// Convert the subtree at `id`. Attribute nodes are part of their element
/// and have no form of their own.
pub fn to_json(doc: &Document, id: NodeId) -> Option<JsonNode> {
    let node = doc.get(id)?;
    let children = || -> Vec<JsonNode> {
        doc.children(id)
            .iter()
            .filter_map(|&child| to_json(doc, child))
            .collect()
    };

    let json = match &node.node_type {
        NodeType::Document => JsonNode::Document {
            children: children(),
        },
        NodeType::DocumentFragment => JsonNode::DocumentFragment {
            children: children(),
        },
        NodeType::DocumentType(doctype) => JsonNode::Doctype {
            name: doctype.name.clone(),
            public_id: doctype.public_id.clone(),
            system_id: doctype.system_id.clone(),
        },
        NodeType::Element(element) => JsonNode::Element {
            tag_name: element.tag_name(),
            namespace: element.name.namespace_uri.clone(),
            attributes: element
                .attributes
                .iter()
                .filter_map(|&attr| doc.as_attr(attr))
                .map(|attr| JsonAttribute {
                    name: attr.name.qualified(),
                    namespace: attr.name.namespace_uri.clone(),
                    value: attr.value.clone(),
                })
                .collect(),
            location: node.location.map(JsonLocation::from),
            children: children(),
        },
        NodeType::Attr(_) => return None,
        NodeType::Text(data) => JsonNode::Text {
            content: data.clone(),
        },
        NodeType::CDataSection(data) => JsonNode::CdataSection {
            content: data.clone(),
        },
        NodeType::Comment(data) => JsonNode::Comment {
            content: data.clone(),
        },
        NodeType::ProcessingInstruction(pi) => JsonNode::ProcessingInstruction {
            target: pi.target.clone(),
            data: pi.data.clone(),
        },
    };
    Some(json)
}
