//! Mutable DOM tree for the tessera markup parser.
//!
//! This crate provides an arena-based DOM following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/): node model,
//! mutation algorithms, namespace lookup, live collections and an XML/HTML
//! serializer.
//!
//! # Design
//!
//! A [`Document`] owns every node in a `Vec` arena. Relationships are stored
//! as [`NodeId`] indices, so traversal is O(1) in any direction and every
//! operation goes through the document that owns the node.

mod attributes;
mod character_data;
mod clone;
mod document;
mod exception;
pub mod html;
mod implementation;
pub mod name;
pub mod namespace;
mod node;
mod node_list;
mod position;
mod serializer;
mod tree;

pub use attributes::NamedNodeMap;
pub use document::{
    AncestorIterator, DescendantIterator, Document, DocumentKind, MimeType,
    PrecedingSiblingIterator,
};
pub use exception::{DomException, DomExceptionName};
pub use implementation::DomImplementation;
pub use namespace::{NamespaceMap, validate_and_extract};
pub use node::{
    AttrData, DocumentTypeData, ElementData, Node, NodeId, NodeType, ProcessingInstructionData,
    QualifiedName, SourceLocation, node_type_code,
};
pub use node_list::{LiveNodeList, NodeList};
pub use position::document_position;
pub use serializer::{FilterOutcome, NodeFilter, XmlSerializer, escape_attribute, escape_text};
