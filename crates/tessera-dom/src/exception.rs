//! [§ 2.3 DOMException](https://webidl.spec.whatwg.org/#idl-DOMException)
//!
//! Errors raised by DOM operations. The `name`/`code` pairing follows the
//! [error names table](https://webidl.spec.whatwg.org/#dfn-error-names-table).

use strum_macros::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// [§ 2.3.1 Error names](https://webidl.spec.whatwg.org/#dfn-error-names-table)
///
/// "The DOMException names table below lists all the allowed names for
/// DOMException instances, along with a description and legacy code values."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum DomExceptionName {
    /// "The index is not in the allowed range."
    IndexSizeError,
    /// "The operation would yield an incorrect node tree."
    HierarchyRequestError,
    /// "The object is in the wrong document."
    WrongDocumentError,
    /// "The string contains invalid characters."
    InvalidCharacterError,
    /// "The object can not be modified."
    NoModificationAllowedError,
    /// "The object can not be found here."
    NotFoundError,
    /// "The operation is not supported."
    NotSupportedError,
    /// "The attribute is in use by another element."
    InUseAttributeError,
    /// "The object is in an invalid state."
    InvalidStateError,
    /// "The string did not match the expected pattern."
    SyntaxError,
    /// "The object can not be modified in this way."
    InvalidModificationError,
    /// "The operation is not allowed by Namespaces in XML."
    NamespaceError,
    /// "The object does not support the operation or argument."
    InvalidAccessError,
    /// "The supplied node is incorrect or has an incorrect ancestor for this operation."
    InvalidNodeTypeError,
    /// "The encoding operation (either encoded or decoding) failed."
    EncodingError,
}

impl DomExceptionName {
    /// The legacy numeric code, or `0` for names introduced without one.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::IndexSizeError => 1,
            Self::HierarchyRequestError => 3,
            Self::WrongDocumentError => 4,
            Self::InvalidCharacterError => 5,
            Self::NoModificationAllowedError => 7,
            Self::NotFoundError => 8,
            Self::NotSupportedError => 9,
            Self::InUseAttributeError => 10,
            Self::InvalidStateError => 11,
            Self::SyntaxError => 12,
            Self::InvalidModificationError => 13,
            Self::NamespaceError => 14,
            Self::InvalidAccessError => 15,
            Self::InvalidNodeTypeError => 24,
            Self::EncodingError => 0,
        }
    }
}

/// A DOM contract violation raised by a mutation or factory method.
///
/// These are never caught inside the DOM; they propagate to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct DomException {
    /// The error name from the error names table.
    pub name: DomExceptionName,
    /// Human readable detail.
    pub message: String,
}

impl DomException {
    /// Create an exception with the given name and message.
    pub fn new(name: DomExceptionName, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::trace!(%name, %message, "dom exception");
        Self { name, message }
    }

    /// The legacy numeric code of this exception.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.name.code()
    }

    pub(crate) fn hierarchy(message: impl Into<String>) -> Self {
        Self::new(DomExceptionName::HierarchyRequestError, message)
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::new(DomExceptionName::NotFoundError, message)
    }

    pub(crate) fn invalid_character(message: impl Into<String>) -> Self {
        Self::new(DomExceptionName::InvalidCharacterError, message)
    }

    pub(crate) fn namespace(message: impl Into<String>) -> Self {
        Self::new(DomExceptionName::NamespaceError, message)
    }

    pub(crate) fn index_size(message: impl Into<String>) -> Self {
        Self::new(DomExceptionName::IndexSizeError, message)
    }
}
