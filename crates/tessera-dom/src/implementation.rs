//! [§ 4.5.1 Interface DOMImplementation](https://dom.spec.whatwg.org/#interface-domimplementation)

use crate::document::{Document, MimeType};
use crate::exception::DomException;
use crate::name::is_valid_qname;
use crate::namespace;
use crate::node::{DocumentTypeData, NodeId};

/// Factory for documents and doctypes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomImplementation;

impl DomImplementation {
    /// [§ 4.5.1 createDocumentType](https://dom.spec.whatwg.org/#dom-domimplementation-createdocumenttype)
    ///
    /// "Validate qualifiedName." The result is allocated into a document with
    /// [`Document::create_document_type`].
    pub fn create_document_type(
        &self,
        qualified_name: &str,
        public_id: &str,
        system_id: &str,
    ) -> Result<DocumentTypeData, DomException> {
        if !is_valid_qname(qualified_name) {
            return Err(DomException::invalid_character(format!(
                "invalid doctype name: \"{qualified_name}\""
            )));
        }
        Ok(DocumentTypeData {
            name: qualified_name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
            internal_subset: String::new(),
        })
    }

    /// [§ 4.5.1 createDocument](https://dom.spec.whatwg.org/#dom-domimplementation-createdocument)
    pub fn create_document(
        &self,
        namespace_uri: Option<&str>,
        qualified_name: &str,
        doctype: Option<DocumentTypeData>,
    ) -> Result<Document, DomException> {
        // STEP 6: "document's content type is determined by namespace"
        let content_type = match namespace_uri {
            Some(namespace::HTML) => MimeType::XhtmlApplication,
            Some(namespace::SVG) => MimeType::SvgImage,
            _ => MimeType::XmlApplication,
        };
        // STEP 1: "Let document be a new XMLDocument."
        let mut document = Document::new(content_type);

        // STEP 2-3: "If qualifiedName is not the empty string, then set element
        //           to the result of running the internal createElementNS steps"
        let element = if qualified_name.is_empty() {
            None
        } else {
            Some(document.create_element_ns(namespace_uri, qualified_name)?)
        };

        // STEP 4: "If doctype is non-null, append doctype to document."
        if let Some(doctype) = doctype {
            let id = document.create_document_type(doctype);
            let _ = document.append_child(NodeId::ROOT, id)?;
        }
        // STEP 5: "If element is non-null, append element to document."
        if let Some(element) = element {
            let _ = document.append_child(NodeId::ROOT, element)?;
        }
        Ok(document)
    }

    /// [§ 4.5.1 createHTMLDocument](https://dom.spec.whatwg.org/#dom-domimplementation-createhtmldocument)
    ///
    /// `<!DOCTYPE html><html><head><title>…</title></head><body></body></html>`,
    /// the title only when given.
    pub fn create_html_document(&self, title: Option<&str>) -> Result<Document, DomException> {
        let mut doc = Document::new(MimeType::Html);

        // STEP 3-4: "Append a new doctype, with "html" as its name"
        let doctype = doc.create_document_type(DocumentTypeData {
            name: "html".to_string(),
            ..DocumentTypeData::default()
        });
        let _ = doc.append_child(NodeId::ROOT, doctype)?;

        // STEP 5-6: html and head elements
        let html = doc.create_element("html")?;
        let _ = doc.append_child(NodeId::ROOT, html)?;
        let head = doc.create_element("head")?;
        let _ = doc.append_child(html, head)?;

        // STEP 7: "If title is given" create a title element with a Text child
        if let Some(title) = title {
            let title_element = doc.create_element("title")?;
            let _ = doc.append_child(head, title_element)?;
            let text = doc.create_text_node(title);
            let _ = doc.append_child(title_element, text)?;
        }

        // STEP 8: body element
        let body = doc.create_element("body")?;
        let _ = doc.append_child(html, body)?;
        Ok(doc)
    }

    /// [§ 4.5.1 hasFeature](https://dom.spec.whatwg.org/#dom-domimplementation-hasfeature)
    ///
    /// "The hasFeature() method steps are to return true."
    #[must_use]
    pub const fn has_feature(&self) -> bool {
        true
    }
}
