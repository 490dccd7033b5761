//! [§ 4.10 Interface CharacterData](https://dom.spec.whatwg.org/#interface-characterdata)
//! and the Text-only operations from [§ 4.11](https://dom.spec.whatwg.org/#interface-text).
//!
//! Offsets and counts are in Unicode scalar values.

use crate::exception::DomException;
use crate::node::{NodeId, NodeType};
use crate::Document;

/// Byte index of the `offset`th scalar value, or `None` past the end.
fn byte_index(data: &str, offset: usize) -> Option<usize> {
    if offset == 0 {
        return Some(0);
    }
    data.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(data.len()))
        .nth(offset)
}

impl Document {
    fn data_of(&self, id: NodeId) -> Result<&str, DomException> {
        self.node(id)?.node_type.character_data().ok_or_else(|| {
            DomException::not_found(format!("node {} has no character data", id.0))
        })
    }

    fn data_mut(&mut self, id: NodeId) -> Result<&mut String, DomException> {
        self.node_mut(id)?
            .node_type
            .character_data_mut()
            .ok_or_else(|| DomException::not_found(format!("node {} has no character data", id.0)))
    }

    /// [§ 4.10](https://dom.spec.whatwg.org/#dom-characterdata-data)
    #[must_use]
    pub fn data(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| n.node_type.character_data())
    }

    /// Replace the whole data of a CharacterData node.
    pub fn set_data(&mut self, id: NodeId, value: &str) -> Result<(), DomException> {
        *self.data_mut(id)? = value.to_string();
        self.bump_version();
        Ok(())
    }

    /// [§ 4.10](https://dom.spec.whatwg.org/#dom-characterdata-length)
    #[must_use]
    pub fn length(&self, id: NodeId) -> usize {
        self.data(id).map_or(0, |d| d.chars().count())
    }

    /// [§ 4.10 substringData](https://dom.spec.whatwg.org/#dom-characterdata-substringdata)
    pub fn substring_data(
        &self,
        id: NodeId,
        offset: usize,
        count: usize,
    ) -> Result<String, DomException> {
        let data = self.data_of(id)?;
        // STEP 2: "If offset is greater than length, then throw an "IndexSizeError"."
        let start = byte_index(data, offset)
            .ok_or_else(|| DomException::index_size("offset is greater than length"))?;
        Ok(data[start..].chars().take(count).collect())
    }

    /// [§ 4.10 appendData](https://dom.spec.whatwg.org/#dom-characterdata-appenddata)
    pub fn append_data(&mut self, id: NodeId, data: &str) -> Result<(), DomException> {
        self.data_mut(id)?.push_str(data);
        self.bump_version();
        Ok(())
    }

    /// [§ 4.10 insertData](https://dom.spec.whatwg.org/#dom-characterdata-insertdata)
    pub fn insert_data(&mut self, id: NodeId, offset: usize, data: &str) -> Result<(), DomException> {
        self.replace_data(id, offset, 0, data)
    }

    /// [§ 4.10 deleteData](https://dom.spec.whatwg.org/#dom-characterdata-deletedata)
    pub fn delete_data(&mut self, id: NodeId, offset: usize, count: usize) -> Result<(), DomException> {
        self.replace_data(id, offset, count, "")
    }

    /// [§ 4.10 replace data](https://dom.spec.whatwg.org/#concept-cd-replace)
    pub fn replace_data(
        &mut self,
        id: NodeId,
        offset: usize,
        count: usize,
        data: &str,
    ) -> Result<(), DomException> {
        let current = self.data_mut(id)?;
        // STEP 2: "If offset is greater than length, then throw an "IndexSizeError"."
        let start = byte_index(current, offset)
            .ok_or_else(|| DomException::index_size("offset is greater than length"))?;
        // STEP 3: "If offset plus count is greater than length, then set count
        //         to length minus offset."
        let end = current[start..]
            .char_indices()
            .nth(count)
            .map_or(current.len(), |(i, _)| start + i);
        current.replace_range(start..end, data);
        self.bump_version();
        Ok(())
    }

    /// [§ 4.11 splitText](https://dom.spec.whatwg.org/#dom-text-splittext)
    ///
    /// Returns the new Text node holding the data after `offset`.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, DomException> {
        let new_node_type: fn(String) -> NodeType = match &self.node(id)?.node_type {
            NodeType::Text(_) => NodeType::Text,
            NodeType::CDataSection(_) => NodeType::CDataSection,
            _ => {
                return Err(DomException::not_found(format!(
                    "node {} is not a text node",
                    id.0
                )));
            }
        };
        let data = self.data_of(id)?;
        let start = byte_index(data, offset)
            .ok_or_else(|| DomException::index_size("offset is greater than length"))?;
        let tail = data[start..].to_string();

        let new_node = self.alloc(new_node_type(tail));
        if let Some(parent) = self.parent(id) {
            let reference = self.next_sibling(id);
            let _ = self.insert_before(parent, new_node, reference)?;
        }
        self.data_mut(id)?.truncate(start);
        self.bump_version();
        Ok(new_node)
    }

    /// [§ 4.11 wholeText](https://dom.spec.whatwg.org/#dom-text-wholetext)
    ///
    /// The data of the contiguous Text siblings around `id`, in tree order.
    #[must_use]
    pub fn whole_text(&self, id: NodeId) -> String {
        let mut first = id;
        while let Some(prev) = self.prev_sibling(first)
            && self.as_text(prev).is_some()
        {
            first = prev;
        }
        let mut text = String::new();
        let mut current = Some(first);
        while let Some(node) = current
            && let Some(data) = self.as_text(node)
        {
            text.push_str(data);
            current = self.next_sibling(node);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, DomExceptionName, MimeType};

    #[test]
    fn offsets_count_scalar_values() {
        let mut doc = Document::new(MimeType::XmlText);
        let t = doc.create_text_node("héllo");
        assert_eq!(doc.length(t), 5);
        assert_eq!(doc.substring_data(t, 1, 3).unwrap(), "éll");
        doc.replace_data(t, 1, 1, "e").unwrap();
        assert_eq!(doc.data(t), Some("hello"));
        doc.insert_data(t, 5, "!").unwrap();
        doc.delete_data(t, 0, 100).unwrap();
        assert_eq!(doc.data(t), Some(""));
    }

    #[test]
    fn offset_past_end_is_index_size_error() {
        let mut doc = Document::new(MimeType::XmlText);
        let t = doc.create_text_node("ab");
        let err = doc.substring_data(t, 3, 1).unwrap_err();
        assert_eq!(err.name, DomExceptionName::IndexSizeError);
        assert!(doc.insert_data(t, 2, "c").is_ok());
    }

    #[test]
    fn split_text_inserts_after() {
        let mut doc = Document::new(MimeType::XmlText);
        let p = doc.create_element("p").unwrap();
        let t = doc.create_text_node("foobar");
        let _ = doc.append_child(p, t).unwrap();
        let tail = doc.split_text(t, 3).unwrap();
        assert_eq!(doc.data(t), Some("foo"));
        assert_eq!(doc.data(tail), Some("bar"));
        assert_eq!(doc.next_sibling(t), Some(tail));
        assert_eq!(doc.whole_text(tail), "foobar");
    }
}
