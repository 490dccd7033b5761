//! [§ 4.2.10 Old-style collections](https://dom.spec.whatwg.org/#old-style-collections)
//!
//! [`NodeList`] is a snapshot. [`LiveNodeList`] keeps a rebuild query and the
//! document version it last ran at, and reruns the query on the first access
//! after the document changed.

use std::cell::RefCell;
use std::fmt;

use crate::namespace;
use crate::node::NodeId;
use crate::Document;

/// [§ 4.2.10.1 Interface NodeList](https://dom.spec.whatwg.org/#interface-nodelist)
///
/// A static, ordered list of nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeList {
    nodes: Vec<NodeId>,
}

impl NodeList {
    /// Wrap a list of node ids.
    #[must_use]
    pub const fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes }
    }

    /// "The length attribute must return the number of nodes represented by
    /// the collection."
    #[must_use]
    pub fn length(&self) -> usize {
        self.nodes.len()
    }

    /// "The item(index) method must return the indexth node in the
    /// collection. If there is no indexth node in the collection, then the
    /// method must return null."
    #[must_use]
    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    /// Returns true when the list has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate the node ids in order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().copied()
    }

    /// The node ids as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[NodeId] {
        &self.nodes
    }
}

impl IntoIterator for NodeList {
    type Item = NodeId;
    type IntoIter = std::vec::IntoIter<NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

type RefreshFn = dyn Fn(&Document, NodeId) -> Vec<NodeId>;

/// Cached query result with the `(document uid, version)` it belongs to.
#[derive(Debug, Default)]
struct Snapshot {
    stamp: Option<(u64, u64)>,
    nodes: Vec<NodeId>,
}

/// A query result that tracks the tree.
///
/// The list is not tied to a borrow of its document; pass the document on
/// every access. The result is recomputed at most once per document version.
pub struct LiveNodeList {
    root: NodeId,
    refresh: Box<RefreshFn>,
    snapshot: RefCell<Snapshot>,
}

impl fmt::Debug for LiveNodeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveNodeList")
            .field("root", &self.root)
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl LiveNodeList {
    /// A live list rooted at `root` whose contents are `refresh(doc, root)`.
    pub fn new(root: NodeId, refresh: impl Fn(&Document, NodeId) -> Vec<NodeId> + 'static) -> Self {
        Self {
            root,
            refresh: Box::new(refresh),
            snapshot: RefCell::new(Snapshot::default()),
        }
    }

    fn with_current<R>(&self, doc: &Document, f: impl FnOnce(&[NodeId]) -> R) -> R {
        let stamp = (doc.uid(), doc.version());
        let mut snapshot = self.snapshot.borrow_mut();
        if snapshot.stamp != Some(stamp) {
            snapshot.nodes = (self.refresh)(doc, self.root);
            snapshot.stamp = Some(stamp);
        }
        f(&snapshot.nodes)
    }

    /// The number of nodes currently matched.
    #[must_use]
    pub fn length(&self, doc: &Document) -> usize {
        self.with_current(doc, <[NodeId]>::len)
    }

    /// The `index`th node currently matched.
    #[must_use]
    pub fn item(&self, doc: &Document, index: usize) -> Option<NodeId> {
        self.with_current(doc, |nodes| nodes.get(index).copied())
    }

    /// A static copy of the current contents.
    #[must_use]
    pub fn snapshot(&self, doc: &Document) -> NodeList {
        self.with_current(doc, |nodes| NodeList::new(nodes.to_vec()))
    }
}

fn matches_tag_name(doc: &Document, id: NodeId, qualified_name: &str) -> bool {
    let Some(node) = doc.get(id) else {
        return false;
    };
    let Some(element) = doc.as_element(id) else {
        return false;
    };
    if qualified_name == "*" {
        return true;
    }
    let tag_name = element.tag_name();
    // "If root's node document is an HTML document ... elements in the HTML
    // namespace whose qualified name is qualifiedName, in ASCII lowercase"
    if doc.is_html() && node.namespace_uri() == Some(namespace::HTML) {
        tag_name == qualified_name.to_ascii_lowercase()
    } else {
        tag_name == qualified_name
    }
}

impl Document {
    /// [§ 4.4 childNodes](https://dom.spec.whatwg.org/#dom-node-childnodes)
    #[must_use]
    pub fn child_nodes(&self, id: NodeId) -> NodeList {
        NodeList::new(self.children(id).to_vec())
    }

    /// [§ 4.4 list of elements with qualified name](https://dom.spec.whatwg.org/#concept-getelementsbytagname)
    #[must_use]
    pub fn get_elements_by_tag_name(&self, root: NodeId, qualified_name: &str) -> LiveNodeList {
        let qualified_name = qualified_name.to_string();
        LiveNodeList::new(root, move |doc, root| {
            doc.descendants(root)
                .filter(|&id| matches_tag_name(doc, id, &qualified_name))
                .collect()
        })
    }

    /// [§ 4.4 list of elements with namespace and local name](https://dom.spec.whatwg.org/#concept-getelementsbytagnamens)
    ///
    /// `"*"` matches any namespace or any local name.
    #[must_use]
    pub fn get_elements_by_tag_name_ns(
        &self,
        root: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> LiveNodeList {
        let namespace = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        let local_name = local_name.to_string();
        LiveNodeList::new(root, move |doc, root| {
            doc.descendants(root)
                .filter(|&id| {
                    let Some(node) = doc.get(id).filter(|n| n.is_element()) else {
                        return false;
                    };
                    let namespace_matches = namespace.as_deref() == Some("*")
                        || node.namespace_uri() == namespace.as_deref();
                    let local_matches =
                        local_name == "*" || node.local_name() == Some(local_name.as_str());
                    namespace_matches && local_matches
                })
                .collect()
        })
    }

    /// [§ 4.4 list of elements with class names](https://dom.spec.whatwg.org/#concept-getelementsbyclassname)
    ///
    /// "Let classes be the result of running the ordered set parser on
    /// classNames. If classes is the empty set, return an empty HTMLCollection."
    #[must_use]
    pub fn get_elements_by_class_name(&self, root: NodeId, class_names: &str) -> LiveNodeList {
        let mut classes: Vec<String> = Vec::new();
        for class in class_names.split_ascii_whitespace() {
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        }
        LiveNodeList::new(root, move |doc, root| {
            if classes.is_empty() {
                return Vec::new();
            }
            doc.descendants(root)
                .filter(|&id| {
                    if doc.as_element(id).is_none() {
                        return false;
                    }
                    let list = doc.class_list(id);
                    classes.iter().all(|c| list.contains(c))
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Document, MimeType};

    #[test]
    fn live_list_tracks_mutation() {
        let mut doc = Document::new(MimeType::XmlText);
        let root = doc.create_element("root").unwrap();
        let _ = doc.append_child(doc.root(), root).unwrap();
        let items = doc.get_elements_by_tag_name(doc.root(), "item");
        assert_eq!(items.length(&doc), 0);

        let item = doc.create_element("item").unwrap();
        let _ = doc.append_child(root, item).unwrap();
        assert_eq!(items.length(&doc), 1);
        assert_eq!(items.item(&doc, 0), Some(item));

        let _ = doc.remove_child(root, item).unwrap();
        assert_eq!(items.length(&doc), 0);
    }

    #[test]
    fn tag_name_wildcard() {
        let mut doc = Document::new(MimeType::XmlText);
        let root = doc.create_element("root").unwrap();
        let _ = doc.append_child(doc.root(), root).unwrap();
        let child = doc.create_element("a").unwrap();
        let _ = doc.append_child(root, child).unwrap();
        assert_eq!(doc.get_elements_by_tag_name(doc.root(), "*").length(&doc), 2);
    }
}
