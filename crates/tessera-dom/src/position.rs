//! [§ 4.4 compareDocumentPosition](https://dom.spec.whatwg.org/#dom-node-comparedocumentposition)

use crate::node::NodeId;
use crate::Document;

/// `Node.DOCUMENT_POSITION_*` bits.
pub mod document_position {
    /// `DOCUMENT_POSITION_DISCONNECTED`
    pub const DISCONNECTED: u16 = 0x01;
    /// `DOCUMENT_POSITION_PRECEDING`
    pub const PRECEDING: u16 = 0x02;
    /// `DOCUMENT_POSITION_FOLLOWING`
    pub const FOLLOWING: u16 = 0x04;
    /// `DOCUMENT_POSITION_CONTAINS`
    pub const CONTAINS: u16 = 0x08;
    /// `DOCUMENT_POSITION_CONTAINED_BY`
    pub const CONTAINED_BY: u16 = 0x10;
    /// `DOCUMENT_POSITION_IMPLEMENTATION_SPECIFIC`
    pub const IMPLEMENTATION_SPECIFIC: u16 = 0x20;
}

use document_position::{
    CONTAINED_BY, CONTAINS, DISCONNECTED, FOLLOWING, IMPLEMENTATION_SPECIFIC, PRECEDING,
};

/// Result bits for two nodes in different trees: disconnected, with an
/// arbitrary but stable direction.
const fn disconnected(other_first: bool) -> u16 {
    DISCONNECTED | IMPLEMENTATION_SPECIFIC | if other_first { PRECEDING } else { FOLLOWING }
}

impl Document {
    /// The inclusive ancestor chain of `id`, root first.
    fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path: Vec<NodeId> = std::iter::once(id).chain(self.ancestors(id)).collect();
        path.reverse();
        path
    }

    /// Returns true when `a` comes before `b` in tree order. Both must share
    /// a root and neither may be an ancestor of the other.
    fn precedes(&self, a: NodeId, b: NodeId) -> bool {
        let path_a = self.path_from_root(a);
        let path_b = self.path_from_root(b);
        let common = path_a
            .iter()
            .zip(&path_b)
            .take_while(|(x, y)| x == y)
            .count();
        let (Some(&branch_a), Some(&branch_b)) = (path_a.get(common), path_b.get(common)) else {
            return false;
        };
        self.preceding_siblings(branch_b).any(|s| s == branch_a)
    }

    /// Resolve an attribute to its owner element for ordering.
    fn position_anchor(&self, id: NodeId) -> (Option<NodeId>, Option<NodeId>) {
        match self.as_attr(id) {
            Some(attr) => (attr.owner_element, Some(id)),
            None => (Some(id), None),
        }
    }

    /// [§ 4.4 compareDocumentPosition](https://dom.spec.whatwg.org/#dom-node-comparedocumentposition)
    ///
    /// The position of `other` relative to `reference`, both in this
    /// document. Nodes in separate detached subtrees are ordered by id.
    #[must_use]
    pub fn compare_document_position(&self, reference: NodeId, other: NodeId) -> u16 {
        // STEP 1: "If this is other, then return zero."
        if reference == other {
            return 0;
        }

        // STEP 2-4: "Let node1 be other and node2 be this." Attributes are
        //           positioned at their owner element.
        let (node1, attr1) = self.position_anchor(other);
        let (node2, attr2) = self.position_anchor(reference);

        if let (Some(n1), Some(n2)) = (node1, node2)
            && n1 == n2
            && let (Some(a1), Some(a2)) = (attr1, attr2)
        {
            // "For each attr in node2's attribute list: if attr equals attr1,
            // then return ... PRECEDING; if attr equals attr2, then return
            // ... FOLLOWING."
            for &attr in self.attribute_nodes(n2) {
                if attr == a1 {
                    return IMPLEMENTATION_SPECIFIC | PRECEDING;
                }
                if attr == a2 {
                    return IMPLEMENTATION_SPECIFIC | FOLLOWING;
                }
            }
        }

        // STEP 5: "If node1 or node2 is null, or node1's root is not node2's
        //         root, then return ... DISCONNECTED ..."
        let (Some(node1), Some(node2)) = (node1, node2) else {
            return disconnected(other < reference);
        };
        let root1 = self.ancestors(node1).last().unwrap_or(node1);
        let root2 = self.ancestors(node2).last().unwrap_or(node2);
        if root1 != root2 {
            return disconnected(root1 < root2);
        }

        // STEP 6: "If node1 is an ancestor of node2 and attr1 is null, or node1
        //         is node2 and attr2 is non-null, then return CONTAINS | PRECEDING."
        if (attr1.is_none() && self.is_descendant_of(node2, node1))
            || (node1 == node2 && attr2.is_some())
        {
            return CONTAINS | PRECEDING;
        }

        // STEP 7: "If node1 is a descendant of node2 and attr2 is null, or node1
        //         is node2 and attr1 is non-null, then return CONTAINED_BY | FOLLOWING."
        if (attr2.is_none() && self.is_descendant_of(node1, node2))
            || (node1 == node2 && attr1.is_some())
        {
            return CONTAINED_BY | FOLLOWING;
        }

        // STEP 8: "If node1 is preceding node2, then return PRECEDING."
        if self.precedes(node1, node2) {
            return PRECEDING;
        }

        // STEP 9: "Return DOCUMENT_POSITION_FOLLOWING."
        FOLLOWING
    }

    /// Compare `reference` in this document with `other` in `other_doc`.
    ///
    /// Different documents are always disconnected; the direction comes from
    /// a random per-document id and is stable for the life of the process.
    #[must_use]
    pub fn compare_document_position_in(
        &self,
        reference: NodeId,
        other_doc: &Self,
        other: NodeId,
    ) -> u16 {
        if self.uid() == other_doc.uid() {
            return self.compare_document_position(reference, other);
        }
        disconnected(other_doc.uid() < self.uid())
    }
}
