use std::collections::BTreeSet;

use super::types::{CategoryId, CategoryNode};

/// Ids of the nodes whose children are visible.
///
/// Each tree surface owns its own set. It is keyed by id, so it stays valid
/// when a fresh snapshot replaces the records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedSet {
    ids: BTreeSet<CategoryId>,
}

impl ExpandedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = CategoryId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Flip one node. Returns `true` if it is now expanded.
    pub fn toggle(&mut self, id: &CategoryId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Replace the set with exactly `ids`.
    pub fn expand_all(&mut self, ids: impl IntoIterator<Item = CategoryId>) {
        self.ids = ids.into_iter().collect();
    }

    pub fn collapse_all(&mut self) {
        self.ids.clear();
    }

    pub fn is_expanded(&self, id: &CategoryId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryId> {
        self.ids.iter()
    }
}

/// Every id in the forest that has at least one child.
pub fn expandable_ids(roots: &[CategoryNode]) -> Vec<CategoryId> {
    let mut out = Vec::new();
    let mut stack: Vec<&CategoryNode> = roots.iter().collect();
    while let Some(node) = stack.pop() {
        if node.has_children() {
            out.push(node.id().clone());
            stack.extend(node.children.iter());
        }
    }
    out
}
