//! Label trees and breadcrumb paths.
//!
//! Both types are derived, never persisted: any relation mutation
//! invalidates a previously built tree, and callers refetch.

use serde::Serialize;

use crate::relation::LabelId;

/// A label with its full subtree, built on demand from the edge table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelTree {
    pub id: LabelId,
    pub name: String,
    pub color: Option<String>,
    pub children: Vec<LabelTree>,
}

impl LabelTree {
    /// Total number of nodes in this subtree, the root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Depth of the deepest leaf, where a childless node has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Self::depth)
            .max()
            .unwrap_or_default()
    }

    /// Flatten the subtree into ids, parents before their children.
    #[must_use]
    pub fn flatten_ids(&self) -> Vec<LabelId> {
        let mut ids = Vec::with_capacity(self.node_count());
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, into: &mut Vec<LabelId>) {
        into.push(self.id);
        for child in &self.children {
            child.collect_ids(into);
        }
    }
}

/// One element of a root-to-label path, used for breadcrumb display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub id: LabelId,
    pub name: String,
}
