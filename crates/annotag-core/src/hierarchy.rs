//! Single-parent label hierarchy over the relation edge table.
//!
//! This module answers the hierarchy questions the rest of the system asks:
//!
//! - What is a label's direct parent? Its direct children?
//! - May a new parent/child edge be inserted (ownership, single-parent,
//!   acyclicity)?
//! - What is the full tree under a label, or the forest for an owner?
//! - What is the root-to-label breadcrumb path?
//!
//! # Invariants
//!
//! Every label has at most one direct parent, and the edge set interpreted
//! as parent→child arrows is acyclic. Both are validated before every
//! insert and additionally enforced by the schema (`UNIQUE` on the child
//! end, `CHECK` against self edges), so a raced writer on another
//! connection cannot corrupt the tree either.
//!
//! # Cycle prevention
//!
//! [`add_parent_child`] rejects an edge whose child is already an ancestor
//! of the proposed parent. The validate-then-insert sequence runs inside an
//! immediate transaction so two concurrent inserts for the same child
//! cannot both pass the "no existing parent" check.
//!
//! # Error handling
//!
//! All functions return [`HierarchyError`], which distinguishes domain
//! errors (self-parent, duplicate parent, cycle, missing label) from
//! database errors. A label that is missing and a label owned by someone
//! else produce the same error on purpose.

#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
)]

use anyhow::Context as AnyhowContext;
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::db::labels::{self, LabelRecord};
use crate::db::relations;
use crate::model::{Breadcrumb, LabelTree};
use crate::relation::{LabelId, RelationKind, storage_encoding};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The canonical result of a successful edge insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewRelation {
    /// Row id of the stored edge.
    pub id: i64,
    pub parent_id: LabelId,
    pub child_id: LabelId,
}

/// Errors that can occur in hierarchy operations.
#[derive(Debug)]
pub enum HierarchyError {
    /// A label may not be its own parent.
    SelfParent { label_id: LabelId },
    /// The label does not exist under the requesting owner. Deliberately
    /// covers both "missing" and "not yours".
    LabelNotFound { label_id: LabelId },
    /// The child already has a direct parent (single-parent invariant).
    DuplicateParent {
        child_id: LabelId,
        existing_parent: LabelId,
    },
    /// Inserting the edge would make a label its own ancestor.
    CycleDetected {
        parent_id: LabelId,
        child_id: LabelId,
    },
    /// No edge exists between the given parent and child.
    RelationNotFound {
        parent_id: LabelId,
        child_id: LabelId,
    },
    /// An underlying database error.
    Db(anyhow::Error),
}

impl fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfParent { label_id } => {
                write!(f, "label {label_id} cannot be its own parent")
            }
            Self::LabelNotFound { label_id } => {
                write!(f, "label {label_id} not found for this user")
            }
            Self::DuplicateParent {
                child_id,
                existing_parent,
            } => write!(
                f,
                "label {child_id} already has parent {existing_parent}: labels have a single parent"
            ),
            Self::CycleDetected {
                parent_id,
                child_id,
            } => write!(
                f,
                "linking {child_id} under {parent_id} would create a cycle ({child_id} is an ancestor of {parent_id})"
            ),
            Self::RelationNotFound {
                parent_id,
                child_id,
            } => write!(
                f,
                "no relation exists between parent {parent_id} and child {child_id}"
            ),
            Self::Db(e) => write!(f, "database error: {e}"),
        }
    }
}

impl std::error::Error for HierarchyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Self::Db(e) = self {
            Some(e.as_ref())
        } else {
            None
        }
    }
}

impl From<anyhow::Error> for HierarchyError {
    fn from(e: anyhow::Error) -> Self {
        Self::Db(e)
    }
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Return the direct parent of `label_id`, or `None` for a root.
///
/// Matches the unique edge with `label_id` at the child end under either
/// directionality encoding; errors only on a store fault.
pub fn direct_parent(
    conn: &Connection,
    label_id: LabelId,
) -> Result<Option<LabelId>, HierarchyError> {
    let edge = relations::parent_edge_of(conn, label_id)?;
    Ok(edge.map(|edge| edge.normalized().0))
}

/// Return the direct children of `parent_id`, in store order.
///
/// Callers must not assume sorted output.
pub fn direct_children(
    conn: &Connection,
    parent_id: LabelId,
) -> Result<Vec<LabelId>, HierarchyError> {
    let edges = relations::edges_from_parent(conn, parent_id)?;
    Ok(edges.iter().map(|edge| edge.normalized().1).collect())
}

/// Pre-flight check for [`add_parent_child`]: performs no writes.
///
/// Rejects self-parenting, verifies both labels exist under `owner`, and
/// rejects a child that already has a direct parent.
pub fn can_add_child(
    conn: &Connection,
    parent_id: LabelId,
    child_id: LabelId,
    owner: &str,
) -> Result<(), HierarchyError> {
    if parent_id == child_id {
        return Err(HierarchyError::SelfParent {
            label_id: parent_id,
        });
    }

    require_label(conn, parent_id, owner)?;
    require_label(conn, child_id, owner)?;

    if let Some(existing_parent) = direct_parent(conn, child_id)? {
        return Err(HierarchyError::DuplicateParent {
            child_id,
            existing_parent,
        });
    }

    Ok(())
}

/// Return `true` when `candidate_ancestor_id` is `label_id` itself or one
/// of its ancestors.
///
/// The walk is O(depth) and terminates because insertion keeps the tree
/// acyclic; a visited guard bounds it anyway on a corrupted store. Store
/// faults abort the walk and propagate (the check never degrades to a
/// silent `false`).
pub fn is_ancestor(
    conn: &Connection,
    candidate_ancestor_id: LabelId,
    label_id: LabelId,
) -> Result<bool, HierarchyError> {
    if candidate_ancestor_id == label_id {
        return Ok(true);
    }

    let mut visited: HashSet<LabelId> = HashSet::new();
    visited.insert(label_id);

    let mut current = label_id;
    while let Some(parent) = direct_parent(conn, current)? {
        if parent == candidate_ancestor_id {
            return Ok(true);
        }
        if !visited.insert(parent) {
            // corrupted store: stop rather than loop
            tracing::warn!(label_id, parent, "ancestor walk hit a repeated label");
            return Ok(false);
        }
        current = parent;
    }

    Ok(false)
}

/// Insert a validated parent→child edge and return its canonical form.
///
/// Runs validation, an ownership re-check, the cycle check, and the insert
/// inside one immediate transaction, so a concurrent writer cannot slip a
/// second parent or a cycle past the checks. The insert is the last step;
/// no partial writes occur on any failure branch.
pub fn add_parent_child(
    conn: &mut Connection,
    parent_id: LabelId,
    child_id: LabelId,
    owner: &str,
    kind: RelationKind,
) -> Result<NewRelation, HierarchyError> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("begin add_parent_child transaction")?;

    can_add_child(&tx, parent_id, child_id, owner)?;

    // Re-verify ownership inside the transaction; the pre-flight check may
    // have been run earlier, against older state.
    require_label(&tx, parent_id, owner)?;
    require_label(&tx, child_id, owner)?;

    if is_ancestor(&tx, child_id, parent_id)? {
        return Err(HierarchyError::CycleDetected {
            parent_id,
            child_id,
        });
    }

    let (from, to) = storage_encoding(parent_id, child_id, kind);
    let id = relations::insert_relation(&tx, from, to, kind)
        .context("error adding parent-child relationship")?;

    tx.commit().context("commit add_parent_child transaction")?;
    tracing::debug!(parent_id, child_id, %kind, "relation added");

    Ok(NewRelation {
        id,
        parent_id,
        child_id,
    })
}

/// Remove the edge between `parent_id` and `child_id`, whichever way it was
/// encoded.
///
/// Returns [`HierarchyError::RelationNotFound`] when no edge matched; the
/// store is left unchanged in that case.
pub fn remove_parent_child(
    conn: &Connection,
    parent_id: LabelId,
    child_id: LabelId,
) -> Result<(), HierarchyError> {
    let affected = relations::delete_relation_by_pair(conn, parent_id, child_id)
        .context("error removing relationship")?;

    if affected == 0 {
        return Err(HierarchyError::RelationNotFound {
            parent_id,
            child_id,
        });
    }

    tracing::debug!(parent_id, child_id, "relation removed");
    Ok(())
}

/// Build the full subtree rooted at `label_id` for `owner`.
///
/// Loads the owner's labels and edges in two scans and composes the tree
/// in memory, avoiding one store round trip per node.
pub fn build_label_tree(
    conn: &Connection,
    label_id: LabelId,
    owner: &str,
) -> Result<LabelTree, HierarchyError> {
    let index = HierarchyIndex::load(conn, owner)?;
    index
        .subtree(label_id)
        .ok_or(HierarchyError::LabelNotFound { label_id })
}

/// Build the forest of all root labels owned by `owner`.
///
/// A root is a label with no edge at its child end. Roots come out in
/// creation order; children in edge-insertion order.
pub fn all_root_trees(conn: &Connection, owner: &str) -> Result<Vec<LabelTree>, HierarchyError> {
    let index = HierarchyIndex::load(conn, owner)?;
    Ok(index.root_forest())
}

/// Return the root-to-label breadcrumb path for `label_id`.
///
/// Walks upward from `label_id`; an owner-scoped label lookup that misses
/// ends the walk (treated as reaching past the root). The first element is
/// the root, the last is `label_id` itself.
pub fn path_to_root(
    conn: &Connection,
    label_id: LabelId,
    owner: &str,
) -> Result<Vec<Breadcrumb>, HierarchyError> {
    let mut path: Vec<Breadcrumb> = Vec::new();
    let mut visited: HashSet<LabelId> = HashSet::new();
    let mut current = Some(label_id);

    while let Some(id) = current {
        let Some(label) = labels::get_label(conn, id, owner)? else {
            break;
        };
        if !visited.insert(id) {
            break; // cycle guard
        }
        path.push(Breadcrumb {
            id: label.id,
            name: label.name,
        });
        current = direct_parent(conn, id)?;
    }

    path.reverse();
    Ok(path)
}

// ---------------------------------------------------------------------------
// Snapshot index
// ---------------------------------------------------------------------------

/// In-memory adjacency snapshot of one owner's hierarchy.
///
/// Built from two scans (labels, edges); tree composition then runs
/// without further store access. A snapshot is valid only until the next
/// relation mutation.
struct HierarchyIndex {
    labels: HashMap<LabelId, LabelRecord>,
    children: HashMap<LabelId, Vec<LabelId>>,
    root_order: Vec<LabelId>,
}

impl HierarchyIndex {
    fn load(conn: &Connection, owner: &str) -> Result<Self, HierarchyError> {
        let label_rows = labels::list_labels(conn, owner)?;
        let edges = relations::edges_for_owner(conn, owner)?;

        let mut children: HashMap<LabelId, Vec<LabelId>> = HashMap::new();
        let mut has_parent: HashSet<LabelId> = HashSet::new();
        for edge in &edges {
            let (parent, child) = edge.normalized();
            children.entry(parent).or_default().push(child);
            has_parent.insert(child);
        }

        let root_order = label_rows
            .iter()
            .map(|label| label.id)
            .filter(|id| !has_parent.contains(id))
            .collect();
        let labels = label_rows
            .into_iter()
            .map(|label| (label.id, label))
            .collect();

        Ok(Self {
            labels,
            children,
            root_order,
        })
    }

    /// Compose the subtree under `label_id`, or `None` for an unknown label.
    fn subtree(&self, label_id: LabelId) -> Option<LabelTree> {
        let mut visited: HashSet<LabelId> = HashSet::new();
        self.subtree_guarded(label_id, &mut visited)
    }

    fn subtree_guarded(
        &self,
        label_id: LabelId,
        visited: &mut HashSet<LabelId>,
    ) -> Option<LabelTree> {
        let label = self.labels.get(&label_id)?;
        if !visited.insert(label_id) {
            return None; // corrupted store: cut the repeat rather than recurse forever
        }

        let children = self
            .children
            .get(&label_id)
            .map(|child_ids| {
                child_ids
                    .iter()
                    .filter_map(|child| self.subtree_guarded(*child, visited))
                    .collect()
            })
            .unwrap_or_default();

        Some(LabelTree {
            id: label.id,
            name: label.name.clone(),
            color: label.color.clone(),
            children,
        })
    }

    fn root_forest(&self) -> Vec<LabelTree> {
        self.root_order
            .iter()
            .filter_map(|root| self.subtree(*root))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up `label_id` under `owner` or fail with `LabelNotFound`.
fn require_label(
    conn: &Connection,
    label_id: LabelId,
    owner: &str,
) -> Result<LabelRecord, HierarchyError> {
    labels::get_label(conn, label_id, owner)?
        .ok_or(HierarchyError::LabelNotFound { label_id })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
