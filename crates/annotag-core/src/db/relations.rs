//! Relation store: raw accessors over the `label_relations` edge table.
//!
//! These functions deal in stored edges (with their directionality
//! discriminator intact); the hierarchy engine normalizes and composes
//! them. Both directionality encodings are matched everywhere, so callers
//! never need to know how an edge happened to be written.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::str::FromStr;

use crate::relation::{LabelId, RelationKind, normalize};

/// A stored edge row from `label_relations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationEdge {
    pub id: i64,
    pub from_label_id: LabelId,
    pub to_label_id: LabelId,
    pub kind: RelationKind,
}

impl RelationEdge {
    /// Resolve this edge to its canonical `(parent, child)` pair.
    #[must_use]
    pub const fn normalized(&self) -> (LabelId, LabelId) {
        normalize(self.from_label_id, self.to_label_id, self.kind)
    }
}

/// Insert a stored edge and return its row id.
///
/// The schema enforces the single-parent and no-self-edge invariants; a
/// violating insert surfaces as a constraint error here.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_relation(
    conn: &Connection,
    from: LabelId,
    to: LabelId,
    kind: RelationKind,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO label_relations (from_label_id, to_label_id, relation_type)
         VALUES (?1, ?2, ?3)",
        params![from, to, kind.as_str()],
    )
    .with_context(|| format!("insert relation {from} -> {to} ({kind})"))?;
    Ok(conn.last_insert_rowid())
}

/// Delete the edge matching the canonical `(parent, child)` pair under
/// either directionality encoding. Returns the affected row count.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_relation_by_pair(
    conn: &Connection,
    parent: LabelId,
    child: LabelId,
) -> Result<usize> {
    conn.execute(
        "DELETE FROM label_relations WHERE parent_id = ?1 AND child_id = ?2",
        params![parent, child],
    )
    .with_context(|| format!("delete relation parent={parent} child={child}"))
}

/// Fetch the unique edge where `child` is the child end, or `None`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn parent_edge_of(conn: &Connection, child: LabelId) -> Result<Option<RelationEdge>> {
    conn.query_row(
        "SELECT id, from_label_id, to_label_id, relation_type
         FROM label_relations WHERE child_id = ?1",
        params![child],
        row_to_edge,
    )
    .optional()
    .with_context(|| format!("parent_edge_of {child}"))
}

/// Fetch all edges where `parent` is the parent end, in store order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn edges_from_parent(conn: &Connection, parent: LabelId) -> Result<Vec<RelationEdge>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, from_label_id, to_label_id, relation_type
             FROM label_relations WHERE parent_id = ?1",
        )
        .context("prepare edges_from_parent query")?;

    let rows = stmt
        .query_map(params![parent], row_to_edge)
        .with_context(|| format!("edges_from_parent {parent}"))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Fetch every edge between labels owned by `owner`, in one scan.
///
/// Edges are owner-homogeneous by construction (cross-owner edges are never
/// written), so joining on the child end suffices.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn edges_for_owner(conn: &Connection, owner: &str) -> Result<Vec<RelationEdge>> {
    let mut stmt = conn
        .prepare(
            "SELECT r.id, r.from_label_id, r.to_label_id, r.relation_type
             FROM label_relations r
             INNER JOIN labels l ON l.id = r.child_id
             WHERE l.user_id = ?1",
        )
        .context("prepare edges_for_owner query")?;

    let rows = stmt
        .query_map(params![owner], row_to_edge)
        .with_context(|| format!("edges_for_owner '{owner}'"))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn row_to_edge(row: &rusqlite::Row<'_>) -> rusqlite::Result<RelationEdge> {
    let raw_kind: String = row.get(3)?;
    let kind = RelationKind::from_str(&raw_kind).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            error.into(),
        )
    })?;
    Ok(RelationEdge {
        id: row.get(0)?,
        from_label_id: row.get(1)?,
        to_label_id: row.get(2)?,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{labels, open_in_memory};
    use crate::relation::storage_encoding;

    fn three_labels(conn: &Connection) -> (LabelId, LabelId, LabelId) {
        let a = labels::create_label(conn, "a", None, "ada").expect("create a").id;
        let b = labels::create_label(conn, "b", None, "ada").expect("create b").id;
        let c = labels::create_label(conn, "c", None, "ada").expect("create c").id;
        (a, b, c)
    }

    #[test]
    fn parent_edge_matches_both_encodings() {
        let conn = open_in_memory().expect("open store");
        let (a, b, c) = three_labels(&conn);

        let (from, to) = storage_encoding(a, b, RelationKind::ParentToChild);
        insert_relation(&conn, from, to, RelationKind::ParentToChild).expect("insert");
        let (from, to) = storage_encoding(a, c, RelationKind::ChildToParent);
        insert_relation(&conn, from, to, RelationKind::ChildToParent).expect("insert");

        let edge_b = parent_edge_of(&conn, b).expect("query").expect("some");
        assert_eq!(edge_b.normalized(), (a, b));
        let edge_c = parent_edge_of(&conn, c).expect("query").expect("some");
        assert_eq!(edge_c.normalized(), (a, c));
    }

    #[test]
    fn parent_edge_of_root_is_none() {
        let conn = open_in_memory().expect("open store");
        let (a, _, _) = three_labels(&conn);
        assert!(parent_edge_of(&conn, a).expect("query").is_none());
    }

    #[test]
    fn edges_from_parent_spans_encodings() {
        let conn = open_in_memory().expect("open store");
        let (a, b, c) = three_labels(&conn);

        insert_relation(&conn, a, b, RelationKind::ParentToChild).expect("insert");
        insert_relation(&conn, c, a, RelationKind::ChildToParent).expect("insert");

        let mut children: Vec<LabelId> = edges_from_parent(&conn, a)
            .expect("query")
            .iter()
            .map(|edge| edge.normalized().1)
            .collect();
        children.sort_unstable();
        assert_eq!(children, vec![b, c]);
    }

    #[test]
    fn delete_by_pair_reports_affected_rows() {
        let conn = open_in_memory().expect("open store");
        let (a, b, _) = three_labels(&conn);
        insert_relation(&conn, b, a, RelationKind::ChildToParent).expect("insert");

        assert_eq!(delete_relation_by_pair(&conn, a, b).expect("delete"), 1);
        assert_eq!(delete_relation_by_pair(&conn, a, b).expect("delete"), 0);
    }

    #[test]
    fn edges_for_owner_excludes_other_owners() {
        let conn = open_in_memory().expect("open store");
        let (a, b, _) = three_labels(&conn);
        let x = labels::create_label(&conn, "x", None, "grace").expect("create").id;
        let y = labels::create_label(&conn, "y", None, "grace").expect("create").id;

        insert_relation(&conn, a, b, RelationKind::ParentToChild).expect("insert");
        insert_relation(&conn, x, y, RelationKind::ParentToChild).expect("insert");

        let edges = edges_for_owner(&conn, "ada").expect("query");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].normalized(), (a, b));
    }
}
