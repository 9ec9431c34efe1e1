//! Label store: owner-scoped CRUD over the `labels` table.
//!
//! All functions take a connection reference and return `anyhow::Result<T>`
//! with typed structs (never raw rows). Lookups are owner-scoped; a missing
//! row and a row owned by someone else are indistinguishable to callers.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::Serialize;

use crate::db::{now_us, relations};
use crate::relation::{LabelId, RelationKind, storage_encoding};

/// A label row from the `labels` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelRecord {
    pub id: LabelId,
    pub name: String,
    pub color: Option<String>,
    pub user_id: String,
    pub created_at_us: i64,
}

/// Insert a new label for `owner` and return the stored record.
///
/// # Errors
///
/// Returns an error if the insert fails (empty name included, rejected by
/// the schema CHECK).
pub fn create_label(
    conn: &Connection,
    name: &str,
    color: Option<&str>,
    owner: &str,
) -> Result<LabelRecord> {
    let created_at_us = now_us();
    conn.execute(
        "INSERT INTO labels (name, color, user_id, created_at_us)
         VALUES (?1, ?2, ?3, ?4)",
        params![name, color, owner, created_at_us],
    )
    .with_context(|| format!("insert label '{name}' for '{owner}'"))?;

    Ok(LabelRecord {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        color: color.map(ToString::to_string),
        user_id: owner.to_string(),
        created_at_us,
    })
}

/// Fetch a single label by id, scoped to `owner`.
///
/// Returns `None` when the label does not exist or belongs to another owner.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_label(conn: &Connection, id: LabelId, owner: &str) -> Result<Option<LabelRecord>> {
    conn.query_row(
        "SELECT id, name, color, user_id, created_at_us
         FROM labels WHERE id = ?1 AND user_id = ?2",
        params![id, owner],
        row_to_label,
    )
    .optional()
    .with_context(|| format!("get_label {id}"))
}

/// List all labels owned by `owner`, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_labels(conn: &Connection, owner: &str) -> Result<Vec<LabelRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, color, user_id, created_at_us
             FROM labels WHERE user_id = ?1 ORDER BY id ASC",
        )
        .context("prepare list_labels query")?;

    let rows = stmt
        .query_map(params![owner], row_to_label)
        .context("list_labels")?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Update a label's name and/or color. The owner is immutable.
///
/// Returns `false` when no owner-scoped row matched (nothing written).
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_label(
    conn: &Connection,
    id: LabelId,
    owner: &str,
    name: Option<&str>,
    color: Option<&str>,
) -> Result<bool> {
    let affected = conn
        .execute(
            "UPDATE labels
             SET name = COALESCE(?3, name), color = COALESCE(?4, color)
             WHERE id = ?1 AND user_id = ?2",
            params![id, owner, name, color],
        )
        .with_context(|| format!("update_label {id}"))?;
    Ok(affected > 0)
}

/// Delete a label, reparenting its direct children to the deleted label's
/// own parent.
///
/// Children of a deleted root become roots. The label's own edges and
/// annotations go with it via foreign-key cascade. Everything happens in
/// one immediate transaction.
///
/// Returns `false` when no owner-scoped row matched (nothing written).
///
/// # Errors
///
/// Returns an error if any statement in the transaction fails.
pub fn delete_label(conn: &mut Connection, id: LabelId, owner: &str) -> Result<bool> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("begin delete_label transaction")?;

    let exists: bool = tx
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM labels WHERE id = ?1 AND user_id = ?2)",
            params![id, owner],
            |row| row.get(0),
        )
        .with_context(|| format!("check label {id}"))?;
    if !exists {
        return Ok(false);
    }

    let grandparent = relations::parent_edge_of(&tx, id)?
        .map(|edge| edge.normalized().0);
    let orphans: Vec<LabelId> = relations::edges_from_parent(&tx, id)?
        .iter()
        .map(|edge| edge.normalized().1)
        .collect();

    let deleted = tx
        .execute(
            "DELETE FROM labels WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
        )
        .with_context(|| format!("delete label {id}"))?;

    if let Some(grandparent) = grandparent {
        for child in &orphans {
            let (from, to) = storage_encoding(grandparent, *child, RelationKind::ParentToChild);
            relations::insert_relation(&tx, from, to, RelationKind::ParentToChild)
                .with_context(|| format!("reparent label {child} under {grandparent}"))?;
        }
    }

    tx.commit().context("commit delete_label transaction")?;
    tracing::debug!(label_id = id, reparented = orphans.len(), "label deleted");
    Ok(deleted > 0)
}

fn row_to_label(row: &rusqlite::Row<'_>) -> rusqlite::Result<LabelRecord> {
    Ok(LabelRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        user_id: row.get(3)?,
        created_at_us: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::hierarchy;

    #[test]
    fn create_then_get_round_trips() {
        let conn = open_in_memory().expect("open store");
        let label = create_label(&conn, "method", Some("#aa3311"), "ada").expect("create");

        let fetched = get_label(&conn, label.id, "ada").expect("get").expect("some");
        assert_eq!(fetched, label);
    }

    #[test]
    fn get_is_owner_scoped() {
        let conn = open_in_memory().expect("open store");
        let label = create_label(&conn, "method", None, "ada").expect("create");

        assert!(get_label(&conn, label.id, "grace").expect("get").is_none());
    }

    #[test]
    fn list_only_returns_owner_rows() {
        let conn = open_in_memory().expect("open store");
        create_label(&conn, "method", None, "ada").expect("create");
        create_label(&conn, "result", None, "ada").expect("create");
        create_label(&conn, "claim", None, "grace").expect("create");

        let names: Vec<String> = list_labels(&conn, "ada")
            .expect("list")
            .into_iter()
            .map(|label| label.name)
            .collect();
        assert_eq!(names, vec!["method", "result"]);
    }

    #[test]
    fn update_changes_name_and_keeps_color() {
        let conn = open_in_memory().expect("open store");
        let label = create_label(&conn, "method", Some("#aa3311"), "ada").expect("create");

        assert!(update_label(&conn, label.id, "ada", Some("methods"), None).expect("update"));
        let fetched = get_label(&conn, label.id, "ada").expect("get").expect("some");
        assert_eq!(fetched.name, "methods");
        assert_eq!(fetched.color.as_deref(), Some("#aa3311"));
    }

    #[test]
    fn update_misses_for_other_owner() {
        let conn = open_in_memory().expect("open store");
        let label = create_label(&conn, "method", None, "ada").expect("create");

        assert!(!update_label(&conn, label.id, "grace", Some("stolen"), None).expect("update"));
    }

    #[test]
    fn delete_missing_label_is_a_noop() {
        let mut conn = open_in_memory().expect("open store");
        assert!(!delete_label(&mut conn, 99, "ada").expect("delete"));
    }

    #[test]
    fn delete_reparents_children_to_grandparent() {
        // root -> mid -> leaf; deleting mid makes leaf a child of root
        let mut conn = open_in_memory().expect("open store");
        let root = create_label(&conn, "root", None, "ada").expect("create");
        let mid = create_label(&conn, "mid", None, "ada").expect("create");
        let leaf = create_label(&conn, "leaf", None, "ada").expect("create");
        hierarchy::add_parent_child(
            &mut conn,
            root.id,
            mid.id,
            "ada",
            RelationKind::ParentToChild,
        )
        .expect("link root-mid");
        hierarchy::add_parent_child(
            &mut conn,
            mid.id,
            leaf.id,
            "ada",
            RelationKind::ParentToChild,
        )
        .expect("link mid-leaf");

        assert!(delete_label(&mut conn, mid.id, "ada").expect("delete"));

        assert_eq!(
            hierarchy::direct_parent(&conn, leaf.id).expect("parent"),
            Some(root.id)
        );
        assert!(get_label(&conn, mid.id, "ada").expect("get").is_none());
    }

    #[test]
    fn delete_root_promotes_children_to_roots() {
        let mut conn = open_in_memory().expect("open store");
        let root = create_label(&conn, "root", None, "ada").expect("create");
        let child = create_label(&conn, "child", None, "ada").expect("create");
        hierarchy::add_parent_child(
            &mut conn,
            root.id,
            child.id,
            "ada",
            RelationKind::ParentToChild,
        )
        .expect("link");

        assert!(delete_label(&mut conn, root.id, "ada").expect("delete"));
        assert_eq!(hierarchy::direct_parent(&conn, child.id).expect("parent"), None);
    }
}
