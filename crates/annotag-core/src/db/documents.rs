//! Document store: minimal owner-scoped persistence for annotated texts.
//!
//! Deliberately thin. No upload pipeline and no format extraction live
//! here; documents arrive as plain text and the annotation and analytics
//! layers read them back.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::db::now_us;

/// A document row from the `documents` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub user_id: String,
    pub created_at_us: i64,
}

/// A document listing entry: everything but the content, plus its length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub title: String,
    pub content_length: usize,
    pub created_at_us: i64,
}

/// Insert a document for `owner` and return the stored record.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_document(
    conn: &Connection,
    title: &str,
    content: &str,
    owner: &str,
) -> Result<DocumentRecord> {
    let created_at_us = now_us();
    conn.execute(
        "INSERT INTO documents (title, content, user_id, created_at_us)
         VALUES (?1, ?2, ?3, ?4)",
        params![title, content, owner, created_at_us],
    )
    .with_context(|| format!("insert document '{title}' for '{owner}'"))?;

    Ok(DocumentRecord {
        id: conn.last_insert_rowid(),
        title: title.to_string(),
        content: content.to_string(),
        user_id: owner.to_string(),
        created_at_us,
    })
}

/// Fetch a document by id, scoped to `owner`.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_document(conn: &Connection, id: i64, owner: &str) -> Result<Option<DocumentRecord>> {
    conn.query_row(
        "SELECT id, title, content, user_id, created_at_us
         FROM documents WHERE id = ?1 AND user_id = ?2",
        params![id, owner],
        |row| {
            Ok(DocumentRecord {
                id: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
                user_id: row.get(3)?,
                created_at_us: row.get(4)?,
            })
        },
    )
    .optional()
    .with_context(|| format!("get_document {id}"))
}

/// List `owner`'s documents, oldest first, without their contents.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_documents(conn: &Connection, owner: &str) -> Result<Vec<DocumentSummary>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, title, length(content), created_at_us
             FROM documents WHERE user_id = ?1 ORDER BY id ASC",
        )
        .context("prepare list_documents query")?;

    let rows = stmt
        .query_map(params![owner], |row| {
            Ok(DocumentSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                content_length: usize::try_from(row.get::<_, i64>(2)?.max(0)).unwrap_or_default(),
                created_at_us: row.get(3)?,
            })
        })
        .context("list_documents")?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
