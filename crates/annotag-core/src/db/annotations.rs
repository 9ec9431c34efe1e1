//! Annotation store: highlighted spans tagged with labels.
//!
//! Annotations reference a document and a label by id and carry the
//! highlighted character span plus the selected text. Reads join the label
//! so callers get the label name/color without a second lookup.

use anyhow::Context;
use rusqlite::{Connection, params};
use serde::Serialize;

use crate::db::{documents, labels, now_us};
use crate::relation::LabelId;

/// Errors from annotation operations.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    /// The span is empty or inverted, or runs past the document's end.
    #[error("invalid span {start}..{end} for a document of {document_length} characters")]
    InvalidSpan {
        start: usize,
        end: usize,
        document_length: usize,
    },

    /// The document does not exist under the requesting owner.
    #[error("document {0} not found for this user")]
    DocumentNotFound(i64),

    /// The label does not exist under the requesting owner.
    #[error("label {0} not found for this user")]
    LabelNotFound(LabelId),

    /// The annotation does not exist under the requesting owner.
    #[error("annotation {0} not found for this user")]
    AnnotationNotFound(i64),

    /// A density report was requested with a zero segment width.
    #[error("segment size must be at least 1 character")]
    InvalidSegmentSize,

    /// An underlying database error.
    #[error("database error: {0}")]
    Db(#[from] anyhow::Error),
}

/// An annotation row joined with its label's name and color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationRecord {
    pub id: i64,
    pub document_id: i64,
    pub label_id: LabelId,
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub label: String,
    pub color: Option<String>,
    pub user_id: String,
}

/// Create an annotation for `owner`, validating the document, the label,
/// and the span against the document's length.
///
/// The selected text is sliced out of the stored document content, so the
/// stored text always matches the span.
///
/// # Errors
///
/// Returns a domain error for a bad span or a missing document/label, and
/// `Db` for store faults.
pub fn create_annotation(
    conn: &Connection,
    document_id: i64,
    label_id: LabelId,
    start: usize,
    end: usize,
    owner: &str,
) -> Result<AnnotationRecord, AnnotationError> {
    let document = documents::get_document(conn, document_id, owner)?
        .ok_or(AnnotationError::DocumentNotFound(document_id))?;
    let label = labels::get_label(conn, label_id, owner)?
        .ok_or(AnnotationError::LabelNotFound(label_id))?;

    let document_length = document.content.chars().count();
    if start >= end || end > document_length {
        return Err(AnnotationError::InvalidSpan {
            start,
            end,
            document_length,
        });
    }

    let text: String = document
        .content
        .chars()
        .skip(start)
        .take(end - start)
        .collect();

    conn.execute(
        "INSERT INTO annotations
             (document_id, label_id, start_offset, end_offset,
              selected_text, user_id, created_at_us)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            document_id,
            label_id,
            i64::try_from(start).unwrap_or(i64::MAX),
            i64::try_from(end).unwrap_or(i64::MAX),
            text,
            owner,
            now_us()
        ],
    )
    .with_context(|| format!("insert annotation on document {document_id}"))?;

    Ok(AnnotationRecord {
        id: conn.last_insert_rowid(),
        document_id,
        label_id,
        start,
        end,
        text,
        label: label.name,
        color: label.color,
        user_id: owner.to_string(),
    })
}

/// List all of `owner`'s annotations on one document, ordered by start
/// offset.
///
/// # Errors
///
/// Returns `Db` if the query fails.
pub fn annotations_for_document(
    conn: &Connection,
    document_id: i64,
    owner: &str,
) -> Result<Vec<AnnotationRecord>, AnnotationError> {
    let mut stmt = conn
        .prepare(
            "SELECT a.id, a.document_id, a.label_id, a.start_offset, a.end_offset,
                    a.selected_text, l.name, l.color, a.user_id
             FROM annotations a
             LEFT JOIN labels l ON l.id = a.label_id
             WHERE a.document_id = ?1 AND a.user_id = ?2
             ORDER BY a.start_offset ASC",
        )
        .context("prepare annotations_for_document query")?;

    let rows = stmt
        .query_map(params![document_id, owner], |row| {
            Ok(AnnotationRecord {
                id: row.get(0)?,
                document_id: row.get(1)?,
                label_id: row.get(2)?,
                start: usize::try_from(row.get::<_, i64>(3)?.max(0)).unwrap_or_default(),
                end: usize::try_from(row.get::<_, i64>(4)?.max(0)).unwrap_or_default(),
                text: row.get(5)?,
                label: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                color: row.get(7)?,
                user_id: row.get(8)?,
            })
        })
        .with_context(|| format!("annotations_for_document {document_id}"))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(anyhow::Error::from)?;
    Ok(rows)
}

/// Delete an annotation after verifying it belongs to `owner`.
///
/// # Errors
///
/// Returns `AnnotationNotFound` when no owner-scoped row matched.
pub fn delete_annotation(
    conn: &Connection,
    id: i64,
    owner: &str,
) -> Result<(), AnnotationError> {
    let affected = conn
        .execute(
            "DELETE FROM annotations WHERE id = ?1 AND user_id = ?2",
            params![id, owner],
        )
        .with_context(|| format!("delete annotation {id}"))?;

    if affected == 0 {
        return Err(AnnotationError::AnnotationNotFound(id));
    }
    Ok(())
}
