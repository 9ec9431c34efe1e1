//! Annotation-density analytics.
//!
//! Documents are viewed as a run of fixed-size character windows
//! ("segments"); an annotation contributes to every segment its span
//! overlaps. The reports here answer two questions: how heavily is each
//! label used, and where in the corpus does a given label concentrate.

use anyhow::Context;
use rusqlite::{Connection, params};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::db::annotations::AnnotationError;
use crate::db::{documents, labels};
use crate::relation::LabelId;

/// Default segment width in characters.
pub const DEFAULT_SEGMENT_SIZE: usize = 500;

/// Per-label usage statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelStats {
    pub id: LabelId,
    pub name: String,
    pub color: Option<String>,
    /// Number of annotations carrying this label.
    pub count: usize,
    /// Sum of highlighted lengths across those annotations.
    pub total_length: usize,
    /// Mean highlighted length, rounded to two decimals.
    pub average_length: f64,
}

/// Corpus-wide label usage report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSummary {
    pub total_annotations: usize,
    pub total_labels: usize,
    /// Per-label stats, most-used first.
    pub labels: Vec<LabelStats>,
}

/// One document segment with its annotation concentration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentStats {
    pub document_id: i64,
    pub segment_index: usize,
    pub start_char: usize,
    pub end_char: usize,
    pub text: String,
    pub annotation_count: usize,
    pub annotation_ids: Vec<i64>,
}

/// The segment indexes an end-exclusive span `start..end` overlaps.
///
/// The last overlapped segment is the one containing `end - 1`, so a span
/// ending exactly on a segment boundary does not bleed into the next one.
/// `segment_size` must be non-zero; [`top_segments`] validates it before
/// calling here.
#[must_use]
pub const fn segment_span(
    start: usize,
    end: usize,
    segment_size: usize,
) -> RangeInclusive<usize> {
    let first = start / segment_size;
    let last = if end > start {
        (end - 1) / segment_size
    } else {
        first
    };
    first..=last
}

/// Per-label annotation counts and highlighted-length statistics for
/// `owner`, most-used label first.
///
/// Highlighted length prefers the stored selected text and falls back to
/// the span width for legacy rows without one.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub fn label_summary(conn: &Connection, owner: &str) -> anyhow::Result<LabelSummary> {
    let mut stmt = conn
        .prepare(
            "SELECT l.id, l.name, l.color,
                    COUNT(a.id),
                    COALESCE(SUM(
                        CASE WHEN a.selected_text IS NOT NULL AND length(a.selected_text) > 0
                             THEN length(a.selected_text)
                             ELSE a.end_offset - a.start_offset
                        END), 0)
             FROM labels l
             LEFT JOIN annotations a ON a.label_id = l.id AND a.user_id = l.user_id
             WHERE l.user_id = ?1
             GROUP BY l.id
             ORDER BY COUNT(a.id) DESC, l.id ASC",
        )
        .context("prepare label_summary query")?;

    let label_rows = stmt
        .query_map(params![owner], |row| {
            let count = usize::try_from(row.get::<_, i64>(3)?.max(0)).unwrap_or_default();
            let total_length =
                usize::try_from(row.get::<_, i64>(4)?.max(0)).unwrap_or_default();
            Ok((row.get::<_, LabelId>(0)?, row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?, count, total_length))
        })
        .context("label_summary")?
        .collect::<Result<Vec<_>, _>>()?;

    let labels = label_rows
        .into_iter()
        .map(|(id, name, color, count, total_length)| {
            let average_length = if count == 0 {
                0.0
            } else {
                let raw = total_length as f64 / count as f64;
                (raw * 100.0).round() / 100.0
            };
            LabelStats {
                id,
                name,
                color,
                count,
                total_length,
                average_length,
            }
        })
        .collect::<Vec<_>>();

    let total_annotations: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM annotations WHERE user_id = ?1",
            params![owner],
            |row| row.get(0),
        )
        .context("count annotations")?;

    Ok(LabelSummary {
        total_annotations: usize::try_from(total_annotations.max(0)).unwrap_or_default(),
        total_labels: labels.len(),
        labels,
    })
}

/// The `top_n` densest segments for one label across `owner`'s documents,
/// highest annotation count first.
///
/// # Errors
///
/// Returns [`AnnotationError::InvalidSegmentSize`] for a zero
/// `segment_size`, [`AnnotationError::LabelNotFound`] when the label is
/// missing or belongs to another owner, and `Db` for store faults.
pub fn top_segments(
    conn: &Connection,
    owner: &str,
    label_id: LabelId,
    top_n: usize,
    segment_size: usize,
) -> Result<Vec<SegmentStats>, AnnotationError> {
    // segment_size comes from user config; reject zero before it reaches
    // the window arithmetic
    if segment_size == 0 {
        return Err(AnnotationError::InvalidSegmentSize);
    }

    labels::get_label(conn, label_id, owner)?
        .ok_or(AnnotationError::LabelNotFound(label_id))?;

    let mut stats: HashMap<(i64, usize), SegmentStats> = HashMap::new();

    for document in documents::list_documents(conn, owner)? {
        let spans = annotation_spans(conn, document.id, label_id)?;
        if spans.is_empty() {
            continue;
        }

        // segment text is sliced lazily, only for documents with hits
        let content = documents::get_document(conn, document.id, owner)?
            .map(|doc| doc.content)
            .unwrap_or_default();
        let content_chars: Vec<char> = content.chars().collect();

        for (annotation_id, start, end) in spans {
            for segment_index in segment_span(start, end, segment_size) {
                let entry = stats
                    .entry((document.id, segment_index))
                    .or_insert_with(|| {
                        let start_char = segment_index * segment_size;
                        let end_char = (start_char + segment_size).min(content_chars.len());
                        SegmentStats {
                            document_id: document.id,
                            segment_index,
                            start_char,
                            end_char,
                            text: content_chars
                                .get(start_char..end_char)
                                .unwrap_or_default()
                                .iter()
                                .collect(),
                            annotation_count: 0,
                            annotation_ids: Vec::new(),
                        }
                    });
                entry.annotation_count += 1;
                entry.annotation_ids.push(annotation_id);
            }
        }
    }

    let mut segments: Vec<SegmentStats> = stats.into_values().collect();
    segments.sort_by(|a, b| {
        b.annotation_count
            .cmp(&a.annotation_count)
            .then(a.document_id.cmp(&b.document_id))
            .then(a.segment_index.cmp(&b.segment_index))
    });
    segments.truncate(top_n);
    Ok(segments)
}

/// Span rows `(id, start, end)` for one label on one document.
fn annotation_spans(
    conn: &Connection,
    document_id: i64,
    label_id: LabelId,
) -> anyhow::Result<Vec<(i64, usize, usize)>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, start_offset, end_offset
             FROM annotations
             WHERE document_id = ?1 AND label_id = ?2",
        )
        .context("prepare annotation_spans query")?;

    let rows = stmt
        .query_map(params![document_id, label_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                usize::try_from(row.get::<_, i64>(1)?.max(0)).unwrap_or_default(),
                usize::try_from(row.get::<_, i64>(2)?.max(0)).unwrap_or_default(),
            ))
        })
        .with_context(|| format!("annotation_spans for document {document_id}"))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{annotations, open_in_memory};

    #[test]
    fn segment_span_stays_inside_boundaries() {
        assert_eq!(segment_span(0, 500, 500), 0..=0);
        assert_eq!(segment_span(499, 501, 500), 0..=1);
        assert_eq!(segment_span(500, 700, 500), 1..=1);
        assert_eq!(segment_span(1200, 1300, 500), 2..=2);
    }

    #[test]
    fn segment_span_wide_annotation_covers_many() {
        assert_eq!(segment_span(100, 1600, 500), 0..=3);
    }

    fn seeded(conn: &Connection) -> (i64, LabelId, LabelId) {
        let text = "x".repeat(120);
        let doc = documents::insert_document(conn, "Notes", &text, "ada")
            .expect("insert document")
            .id;
        let hot = labels::create_label(conn, "hot", None, "ada").expect("create").id;
        let cold = labels::create_label(conn, "cold", None, "ada").expect("create").id;
        (doc, hot, cold)
    }

    #[test]
    fn summary_counts_and_averages_per_label() {
        let conn = open_in_memory().expect("open store");
        let (doc, hot, cold) = seeded(&conn);
        annotations::create_annotation(&conn, doc, hot, 0, 10, "ada").expect("annotate");
        annotations::create_annotation(&conn, doc, hot, 20, 40, "ada").expect("annotate");
        annotations::create_annotation(&conn, doc, cold, 50, 55, "ada").expect("annotate");

        let summary = label_summary(&conn, "ada").expect("summary");
        assert_eq!(summary.total_annotations, 3);
        assert_eq!(summary.total_labels, 2);

        // most-used first
        assert_eq!(summary.labels[0].id, hot);
        assert_eq!(summary.labels[0].count, 2);
        assert_eq!(summary.labels[0].total_length, 30);
        assert!((summary.labels[0].average_length - 15.0).abs() < f64::EPSILON);
        assert_eq!(summary.labels[1].count, 1);
    }

    #[test]
    fn summary_includes_unused_labels_with_zeroes() {
        let conn = open_in_memory().expect("open store");
        let (_, _, cold) = seeded(&conn);

        let summary = label_summary(&conn, "ada").expect("summary");
        let stats = summary
            .labels
            .iter()
            .find(|stats| stats.id == cold)
            .expect("cold label present");
        assert_eq!(stats.count, 0);
        assert!(stats.average_length.abs() < f64::EPSILON);
    }

    #[test]
    fn top_segments_orders_by_density() {
        let conn = open_in_memory().expect("open store");
        let text = "y".repeat(100);
        let doc = documents::insert_document(&conn, "Notes", &text, "ada")
            .expect("insert")
            .id;
        let lbl = labels::create_label(&conn, "hot", None, "ada").expect("create").id;

        // segment size 20: three hits in segment 2, one in segment 0
        annotations::create_annotation(&conn, doc, lbl, 41, 45, "ada").expect("annotate");
        annotations::create_annotation(&conn, doc, lbl, 46, 50, "ada").expect("annotate");
        annotations::create_annotation(&conn, doc, lbl, 51, 55, "ada").expect("annotate");
        annotations::create_annotation(&conn, doc, lbl, 2, 6, "ada").expect("annotate");

        let segments = top_segments(&conn, "ada", lbl, 10, 20).expect("segments");
        assert_eq!(segments[0].segment_index, 2);
        assert_eq!(segments[0].annotation_count, 3);
        assert_eq!(segments[0].annotation_ids.len(), 3);
        assert_eq!(segments[0].start_char, 40);
        assert_eq!(segments[0].end_char, 60);
        assert_eq!(segments[0].text.len(), 20);
        assert_eq!(segments[1].annotation_count, 1);
    }

    #[test]
    fn top_segments_truncates_to_n() {
        let conn = open_in_memory().expect("open store");
        let (doc, hot, _) = seeded(&conn);
        for start in [0usize, 30, 60, 90] {
            annotations::create_annotation(&conn, doc, hot, start, start + 5, "ada")
                .expect("annotate");
        }

        let segments = top_segments(&conn, "ada", hot, 2, 30).expect("segments");
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn top_segments_rejects_zero_segment_size() {
        let conn = open_in_memory().expect("open store");
        let (doc, hot, _) = seeded(&conn);
        annotations::create_annotation(&conn, doc, hot, 0, 10, "ada").expect("annotate");

        // a misconfigured width must come back as an error, never as a
        // division panic
        let err = top_segments(&conn, "ada", hot, 5, 0).unwrap_err();
        assert!(matches!(err, AnnotationError::InvalidSegmentSize));
    }

    #[test]
    fn top_segments_rejects_foreign_label() {
        let conn = open_in_memory().expect("open store");
        let (_, hot, _) = seeded(&conn);
        let err = top_segments(&conn, "grace", hot, 5, 500).unwrap_err();
        assert!(matches!(err, AnnotationError::LabelNotFound(_)));
    }

    #[test]
    fn final_segment_is_clamped_to_document_end() {
        let conn = open_in_memory().expect("open store");
        let text = "z".repeat(50);
        let doc = documents::insert_document(&conn, "Short", &text, "ada")
            .expect("insert")
            .id;
        let lbl = labels::create_label(&conn, "hot", None, "ada").expect("create").id;
        annotations::create_annotation(&conn, doc, lbl, 45, 50, "ada").expect("annotate");

        let segments = top_segments(&conn, "ada", lbl, 5, 30).expect("segments");
        assert_eq!(segments[0].segment_index, 1);
        assert_eq!(segments[0].start_char, 30);
        assert_eq!(segments[0].end_char, 50);
        assert_eq!(segments[0].text.len(), 20);
    }
}
