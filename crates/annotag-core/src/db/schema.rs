//! Canonical SQLite schema for the annotag store.
//!
//! The schema is normalized and owner-scoped:
//! - `labels` holds one row per user-defined label
//! - `label_relations` models oriented parent/child edges with a
//!   directionality discriminator; generated `parent_id`/`child_id` columns
//!   resolve the discriminator so the single-parent invariant can be
//!   enforced with a plain `UNIQUE` index on the child end
//! - `documents` and `annotations` hold the annotated corpus
//! - `store_meta` tracks the schema version

/// Migration v1: core tables plus store metadata.
pub const MIGRATION_V1_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS labels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    color TEXT,
    user_id TEXT NOT NULL CHECK (length(trim(user_id)) > 0),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS label_relations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
    to_label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
    relation_type TEXT NOT NULL
        CHECK (relation_type IN ('child_to_parent', 'parent_to_child')),
    parent_id INTEGER GENERATED ALWAYS AS (
        CASE relation_type WHEN 'parent_to_child' THEN from_label_id ELSE to_label_id END
    ) STORED,
    child_id INTEGER GENERATED ALWAYS AS (
        CASE relation_type WHEN 'parent_to_child' THEN to_label_id ELSE from_label_id END
    ) STORED,
    CHECK (from_label_id <> to_label_id)
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_label_relations_single_parent
    ON label_relations(child_id);

CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK (length(trim(title)) > 0),
    content TEXT NOT NULL,
    user_id TEXT NOT NULL CHECK (length(trim(user_id)) > 0),
    created_at_us INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS annotations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
    start_offset INTEGER NOT NULL,
    end_offset INTEGER NOT NULL,
    selected_text TEXT NOT NULL,
    user_id TEXT NOT NULL CHECK (length(trim(user_id)) > 0),
    created_at_us INTEGER NOT NULL,
    CHECK (start_offset >= 0 AND end_offset > start_offset)
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL,
    migrated_at_us INTEGER NOT NULL DEFAULT 0
);

INSERT OR IGNORE INTO store_meta (id, schema_version, migrated_at_us)
VALUES (1, 1, 0);
"#;

/// Migration v2: read-path indexes for the hierarchy and analytics queries.
pub const MIGRATION_V2_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_labels_user
    ON labels(user_id, id);

CREATE INDEX IF NOT EXISTS idx_label_relations_parent
    ON label_relations(parent_id, child_id);

CREATE INDEX IF NOT EXISTS idx_documents_user
    ON documents(user_id, id);

CREATE INDEX IF NOT EXISTS idx_annotations_document_start
    ON annotations(document_id, start_offset);

CREATE INDEX IF NOT EXISTS idx_annotations_label
    ON annotations(label_id, document_id);

UPDATE store_meta
SET schema_version = 2
WHERE id = 1;
"#;

/// Indexes expected by the hierarchy and analytics read paths.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_label_relations_single_parent",
    "idx_labels_user",
    "idx_label_relations_parent",
    "idx_documents_user",
    "idx_annotations_document_start",
    "idx_annotations_label",
];

#[cfg(test)]
mod tests {
    use crate::db::migrations;
    use rusqlite::{Connection, params};

    fn seeded_conn() -> rusqlite::Result<Connection> {
        let mut conn = Connection::open_in_memory()?;
        migrations::migrate(&mut conn)?;

        for idx in 0..8_i64 {
            conn.execute(
                "INSERT INTO labels (name, color, user_id, created_at_us)
                 VALUES (?1, '#336699', 'ada', ?2)",
                params![format!("label-{idx}"), idx],
            )?;
        }
        // label 1 is the parent of 2 and 3, under both encodings
        conn.execute(
            "INSERT INTO label_relations (from_label_id, to_label_id, relation_type)
             VALUES (1, 2, 'parent_to_child')",
            [],
        )?;
        conn.execute(
            "INSERT INTO label_relations (from_label_id, to_label_id, relation_type)
             VALUES (3, 1, 'child_to_parent')",
            [],
        )?;
        Ok(conn)
    }

    fn query_plan_details(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare(&format!("EXPLAIN QUERY PLAN {sql}"))?;
        stmt.query_map([], |row| row.get::<_, String>(3))?
            .collect::<Result<Vec<_>, _>>()
    }

    #[test]
    fn generated_columns_resolve_directionality() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let pairs: Vec<(i64, i64)> = conn
            .prepare("SELECT parent_id, child_id FROM label_relations ORDER BY child_id")?
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(pairs, vec![(1, 2), (1, 3)]);
        Ok(())
    }

    #[test]
    fn second_parent_insert_violates_unique_index() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        // label 2 already has parent 1; giving it parent 4 must fail at the
        // store layer regardless of which encoding the writer picks
        let result = conn.execute(
            "INSERT INTO label_relations (from_label_id, to_label_id, relation_type)
             VALUES (2, 4, 'child_to_parent')",
            [],
        );
        assert!(result.is_err(), "duplicate child end must be rejected");
        Ok(())
    }

    #[test]
    fn self_edge_violates_check() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let result = conn.execute(
            "INSERT INTO label_relations (from_label_id, to_label_id, relation_type)
             VALUES (4, 4, 'parent_to_child')",
            [],
        );
        assert!(result.is_err(), "self edge must be rejected");
        Ok(())
    }

    #[test]
    fn query_plan_uses_children_index() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let details = query_plan_details(
            &conn,
            "SELECT child_id FROM label_relations WHERE parent_id = 1",
        )?;
        assert!(
            details
                .iter()
                .any(|detail| detail.contains("idx_label_relations_parent")),
            "expected children index in plan, got: {details:?}"
        );
        Ok(())
    }

    #[test]
    fn query_plan_uses_annotation_span_index() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        let details = query_plan_details(
            &conn,
            "SELECT id FROM annotations WHERE document_id = 1 ORDER BY start_offset",
        )?;
        assert!(
            details
                .iter()
                .any(|detail| detail.contains("idx_annotations_document_start")),
            "expected span index in plan, got: {details:?}"
        );
        Ok(())
    }

    #[test]
    fn negative_span_violates_check() -> rusqlite::Result<()> {
        let conn = seeded_conn()?;
        conn.execute(
            "INSERT INTO documents (title, content, user_id, created_at_us)
             VALUES ('doc', 'body text', 'ada', 0)",
            [],
        )?;
        let result = conn.execute(
            "INSERT INTO annotations
                 (document_id, label_id, start_offset, end_offset,
                  selected_text, user_id, created_at_us)
             VALUES (1, 1, 5, 5, '', 'ada', 0)",
            [],
        );
        assert!(result.is_err(), "empty span must be rejected");
        Ok(())
    }
}
