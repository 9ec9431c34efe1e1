//! Directed relation edges and the directionality normalizer.
//!
//! Stored edges carry a discriminator describing how the `from`/`to`
//! columns map onto parent/child. [`normalize`] resolves a stored edge to a
//! canonical `(parent, child)` pair; [`storage_encoding`] is its inverse,
//! used at insert time so that normalization round-trips.

use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier for a stored label row.
pub type LabelId = i64;

/// How a stored edge's `from`/`to` columns map onto parent and child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// `from` is the child, `to` is the parent.
    ChildToParent,
    /// `from` is the parent, `to` is the child.
    ParentToChild,
}

impl RelationKind {
    /// Return the stored discriminator string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChildToParent => "child_to_parent",
            Self::ParentToChild => "parent_to_child",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "child_to_parent" | "child-to-parent" => Ok(Self::ChildToParent),
            "parent_to_child" | "parent-to-child" => Ok(Self::ParentToChild),
            other => bail!(
                "invalid relation kind '{other}': expected 'child_to_parent' or 'parent_to_child'"
            ),
        }
    }
}

/// Resolve a stored edge to its canonical `(parent, child)` pair.
///
/// Pure and total over both kinds; invalid discriminator strings are
/// rejected earlier, when parsing [`RelationKind`].
#[must_use]
pub const fn normalize(from: LabelId, to: LabelId, kind: RelationKind) -> (LabelId, LabelId) {
    match kind {
        RelationKind::ChildToParent => (to, from),
        RelationKind::ParentToChild => (from, to),
    }
}

/// Encode a canonical `(parent, child)` pair into the stored `(from, to)`
/// columns for the given kind.
#[must_use]
pub const fn storage_encoding(
    parent: LabelId,
    child: LabelId,
    kind: RelationKind,
) -> (LabelId, LabelId) {
    match kind {
        RelationKind::ChildToParent => (child, parent),
        RelationKind::ParentToChild => (parent, child),
    }
}
