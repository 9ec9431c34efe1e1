//! Machine-readable error codes for CLI and agent-friendly failures.

use std::fmt;

use crate::db::annotations::AnnotationError;
use crate::hierarchy::HierarchyError;

/// Stable error codes surfaced alongside human-readable messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    LabelNotFound,
    DocumentNotFound,
    AnnotationNotFound,
    RelationNotFound,
    SelfParent,
    DuplicateParent,
    CycleDetected,
    InvalidRelationKind,
    InvalidSpan,
    InvalidSegmentSize,
    StoreFault,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::LabelNotFound => "E2001",
            Self::DocumentNotFound => "E2002",
            Self::AnnotationNotFound => "E2003",
            Self::RelationNotFound => "E2004",
            Self::SelfParent => "E3001",
            Self::DuplicateParent => "E3002",
            Self::CycleDetected => "E3003",
            Self::InvalidRelationKind => "E3004",
            Self::InvalidSpan => "E3005",
            Self::InvalidSegmentSize => "E3006",
            Self::StoreFault => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Workspace not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::LabelNotFound => "Label not found",
            Self::DocumentNotFound => "Document not found",
            Self::AnnotationNotFound => "Annotation not found",
            Self::RelationNotFound => "Relation not found",
            Self::SelfParent => "Label cannot be its own parent",
            Self::DuplicateParent => "Label already has a parent",
            Self::CycleDetected => "Relation would create a cycle",
            Self::InvalidRelationKind => "Invalid relation kind",
            Self::InvalidSpan => "Invalid annotation span",
            Self::InvalidSegmentSize => "Invalid analytics segment size",
            Self::StoreFault => "Store access failed",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `ann init` to create the workspace store."),
            Self::ConfigParseError => Some("Fix syntax in .annotag/config.toml and retry."),
            Self::SelfParent => {
                Some("Parent and child must be two different labels.")
            }
            Self::DuplicateParent => {
                Some("Unlink the existing parent first: `ann unlink <parent> <child>`.")
            }
            Self::CycleDetected => {
                Some("Pick a parent outside the label's own subtree.")
            }
            Self::InvalidRelationKind => {
                Some("Use 'parent_to_child' or 'child_to_parent'.")
            }
            Self::InvalidSpan => {
                Some("Spans are end-exclusive and must lie inside the document.")
            }
            Self::InvalidSegmentSize => {
                Some("Set analytics.segment_size to 1 or more in .annotag/config.toml.")
            }
            Self::StoreFault => Some("Retry once. If persistent, check the store file."),
            Self::LabelNotFound
            | Self::DocumentNotFound
            | Self::AnnotationNotFound
            | Self::RelationNotFound => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<&HierarchyError> for ErrorCode {
    fn from(error: &HierarchyError) -> Self {
        match error {
            HierarchyError::SelfParent { .. } => Self::SelfParent,
            HierarchyError::LabelNotFound { .. } => Self::LabelNotFound,
            HierarchyError::DuplicateParent { .. } => Self::DuplicateParent,
            HierarchyError::CycleDetected { .. } => Self::CycleDetected,
            HierarchyError::RelationNotFound { .. } => Self::RelationNotFound,
            HierarchyError::Db(_) => Self::StoreFault,
        }
    }
}

impl From<&AnnotationError> for ErrorCode {
    fn from(error: &AnnotationError) -> Self {
        match error {
            AnnotationError::InvalidSpan { .. } => Self::InvalidSpan,
            AnnotationError::DocumentNotFound(_) => Self::DocumentNotFound,
            AnnotationError::LabelNotFound(_) => Self::LabelNotFound,
            AnnotationError::AnnotationNotFound(_) => Self::AnnotationNotFound,
            AnnotationError::InvalidSegmentSize => Self::InvalidSegmentSize,
            AnnotationError::Db(_) => Self::StoreFault,
        }
    }
}
