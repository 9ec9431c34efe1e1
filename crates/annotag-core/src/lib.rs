//! annotag-core: label hierarchy engine, annotation store, and analytics.
//!
//! # Conventions
//!
//! - **Errors**: domain errors are typed enums; store faults propagate as
//!   `anyhow::Error` with context naming the failed operation.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//! - **Ownership**: every read and write is scoped to a `user_id`; a
//!   missing row and a foreign row look the same to callers.

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod hierarchy;
pub mod model;
pub mod relation;

pub use error::ErrorCode;
pub use hierarchy::HierarchyError;
pub use model::{Breadcrumb, LabelTree};
pub use relation::{LabelId, RelationKind};
