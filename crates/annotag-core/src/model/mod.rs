//! Derived data structures returned by the hierarchy engine.

pub mod tree;

pub use tree::{Breadcrumb, LabelTree};
