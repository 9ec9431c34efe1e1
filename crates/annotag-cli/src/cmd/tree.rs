//! `ann tree` — render one subtree or the whole label forest.

use std::io::{self, Write};
use std::path::Path;

use annotag_core::{LabelId, LabelTree, hierarchy};
use clap::Args;

use crate::cmd::{domain_failure, require_owner, require_store};
use crate::output::{OutputMode, render};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Root label id; omit to print every root tree.
    pub label: Option<LabelId>,
}

pub fn run_tree(
    args: &TreeArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let owner = require_owner(workspace_root, user_flag, output)?;
    let conn = require_store(workspace_root, output)?;

    match args.label {
        Some(label_id) => {
            let tree = hierarchy::build_label_tree(&conn, label_id, &owner)
                .map_err(|error| domain_failure(output, &error.to_string(), (&error).into()))?;
            render(output, &tree, |tree, out| write_tree(tree, 0, out))
        }
        None => {
            let forest = hierarchy::all_root_trees(&conn, &owner)
                .map_err(|error| domain_failure(output, &error.to_string(), (&error).into()))?;
            render(output, &forest, |forest, out| {
                for tree in forest {
                    write_tree(tree, 0, out)?;
                }
                Ok(())
            })
        }
    }
}

/// Indented one-node-per-line rendering, two spaces per depth level.
fn write_tree(tree: &LabelTree, depth: usize, out: &mut dyn Write) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    match &tree.color {
        Some(color) => writeln!(out, "{indent}{} ({}) [{color}]", tree.name, tree.id)?,
        None => writeln!(out, "{indent}{} ({})", tree.name, tree.id)?,
    }
    for child in &tree.children {
        write_tree(child, depth + 1, out)?;
    }
    Ok(())
}
