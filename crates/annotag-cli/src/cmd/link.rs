//! `ann link` / `ann unlink` / `ann parent` / `ann children` / `ann path`
//! — edge mutations and hierarchy point queries.

use std::path::Path;
use std::str::FromStr;

use annotag_core::db::labels;
use annotag_core::{ErrorCode, LabelId, RelationKind, hierarchy};
use clap::Args;
use serde::Serialize;

use crate::cmd::{domain_failure, require_owner, require_store};
use crate::output::{OutputMode, render, render_success};

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Parent label id.
    pub parent: LabelId,

    /// Child label id.
    pub child: LabelId,

    /// Stored edge encoding: parent_to_child or child_to_parent.
    #[arg(long, default_value = "parent_to_child")]
    pub kind: String,
}

#[derive(Args, Debug)]
pub struct UnlinkArgs {
    /// Parent label id.
    pub parent: LabelId,

    /// Child label id.
    pub child: LabelId,
}

#[derive(Args, Debug)]
pub struct ParentArgs {
    /// Label id.
    pub label: LabelId,
}

#[derive(Args, Debug)]
pub struct ChildrenArgs {
    /// Parent label id.
    pub label: LabelId,
}

#[derive(Args, Debug)]
pub struct PathArgs {
    /// Label id.
    pub label: LabelId,
}

pub fn run_link(
    args: &LinkArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let owner = require_owner(workspace_root, user_flag, output)?;
    let mut conn = require_store(workspace_root, output)?;

    let kind = RelationKind::from_str(&args.kind)
        .map_err(|error| domain_failure(output, &error.to_string(), ErrorCode::InvalidRelationKind))?;

    match hierarchy::add_parent_child(&mut conn, args.parent, args.child, &owner, kind) {
        Ok(relation) => render(output, &relation, |relation, out| {
            writeln!(
                out,
                "Linked {} as child of {} (relation {})",
                relation.child_id, relation.parent_id, relation.id
            )
        }),
        Err(error) => Err(domain_failure(output, &error.to_string(), (&error).into())),
    }
}

pub fn run_unlink(
    args: &UnlinkArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    // owner resolution keeps the command surface uniform even though the
    // edge lookup itself is by id pair
    let _owner = require_owner(workspace_root, user_flag, output)?;
    let conn = require_store(workspace_root, output)?;

    match hierarchy::remove_parent_child(&conn, args.parent, args.child) {
        Ok(()) => render_success(
            output,
            &format!("Unlinked {} from {}", args.child, args.parent),
        ),
        Err(error) => Err(domain_failure(output, &error.to_string(), (&error).into())),
    }
}

pub fn run_parent(
    args: &ParentArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let owner = require_owner(workspace_root, user_flag, output)?;
    let conn = require_store(workspace_root, output)?;

    if labels::get_label(&conn, args.label, &owner)?.is_none() {
        return Err(domain_failure(
            output,
            &format!("label {} not found for this user", args.label),
            ErrorCode::LabelNotFound,
        ));
    }

    #[derive(Serialize)]
    struct ParentReport {
        label_id: LabelId,
        parent_id: Option<LabelId>,
    }

    let parent_id = hierarchy::direct_parent(&conn, args.label)
        .map_err(|error| domain_failure(output, &error.to_string(), (&error).into()))?;
    render(
        output,
        &ParentReport {
            label_id: args.label,
            parent_id,
        },
        |report, out| match report.parent_id {
            Some(parent) => writeln!(out, "{parent}"),
            None => writeln!(out, "(root)"),
        },
    )
}

pub fn run_children(
    args: &ChildrenArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let owner = require_owner(workspace_root, user_flag, output)?;
    let conn = require_store(workspace_root, output)?;

    if labels::get_label(&conn, args.label, &owner)?.is_none() {
        return Err(domain_failure(
            output,
            &format!("label {} not found for this user", args.label),
            ErrorCode::LabelNotFound,
        ));
    }

    let children = hierarchy::direct_children(&conn, args.label)
        .map_err(|error| domain_failure(output, &error.to_string(), (&error).into()))?;
    render(output, &children, |children, out| {
        for child in children {
            writeln!(out, "{child}")?;
        }
        Ok(())
    })
}

pub fn run_path(
    args: &PathArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let owner = require_owner(workspace_root, user_flag, output)?;
    let conn = require_store(workspace_root, output)?;

    let path = hierarchy::path_to_root(&conn, args.label, &owner)
        .map_err(|error| domain_failure(output, &error.to_string(), (&error).into()))?;
    render(output, &path, |path, out| {
        let rendered: Vec<String> = path
            .iter()
            .map(|crumb| format!("{} ({})", crumb.name, crumb.id))
            .collect();
        writeln!(out, "{}", rendered.join(" > "))
    })
}
