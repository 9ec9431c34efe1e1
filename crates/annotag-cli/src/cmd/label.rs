//! `ann label` — label CRUD.

use std::path::Path;

use annotag_core::db::labels;
use annotag_core::{ErrorCode, LabelId};
use clap::{Args, Subcommand};

use crate::cmd::{domain_failure, require_owner, require_store};
use crate::output::{OutputMode, render, render_success};

#[derive(Subcommand, Debug)]
pub enum LabelCommand {
    /// Create a new label.
    Create(CreateLabelArgs),
    /// List all labels.
    Ls,
    /// Update a label's name and/or color.
    Update(UpdateLabelArgs),
    /// Delete a label, reparenting its children to their grandparent.
    Rm(RmLabelArgs),
}

#[derive(Args, Debug)]
pub struct CreateLabelArgs {
    /// Label name.
    pub name: String,

    /// Display color, e.g. '#aa3311'.
    #[arg(short, long)]
    pub color: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateLabelArgs {
    /// Label id.
    pub id: LabelId,

    /// New name.
    #[arg(short, long)]
    pub name: Option<String>,

    /// New color.
    #[arg(short, long)]
    pub color: Option<String>,
}

#[derive(Args, Debug)]
pub struct RmLabelArgs {
    /// Label id.
    pub id: LabelId,
}

pub fn run_label(
    command: &LabelCommand,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let owner = require_owner(workspace_root, user_flag, output)?;
    let mut conn = require_store(workspace_root, output)?;

    match command {
        LabelCommand::Create(args) => {
            let label =
                labels::create_label(&conn, &args.name, args.color.as_deref(), &owner)?;
            render(output, &label, |label, out| {
                writeln!(out, "Created label {} ({})", label.name, label.id)
            })
        }
        LabelCommand::Ls => {
            let all = labels::list_labels(&conn, &owner)?;
            render(output, &all, |all, out| {
                for label in all {
                    writeln!(
                        out,
                        "{:>6}  {}  {}",
                        label.id,
                        label.name,
                        label.color.as_deref().unwrap_or("-")
                    )?;
                }
                Ok(())
            })
        }
        LabelCommand::Update(args) => {
            let updated = labels::update_label(
                &conn,
                args.id,
                &owner,
                args.name.as_deref(),
                args.color.as_deref(),
            )?;
            if !updated {
                return Err(domain_failure(
                    output,
                    &format!("label {} not found for this user", args.id),
                    ErrorCode::LabelNotFound,
                ));
            }
            render_success(output, &format!("Updated label {}", args.id))
        }
        LabelCommand::Rm(args) => {
            let deleted = labels::delete_label(&mut conn, args.id, &owner)?;
            if !deleted {
                return Err(domain_failure(
                    output,
                    &format!("label {} not found for this user", args.id),
                    ErrorCode::LabelNotFound,
                ));
            }
            render_success(output, &format!("Deleted label {}", args.id))
        }
    }
}
