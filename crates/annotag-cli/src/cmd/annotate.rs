//! `ann annotate` / `ann annotations` / `ann annotation rm` — span tagging.

use std::path::Path;

use annotag_core::LabelId;
use annotag_core::db::annotations;
use clap::Args;

use crate::cmd::{domain_failure, require_owner, require_store};
use crate::output::{OutputMode, render, render_success};

#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Document id.
    #[arg(short, long)]
    pub doc: i64,

    /// Label id to apply.
    #[arg(short, long)]
    pub label: LabelId,

    /// Span start (character offset, inclusive).
    pub start: usize,

    /// Span end (character offset, exclusive).
    pub end: usize,
}

#[derive(Args, Debug)]
pub struct AnnotationsArgs {
    /// Document id.
    pub doc: i64,
}

#[derive(Args, Debug)]
pub struct RmAnnotationArgs {
    /// Annotation id.
    pub id: i64,
}

pub fn run_annotate(
    args: &AnnotateArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let owner = require_owner(workspace_root, user_flag, output)?;
    let conn = require_store(workspace_root, output)?;

    match annotations::create_annotation(&conn, args.doc, args.label, args.start, args.end, &owner)
    {
        Ok(annotation) => render(output, &annotation, |annotation, out| {
            writeln!(
                out,
                "Annotated {}..{} of document {} with {} ({}): \"{}\"",
                annotation.start,
                annotation.end,
                annotation.document_id,
                annotation.label,
                annotation.label_id,
                annotation.text
            )
        }),
        Err(error) => Err(domain_failure(output, &error.to_string(), (&error).into())),
    }
}

pub fn run_annotations(
    args: &AnnotationsArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let owner = require_owner(workspace_root, user_flag, output)?;
    let conn = require_store(workspace_root, output)?;

    match annotations::annotations_for_document(&conn, args.doc, &owner) {
        Ok(all) => render(output, &all, |all, out| {
            for annotation in all {
                writeln!(
                    out,
                    "{:>6}  [{}..{}]  {}  \"{}\"",
                    annotation.id,
                    annotation.start,
                    annotation.end,
                    annotation.label,
                    annotation.text
                )?;
            }
            Ok(())
        }),
        Err(error) => Err(domain_failure(output, &error.to_string(), (&error).into())),
    }
}

pub fn run_annotation_rm(
    args: &RmAnnotationArgs,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let owner = require_owner(workspace_root, user_flag, output)?;
    let conn = require_store(workspace_root, output)?;

    match annotations::delete_annotation(&conn, args.id, &owner) {
        Ok(()) => render_success(output, &format!("Deleted annotation {}", args.id)),
        Err(error) => Err(domain_failure(output, &error.to_string(), (&error).into())),
    }
}
