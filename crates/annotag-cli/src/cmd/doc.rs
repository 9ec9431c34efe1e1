//! `ann doc` — document ingestion and listing.

use std::path::{Path, PathBuf};

use annotag_core::db::documents;
use clap::{Args, Subcommand};

use crate::cmd::{require_owner, require_store};
use crate::output::{OutputMode, render};

#[derive(Subcommand, Debug)]
pub enum DocCommand {
    /// Add a plain-text document.
    Add(AddDocArgs),
    /// List documents (titles and lengths, not contents).
    Ls,
}

#[derive(Args, Debug)]
pub struct AddDocArgs {
    /// Document title.
    pub title: String,

    /// Read content from this file.
    #[arg(short, long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Inline content.
    #[arg(short, long)]
    pub text: Option<String>,
}

pub fn run_doc(
    command: &DocCommand,
    user_flag: Option<&str>,
    output: OutputMode,
    workspace_root: &Path,
) -> anyhow::Result<()> {
    let owner = require_owner(workspace_root, user_flag, output)?;
    let conn = require_store(workspace_root, output)?;

    match command {
        DocCommand::Add(args) => {
            let content = match (&args.file, &args.text) {
                (Some(path), _) => std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("read {}: {e}", path.display()))?,
                (None, Some(text)) => text.clone(),
                (None, None) => {
                    // no --file/--text: take stdin, so `ann doc add t < f` works
                    let mut buf = String::new();
                    std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf)?;
                    buf
                }
            };

            let doc = documents::insert_document(&conn, &args.title, &content, &owner)?;
            render(output, &doc, |doc, out| {
                writeln!(
                    out,
                    "Added document {} ({}, {} chars)",
                    doc.title,
                    doc.id,
                    doc.content.chars().count()
                )
            })
        }
        DocCommand::Ls => {
            let all = documents::list_documents(&conn, &owner)?;
            render(output, &all, |all, out| {
                for doc in all {
                    writeln!(
                        out,
                        "{:>6}  {}  ({} chars)",
                        doc.id, doc.title, doc.content_length
                    )?;
                }
                Ok(())
            })
        }
    }
}
